/// Name of the project state file
pub const CONFIG_NAME: &str = "scaffold.config.json";

/// Generated deployment inputs, relative to the project root and to each framework package
pub const INPUT_DIR: &str = "input";
pub const ADDRESS_FILE: &str = "address.json";
pub const BASIC_METADATA_FILE: &str = "evvmBasicMetadata.json";
pub const ADVANCED_METADATA_FILE: &str = "evvmAdvancedMetadata.json";
pub const INPUTS_SOL_FILE: &str = "Inputs.sol";

pub const ENV_FILE: &str = ".env";

/// Deployment history
pub const DEPLOYMENTS_DIR: &str = "deployments";
pub const LATEST_DEPLOYMENT_FILE: &str = "latest.json";

/// Logs of the detached chain and frontend processes
pub const LOGS_DIR: &str = ".scaffold/logs";
pub const CHAIN_LOG_FILE: &str = "chain.log";
pub const FRONTEND_LOG_FILE: &str = "frontend.log";

pub const FRONTEND_DIR: &str = "frontend";
/// Next.js build cache, holds public env values baked in at start-up
pub const NEXT_CACHE_DIR: &str = ".next";

pub const FOUNDRY_DEPLOY_SCRIPT: &str = "script/Deploy.s.sol";
pub const FOUNDRY_DEPLOY_CONTRACT: &str = "DeployScript";
/// Script directories under `broadcast/`, newest layout first
pub const BROADCAST_SCRIPT_CANDIDATES: [&str; 3] = [
    "Deploy.s.sol",
    "DeployTestnet.s.sol",
    "DeployTestnetOnAnvil.s.sol",
];
pub const BROADCAST_DIR: &str = "broadcast";
pub const BROADCAST_RUN_FILE: &str = "run-latest.json";

pub const HARDHAT_SUMMARY_FILE: &str = "deployment-summary.json";
pub const HARDHAT_FOUNDRY_DEPLOY_SCRIPT: &str = "scripts/deploy-from-foundry.ts";
/// Marks a contract source that needs foundry import remappings
pub const REMAPPINGS_FILE: &str = "remappings.txt";

/// First three accounts of the default Anvil / Hardhat mnemonic
pub const ANVIL_ACCOUNTS: [&str; 3] = [
    "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
    "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
    "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC",
];
/// Private key of `ANVIL_ACCOUNTS[0]`, public knowledge
pub const ANVIL_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
