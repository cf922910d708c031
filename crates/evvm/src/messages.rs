use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use ethers::types::U256;
use evvm_cli_types::{ContractSource, EvvmContract, Framework, Network};

use crate::utils::sources::SourceStatus;

/// Common messages
pub(super) const MSG_PROJECT_CONFIGURATION: &str = "Project configuration";
pub(super) const MSG_MISSING_TOOLS_NOTE: &str =
    "Some toolchains are missing, their frameworks will not be offered";
pub(super) const MSG_NO_FRAMEWORK_ERR: &str =
    "Neither Foundry nor Hardhat is installed. Install one of them and try again";

pub(super) fn msg_framework_unavailable(framework: Framework) -> String {
    format!("{framework} is not available on this machine, install its toolchain first")
}

/// Project creation related messages
pub(super) const MSG_FRAMEWORK_HELP: &str = "Solidity framework used to compile and deploy";
pub(super) const MSG_CONTRACT_SOURCE_HELP: &str = "Contract set to build against";
pub(super) const MSG_DEFAULTS_HELP: &str =
    "Use default values for every deployment input that is not passed";
pub(super) const MSG_FRAMEWORK_PROMPT: &str = "Select the Solidity framework";
pub(super) const MSG_CONTRACT_SOURCE_PROMPT: &str = "Select the contract source";
pub(super) const MSG_USE_DEFAULTS_PROMPT: &str =
    "Use the default deployment values (local test accounts, MATE token)?";
pub(super) const MSG_ADMIN_PROMPT: &str = "Admin address";
pub(super) const MSG_GOLDEN_FISHER_PROMPT: &str = "Golden fisher address";
pub(super) const MSG_ACTIVATOR_PROMPT: &str = "Activator address";
pub(super) const MSG_EVVM_NAME_PROMPT: &str = "EVVM name";
pub(super) const MSG_TOKEN_NAME_PROMPT: &str = "Principal token name";
pub(super) const MSG_TOKEN_SYMBOL_PROMPT: &str = "Principal token symbol";
pub(super) const MSG_TOTAL_SUPPLY_PROMPT: &str = "Total supply (in wei)";
pub(super) const MSG_ERA_TOKENS_PROMPT: &str = "Era tokens (in wei)";
pub(super) const MSG_REWARD_PROMPT: &str = "Reward per operation (in wei)";
pub(super) const MSG_NO_KEYSTORE_WARNING: &str =
    "No Foundry keystore found. Remote deployments need one";
pub(super) const MSG_IMPORT_KEYSTORE_PROMPT: &str = "Import a wallet into a Foundry keystore now?";
pub(super) const MSG_KEYSTORE_NAME_PROMPT: &str = "Keystore account name";
pub(super) const MSG_CONFIGURATION_UPDATED: &str = "Configuration updated";

pub(super) fn msg_inputs_written(dirs: &[PathBuf]) -> String {
    let dirs: Vec<_> = dirs.iter().map(|dir| dir.display().to_string()).collect();
    format!("Deployment inputs written to {}", dirs.join(", "))
}

pub(super) fn msg_project_initialized(framework: Framework, source: ContractSource) -> String {
    format!("Project initialized with {framework} and the {source} contracts")
}

/// Contract sources related messages
pub(super) const MSG_SOURCE_HELP: &str = "Only handle this contract source";
pub(super) const MSG_SOURCES_UPDATE_HELP: &str = "Pull outdated sources without asking";
pub(super) const MSG_SOURCES_STATUS_HELP: &str = "Only show the status, change nothing";
pub(super) const MSG_UPDATE_CHOICE_PULL: &str = "Pull the latest changes";
pub(super) const MSG_UPDATE_CHOICE_CONTINUE: &str = "Continue with the current version";
pub(super) const MSG_STALE_CONTRACTS_WARNING: &str =
    "Continuing with outdated contracts, deployments may not match the latest release";
pub(super) const MSG_CONTRACT_SOURCES: &str = "Contract sources";
pub(super) const MSG_SOURCES_DONE: &str = "Contract sources checked";

pub(super) fn msg_cloning_source(source: ContractSource) -> String {
    format!("Cloning {source} contracts...")
}

pub(super) fn msg_clone_source_prompt(source: ContractSource) -> String {
    format!("The {source} contracts are not present. Clone them now?")
}

pub(super) fn msg_source_missing_err(source: ContractSource) -> String {
    format!(
        "The {source} contracts are required. Clone them with `evvm-scaffold sources --source {}`",
        source.to_string().to_lowercase()
    )
}

pub(super) fn msg_source_behind(source: ContractSource, behind: u32) -> String {
    format!("The {source} contracts are {behind} commit(s) behind the remote")
}

pub(super) fn msg_source_dirty(source: ContractSource, behind: u32) -> String {
    format!(
        "The {source} contracts are {behind} commit(s) behind but have uncommitted changes. \
         Commit or stash them to update"
    )
}

pub(super) fn msg_update_source_prompt(source: ContractSource) -> String {
    format!("How do you want to proceed with the {source} contracts?")
}

pub(super) fn msg_source_updated(source: ContractSource) -> String {
    format!("{source} contracts updated")
}

pub(super) fn msg_source_state(source: ContractSource) -> String {
    format!("{source} contracts")
}

pub(super) fn msg_source_status_line(source: ContractSource, status: &SourceStatus) -> String {
    let status = match status {
        SourceStatus::Missing => "missing".to_string(),
        SourceStatus::Bundled => "bundled".to_string(),
        SourceStatus::UpToDate => "up to date".to_string(),
        SourceStatus::Outdated { behind } => format!("{behind} commit(s) behind"),
        SourceStatus::Blocked { behind } => {
            format!("{behind} commit(s) behind, local changes block the update")
        }
    };
    format!("{source}: {status}")
}

/// Check related messages
pub(super) const MSG_CHECK_COMPLETE: &str = "Check complete";

pub(super) fn msg_available_frameworks(frameworks: &[Framework]) -> String {
    let names: Vec<_> = frameworks.iter().map(ToString::to_string).collect();
    format!("Available frameworks: {}", names.join(", "))
}

pub(super) const MSG_NO_DEPLOYMENT_YET: &str = "No deployment recorded yet";

pub(super) fn msg_latest_deployment(latest: &evvm_cli_config::DeploymentResult) -> String {
    format!(
        "Latest deployment: {} (chain {}) at {}",
        latest.network,
        latest.chain_id,
        latest.deployed_at.format("%Y-%m-%d %H:%M UTC")
    )
}

pub(super) fn msg_keystores_found(names: &[String]) -> String {
    if names.is_empty() {
        "No Foundry keystore accounts".to_string()
    } else {
        format!("Foundry keystore accounts: {}", names.join(", "))
    }
}

/// Wallet related messages
pub(super) const MSG_DEFAULT_WALLET_LABEL: &str = "Default local test account";
pub(super) const MSG_ENV_PRIVATE_KEY_LABEL: &str = "Private key from DEPLOYER_PRIVATE_KEY";
pub(super) const MSG_SELECT_WALLET_PROMPT: &str = "Select the deployer wallet";
pub(super) const MSG_NO_WALLET_AVAILABLE_ERR: &str =
    "No wallet available for this network. Import a keystore with `evvm-scaffold wallet import <name>` or set DEPLOYER_PRIVATE_KEY";
pub(super) const MSG_HARDHAT_KEYSTORE_UNSUPPORTED_ERR: &str =
    "Hardhat deployments cannot use Foundry keystores, set DEPLOYER_PRIVATE_KEY instead";
pub(super) const MSG_SWITCH_TO_DEFAULT_WALLET_PROMPT: &str =
    "Funding the wallet failed. Deploy with the default local test account instead?";
pub(super) const MSG_KEYSTORES: &str = "Foundry keystores";

pub(super) fn msg_unknown_keystore(name: &str, available: &[String]) -> String {
    format!("Keystore {name:?} not found, choose one of {available:?}")
}

pub(super) fn msg_keystore_imported(name: &str) -> String {
    format!("Keystore {name} imported")
}

pub(super) fn msg_keystore_entry(name: &str, address: Option<&str>) -> String {
    match address {
        Some(address) => format!("{name}: {address}"),
        None => format!("{name}: address unknown"),
    }
}

pub(super) fn msg_funding_strategy_failed(strategy: &str, error: &anyhow::Error) -> String {
    format!("Funding through {strategy} failed: {error:#}")
}

pub(super) fn msg_funded_wallet(address: &str, amount: &str, strategy: &str) -> String {
    format!("Funded {address} with {amount} ETH via {strategy}")
}

/// Local chain related messages
pub(super) const MSG_STARTING_CHAIN: &str = "Starting local chain";
pub(super) const MSG_STOPPING_STARTED_CHAIN: &str = "Stopping the local chain started by this run";

pub(super) fn msg_chain_already_running(url: &str) -> String {
    format!("Local chain already running at {url}")
}

pub(super) fn msg_chain_started(url: &str, pid: u32) -> String {
    format!("Local chain started at {url} (pid {pid})")
}

pub(super) fn msg_kill_port_prompt(port: u16) -> String {
    format!("Port {port} is used by another process. Kill it and start the local chain?")
}

pub(super) fn msg_stop_chain_failed(error: &anyhow::Error) -> String {
    format!("Failed to stop the local chain: {error:#}")
}

/// Network related messages
pub(super) fn msg_using_rpc(network: Network, url: &str) -> String {
    format!("Using {network} RPC {url}")
}

pub(super) fn msg_rpc_endpoint_skipped(url: &str, reason: &str) -> String {
    format!("Skipping RPC {url}: {reason}")
}

pub(super) fn msg_no_rpc_endpoint(network: Network) -> String {
    let hint = match network.rpc_url_env() {
        Some(key) => format!(". Set {key} in .env"),
        None => String::new(),
    };
    format!("No working RPC endpoint for {network}{hint}")
}

/// Deploy related messages
pub(super) const MSG_NETWORK_HELP: &str = "Network to deploy to";
pub(super) const MSG_WALLET_HELP: &str = "Foundry keystore account that signs the deployment";
pub(super) const MSG_SKIP_REGISTRY_HELP: &str = "Do not register the EVVM in the public registry";
pub(super) const MSG_SKIP_VERIFY_HELP: &str = "Do not verify the contracts on the block explorer";
pub(super) const MSG_NETWORK_PROMPT: &str = "Select the network";
pub(super) const MSG_DEPLOYING_CONTRACTS: &str = "Deploying contracts";
pub(super) const MSG_DEPLOYMENT_FAILED: &str = "Contract deployment failed";
pub(super) const MSG_DEPLOYMENT_SUMMARY: &str = "Deployment summary";
pub(super) const MSG_DEPLOYMENT_COMPLETE: &str = "Deployment complete";
pub(super) const MSG_VERIFY_SKIPPED_NO_KEY: &str =
    "ETHERSCAN_API is not set, skipping contract verification";

pub(super) fn msg_forge_clean_failed(error: &anyhow::Error) -> String {
    format!("forge clean failed, continuing: {error:#}")
}

pub(super) fn msg_artifacts_unreadable(error: &anyhow::Error) -> String {
    format!(
        "Could not read the deployment artifacts, the contracts may still have deployed: {error:#}"
    )
}

pub(super) fn msg_missing_contracts(missing: &[EvvmContract]) -> String {
    let names: Vec<_> = missing.iter().map(|contract| contract.artifact_name()).collect();
    format!(
        "Deployment incomplete, no address found for: {}. Run `evvm-scaffold flush --broadcast` and deploy again",
        names.join(", ")
    )
}

pub(super) fn msg_deployment_saved(path: &Path) -> String {
    format!("Deployment saved to {}", path.display())
}

/// Registry related messages
pub(super) const MSG_REGISTERING_EVVM: &str = "Registering the EVVM in the registry";
pub(super) const MSG_REGISTRY_REGISTER_FAILED: &str = "Registry registration failed";
pub(super) const MSG_REGISTRY_ID_NOT_FOUND: &str = "Could not find the assigned EVVM id";
pub(super) const MSG_REGISTRY_SET_ID_FAILED: &str = "Setting the EVVM id failed";
pub(super) const MSG_REGISTRY_SKIPPED_INCOMPLETE: &str =
    "No EVVM address was deployed, skipping registry registration";

pub(super) fn msg_registry_lookup_attempt(attempt: u32, attempts: u32) -> String {
    format!("Looking up the EVVM id ({attempt}/{attempts})")
}

pub(super) fn msg_evvm_id_assigned(id: U256) -> String {
    format!("EVVM id {id} assigned")
}

pub(super) fn msg_registry_rpc_unavailable(error: &anyhow::Error) -> String {
    format!("Registry network unreachable, skipping registration: {error:#}")
}

pub(super) fn msg_manual_register_command(registry: &str, chain_id: u64, evvm: &str) -> String {
    format!(
        "Register the EVVM:\n  cast send {registry} \"registerEvvm(uint256,address)\" {chain_id} {evvm} --rpc-url <sepolia rpc> --account <keystore>"
    )
}

pub(super) fn msg_manual_set_id_command(evvm: &str, id: Option<String>, rpc_url: &str) -> String {
    let id = id.unwrap_or_else(|| "<evvm id>".to_string());
    format!(
        "Set the EVVM id:\n  cast send {evvm} \"setEvvmID(uint256)\" {id} --rpc-url {rpc_url} --account <keystore>"
    )
}

/// Frontend related messages
pub(super) const MSG_SKIP_FRONTEND_HELP: &str = "Do not start the frontend";
pub(super) const MSG_STARTING_FRONTEND: &str = "Starting frontend";
pub(super) const MSG_FRONTEND_MISSING: &str =
    "No frontend/package.json found, skipping the frontend";
pub(super) const MSG_FRONTEND_SKIPPED: &str = "Frontend not started";
pub(super) const MSG_FRONTEND_CACHE_CLEARED: &str = "Frontend build cache cleared";

pub(super) fn msg_cache_not_cleared(error: &anyhow::Error) -> String {
    format!("Could not clear the frontend build cache, restart the dev server to pick up new values: {error:#}")
}
pub(super) const MSG_REUSING_CONFIGURATION: &str = "Using the existing project configuration";
pub(super) const MSG_SETUP_COMPLETE: &str = "Setup complete";

pub(super) fn msg_frontend_port_busy_prompt(port: u16) -> String {
    format!("Port {port} is already in use. Kill the process and start the frontend?")
}

pub(super) fn msg_frontend_ready(url: &str) -> String {
    format!("Frontend running at {url}")
}

pub(super) fn msg_frontend_timeout(url: &str, timeout: Duration, log: &Path) -> String {
    format!(
        "Frontend did not answer at {url} within {}s, see {}",
        timeout.as_secs(),
        log.display()
    )
}

pub(super) fn msg_full_start_ready(url: &str, deployed: bool) -> String {
    if deployed {
        format!("EVVM deployed, open {url}")
    } else {
        format!("Frontend running at {url}, check the deployment warnings above")
    }
}

/// Flush related messages
pub(super) const MSG_FLUSH_BROADCAST_HELP: &str = "Also remove the forge broadcast history";
pub(super) const MSG_STOPPING_PROCESSES: &str = "Stopping local chain and frontend";
pub(super) const MSG_NOTHING_TO_CLEAN: &str = "No caches to remove";
pub(super) const MSG_FLUSH_COMPLETE: &str = "Flush complete";

pub(super) fn msg_killed_processes(count: usize, target: &str) -> String {
    format!("Killed {count} process(es) on {target}")
}

pub(super) fn msg_removed_path(path: &Path) -> String {
    format!("Removed {}", path.display())
}

/// Autocomplete related messages
pub(super) fn msg_generate_autocomplete_file(filename: &str) -> String {
    format!("Generating completion file: {filename}")
}
