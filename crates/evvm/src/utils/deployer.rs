use std::path::{Path, PathBuf};

use evvm_cli_common::{
    forge::{Forge, ForgeScriptArgs},
    hardhat::Hardhat,
    logger,
};
use evvm_cli_config::{
    read_foundry_deployment, read_hardhat_deployment, ContractAddresses, LocalChainSettings,
    ScaffoldConfig, DEPLOYER_PRIVATE_KEY_ENV, FOUNDRY_DEPLOY_CONTRACT, FOUNDRY_DEPLOY_SCRIPT,
    HARDHAT_FOUNDRY_DEPLOY_SCRIPT, REMAPPINGS_FILE,
};
use evvm_cli_types::{Framework, Network};
use secrecy::{ExposeSecret, SecretString};
use xshell::Shell;

use crate::{
    messages::{msg_forge_clean_failed, MSG_VERIFY_SKIPPED_NO_KEY},
    utils::wallet::DeployerWallet,
};

/// Everything one deployment run needs.
pub struct DeployContext<'a> {
    pub root: &'a Path,
    pub scaffold: &'a ScaffoldConfig,
    pub network: Network,
    pub rpc_url: &'a str,
    pub wallet: &'a DeployerWallet,
    pub local: &'a LocalChainSettings,
    pub etherscan_api_key: Option<SecretString>,
    pub verify: bool,
    pub forge_args: ForgeScriptArgs,
}

impl DeployContext<'_> {
    fn package_path(&self) -> PathBuf {
        self.scaffold.package_path(self.root)
    }
}

/// `forge clean` then `forge script ... --broadcast --via-ir -vvvv`.
pub fn deploy_foundry(shell: &Shell, ctx: DeployContext<'_>) -> anyhow::Result<()> {
    let forge = Forge::new(&ctx.package_path());
    if let Err(err) = forge.clean(shell) {
        logger::warn(msg_forge_clean_failed(&err));
    }

    let mut script = forge
        .script(
            Path::new(FOUNDRY_DEPLOY_SCRIPT),
            FOUNDRY_DEPLOY_CONTRACT,
            ctx.forge_args.clone(),
        )
        .with_rpc_url(ctx.rpc_url.to_string())
        .with_broadcast()
        .with_via_ir()
        .with_verbosity(4);
    if !script.wallet_args_passed() {
        script = ctx.wallet.sign_script(script, ctx.local);
    }
    if !ctx.network.is_local() && ctx.verify {
        match &ctx.etherscan_api_key {
            Some(key) => script = script.with_verify(key),
            None => logger::warn(MSG_VERIFY_SKIPPED_NO_KEY),
        }
    }
    script.run(shell)
}

/// Self-referential imports in the contract sources break hardhat's own
/// compiler, so those sources are built by forge and deployed from its
/// artifacts.
pub fn needs_foundry_artifacts(shell: &Shell, contracts: &Path) -> bool {
    shell.path_exists(contracts.join(REMAPPINGS_FILE))
}

pub fn deploy_hardhat(shell: &Shell, ctx: DeployContext<'_>) -> anyhow::Result<()> {
    let hardhat = Hardhat::new(&ctx.package_path());
    let private_key = ctx.wallet.hardhat_private_key(ctx.local)?;
    let envs = vec![(
        DEPLOYER_PRIVATE_KEY_ENV.to_string(),
        private_key.expose_secret().clone(),
    )];
    let network = ctx.network.hardhat_name();

    let contracts = ctx.scaffold.contracts_path(ctx.root);
    if needs_foundry_artifacts(shell, &contracts) {
        Forge::new(&contracts).build(shell, true)?;
        hardhat.deploy_from_foundry_artifacts(
            shell,
            Path::new(HARDHAT_FOUNDRY_DEPLOY_SCRIPT),
            network,
            &envs,
        )
    } else {
        hardhat.deploy(shell, network, &envs)
    }
}

pub fn deploy(shell: &Shell, ctx: DeployContext<'_>) -> anyhow::Result<()> {
    match ctx.scaffold.framework {
        Framework::Foundry => deploy_foundry(shell, ctx),
        Framework::Hardhat => deploy_hardhat(shell, ctx),
    }
}

/// Deployed addresses plus the deployer recorded by the framework, if any.
pub fn read_deployment(
    shell: &Shell,
    scaffold: &ScaffoldConfig,
    root: &Path,
    network: Network,
    chain_id: u64,
) -> anyhow::Result<(ContractAddresses, Option<String>)> {
    let package = scaffold.package_path(root);
    match scaffold.framework {
        Framework::Foundry => Ok((read_foundry_deployment(shell, &package, chain_id)?, None)),
        Framework::Hardhat => {
            let deployment = read_hardhat_deployment(shell, &package, network.hardhat_name())?;
            Ok((deployment.contracts, deployment.deployer))
        }
    }
}

#[cfg(test)]
mod tests {
    use evvm_cli_types::ContractSource;

    use super::*;

    #[test]
    fn remappings_select_foundry_artifact_route() {
        let shell = Shell::new().unwrap();
        let dir = shell.create_temp_dir().unwrap();
        assert!(!needs_foundry_artifacts(&shell, dir.path()));
        shell
            .write_file(dir.path().join(REMAPPINGS_FILE), "@evvm/=lib/evvm/\n")
            .unwrap();
        assert!(needs_foundry_artifacts(&shell, dir.path()));
    }

    #[test]
    fn foundry_deployment_is_read_from_broadcast() {
        let shell = Shell::new().unwrap();
        let dir = shell.create_temp_dir().unwrap();
        let scaffold = ScaffoldConfig::new(Framework::Foundry, ContractSource::Testnet);
        shell
            .write_file(
                dir.path()
                    .join("packages/foundry/broadcast/Deploy.s.sol/31337/run-latest.json"),
                r#"{"transactions":[{"contractName":"P2PSwap","contractAddress":"0xP2P1"}]}"#,
            )
            .unwrap();
        let (addresses, deployer) =
            read_deployment(&shell, &scaffold, dir.path(), Network::Localhost, 31337).unwrap();
        assert_eq!(addresses.p2p_swap_address.as_deref(), Some("0xP2P1"));
        assert_eq!(deployer, None);
    }

    #[test]
    fn hardhat_deployment_uses_network_name() {
        let shell = Shell::new().unwrap();
        let dir = shell.create_temp_dir().unwrap();
        let scaffold = ScaffoldConfig::new(Framework::Hardhat, ContractSource::Testnet);
        shell
            .write_file(
                dir.path()
                    .join("packages/hardhat/deployments/arbitrumSepolia/deployment-summary.json"),
                r#"{"contracts":{"Evvm":"0xE"},"deployer":"0xD"}"#,
            )
            .unwrap();
        let (addresses, deployer) =
            read_deployment(&shell, &scaffold, dir.path(), Network::ArbSepolia, 421_614).unwrap();
        assert_eq!(addresses.evvm_address, "0xE");
        assert_eq!(deployer.as_deref(), Some("0xD"));
    }
}
