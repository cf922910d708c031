use std::path::Path;

use anyhow::Context;
use ethers::types::Address;
use evvm_cli_common::{cast, ethereum, forge::ForgeScriptArgs, logger, PromptConfirm};
use evvm_cli_config::{
    DeploymentResult, EnvFile, LocalChainSettings, NetworkSettings, ProjectEnv, RegistrySettings,
    ScaffoldConfig,
};
use evvm_cli_types::{Framework, Network};
use xshell::Shell;

use super::args::DeployArgs;
use crate::{
    messages::{
        msg_artifacts_unreadable, msg_deployment_saved, msg_missing_contracts,
        msg_registry_rpc_unavailable, MSG_DEPLOYING_CONTRACTS, MSG_DEPLOYMENT_COMPLETE,
        MSG_DEPLOYMENT_FAILED, MSG_DEPLOYMENT_SUMMARY, MSG_SWITCH_TO_DEFAULT_WALLET_PROMPT,
    },
    utils::{
        deployer::{self, DeployContext},
        frontend::publish_env,
        funding::{top_up, FundingPolicy},
        local_chain::{start_local_chain, stop_on_failure, FrameworkNode},
        network::resolve_rpc_url,
        registry::{register_evvm, RegistrationTarget, Registry},
        wallet::{deployer_address, select_wallet, DeployerWallet},
    },
};

pub async fn run(shell: &Shell, args: DeployArgs) -> anyhow::Result<()> {
    let scaffold = ScaffoldConfig::from_file(shell)?;
    let root = shell.current_dir();
    deploy_project(shell, &root, &scaffold, args).await?;
    logger::outro(MSG_DEPLOYMENT_COMPLETE);
    Ok(())
}

/// Compiles and deploys, then records the result for the frontend.
/// `None` when the deployment ran but its artifacts could not be read.
pub(crate) async fn deploy_project(
    shell: &Shell,
    root: &Path,
    scaffold: &ScaffoldConfig,
    args: DeployArgs,
) -> anyhow::Result<Option<DeploymentResult>> {
    let network = args.network()?;
    let local = LocalChainSettings::default();
    let networks = NetworkSettings::default();
    let project_env = ProjectEnv::load(shell, root)?;

    let keystores = match scaffold.framework {
        Framework::Foundry => cast::list_keystores()?,
        Framework::Hardhat => vec![],
    };
    let wallet = select_wallet(
        args.wallet.as_deref(),
        network,
        scaffold.framework,
        &keystores,
        project_env.deployer_private_key(),
    )?;

    let stage = Stage {
        shell,
        root,
        scaffold,
        network,
        local: &local,
        networks: &networks,
        project_env: &project_env,
        verify: !args.skip_verify,
    };
    let (wallet, rpc_url) = if network.is_local() {
        let launcher = FrameworkNode::new(scaffold.framework, root);
        let outcome = start_local_chain(shell, &local, &launcher).await?;
        stop_on_failure(
            shell,
            &local,
            &launcher,
            outcome,
            stage.fund_and_deploy(wallet, args.forge_args),
        )
        .await?
    } else {
        stage.fund_and_deploy(wallet, args.forge_args).await?
    };
    let chain_id = local.chain_id_for(network);

    let (contracts, recorded_deployer) =
        match deployer::read_deployment(shell, scaffold, root, network, chain_id) {
            Ok(found) => found,
            Err(err) => {
                logger::warn(msg_artifacts_unreadable(&err));
                return Ok(None);
            }
        };

    let mut result = DeploymentResult::new(contracts, network, chain_id);
    result.deployer_address = recorded_deployer.or_else(|| deployer_address(&wallet, &local));
    result.deployer_wallet = wallet.keystore_name().map(str::to_string);

    let missing = result.missing_contracts();
    if !missing.is_empty() {
        logger::warn(msg_missing_contracts(&missing));
    }

    let history = result.save_history(shell, root)?;
    logger::info(msg_deployment_saved(&history));

    let mut env = EnvFile::load(shell, root)?;
    env.apply_deployment(&result);
    if !network.is_local() && !args.skip_registry {
        register(
            shell,
            &wallet,
            &local,
            &networks,
            &project_env,
            network,
            &rpc_url,
            &result,
            &mut env,
        )
        .await;
    }
    publish_env(shell, root, &env)?;

    logger::note(MSG_DEPLOYMENT_SUMMARY, logger::object_to_string(result.summary()));
    Ok(Some(result))
}

/// The part of a deployment that runs against the chain. A local chain
/// started for it is stopped again when any of it fails.
struct Stage<'a> {
    shell: &'a Shell,
    root: &'a Path,
    scaffold: &'a ScaffoldConfig,
    network: Network,
    local: &'a LocalChainSettings,
    networks: &'a NetworkSettings,
    project_env: &'a ProjectEnv,
    verify: bool,
}

impl Stage<'_> {
    /// Returns the wallet that signed and the RPC url it was sent to.
    async fn fund_and_deploy(
        &self,
        wallet: DeployerWallet,
        forge_args: ForgeScriptArgs,
    ) -> anyhow::Result<(DeployerWallet, String)> {
        let (wallet, rpc_url) = if self.network.is_local() {
            let wallet = if wallet.is_default_local() {
                wallet
            } else {
                fund_local_wallet(self.local, wallet, &FundingPolicy::local(self.local)).await?
            };
            (wallet, self.local.rpc_url())
        } else {
            let rpc_url =
                resolve_rpc_url(self.network, self.networks, self.local, self.project_env).await?;
            (wallet, rpc_url)
        };

        logger::step(MSG_DEPLOYING_CONTRACTS);
        let ctx = DeployContext {
            root: self.root,
            scaffold: self.scaffold,
            network: self.network,
            rpc_url: &rpc_url,
            wallet: &wallet,
            local: self.local,
            etherscan_api_key: self.project_env.etherscan_api_key(),
            verify: self.verify,
            forge_args,
        };
        deployer::deploy(self.shell, ctx).context(MSG_DEPLOYMENT_FAILED)?;
        Ok((wallet, rpc_url))
    }
}

/// Tops a non-default wallet up from the pre-funded account. When every
/// strategy fails the user may fall back to the default account.
async fn fund_local_wallet(
    local: &LocalChainSettings,
    wallet: DeployerWallet,
    policy: &FundingPolicy,
) -> anyhow::Result<DeployerWallet> {
    let address: Address = wallet.address(local)?;
    let balance = ethereum::balance(&local.rpc_url(), address).await?;
    match top_up(policy, local, address, balance).await {
        Ok(_) => Ok(wallet),
        Err(err) => {
            logger::warn(err.to_string());
            if PromptConfirm::new(MSG_SWITCH_TO_DEFAULT_WALLET_PROMPT)
                .default(true)
                .ask()?
            {
                Ok(DeployerWallet::DefaultLocal)
            } else {
                Err(err.into())
            }
        }
    }
}

/// Registry failures only warn, the deployment itself already succeeded.
#[allow(clippy::too_many_arguments)]
async fn register(
    shell: &Shell,
    wallet: &DeployerWallet,
    local: &LocalChainSettings,
    networks: &NetworkSettings,
    project_env: &ProjectEnv,
    network: Network,
    rpc_url: &str,
    result: &DeploymentResult,
    env: &mut EnvFile,
) {
    let settings = RegistrySettings::default();
    let registry_rpc = if settings.network == network {
        rpc_url.to_string()
    } else {
        match resolve_rpc_url(settings.network, networks, local, project_env).await {
            Ok(url) => url,
            Err(err) => {
                logger::warn(msg_registry_rpc_unavailable(&err));
                return;
            }
        }
    };
    let registry = Registry::new(shell, &settings, registry_rpc, wallet.cast_auth(local));
    let target = RegistrationTarget {
        chain_id: result.chain_id,
        evvm_address: &result.contracts.evvm_address,
        rpc_url,
    };
    register_evvm(&registry, &target, env).await;
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use async_trait::async_trait;
    use ethers::types::U256;

    use super::*;
    use crate::utils::{
        funding::FundingStrategy,
        local_chain::{tests::RecordingLauncher, ChainOutcome},
    };

    struct RefusingStrategy;

    #[async_trait]
    impl FundingStrategy for RefusingStrategy {
        fn name(&self) -> &'static str {
            "refusing"
        }

        async fn fund(&self, _rpc_url: &str, _to: Address, _amount: U256) -> anyhow::Result<()> {
            anyhow::bail!("no funds available")
        }
    }

    #[tokio::test]
    async fn failed_funding_stops_the_chain_it_started() {
        let shell = Shell::new().unwrap();
        let local = LocalChainSettings::default();
        let launcher = RecordingLauncher::default();
        let policy = FundingPolicy::new(vec![Box::new(RefusingStrategy)]);

        let err = stop_on_failure(&shell, &local, &launcher, ChainOutcome::Started { pid: 1 }, async {
            top_up(&policy, &local, Address::zero(), U256::zero()).await?;
            Ok::<_, anyhow::Error>(())
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("no funds available"));
        assert_eq!(launcher.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn deploy_without_init_writes_nothing() {
        let shell = Shell::new().unwrap();
        let dir = shell.create_temp_dir().unwrap();
        shell.change_dir(dir.path());

        let args = DeployArgs {
            network: Some(Network::Localhost),
            ..DeployArgs::default()
        };
        let err = run(&shell, args).await.unwrap_err();
        assert!(err.to_string().starts_with("Project not initialized"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
