use std::{
    future::Future,
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use evvm_cli_common::{
    ethereum::{chain_id, wait_for_chain},
    hardhat::Hardhat,
    logger,
    process::{free_port, is_port_open, kill_by_name, spawn_detached},
    PromptConfirm, PromptCancelled,
};
use evvm_cli_config::{LocalChainSettings, CHAIN_LOG_FILE, LOGS_DIR};
use evvm_cli_types::Framework;
use thiserror::Error;
use xshell::Shell;

use crate::messages::{
    msg_chain_already_running, msg_chain_started, msg_kill_port_prompt, msg_stop_chain_failed,
    MSG_STARTING_CHAIN, MSG_STOPPING_STARTED_CHAIN,
};

/// What answers on the local chain port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStatus {
    NotRunning,
    /// Answers `eth_chainId` with the expected id.
    Running,
    /// Something else holds the port. `None` when it does not speak JSON-RPC.
    Conflict { chain_id: Option<u64> },
}

#[derive(Debug, Error)]
pub enum LocalChainError {
    #[error("Port {port} is used by another process (chain id {}), expected a local chain with id {expected}", .chain_id.map_or("unknown".to_string(), |id| id.to_string()))]
    PortConflict {
        port: u16,
        chain_id: Option<u64>,
        expected: u64,
    },
    #[error("Local chain did not answer on {url} within {}s, see {log:?}", .timeout.as_secs())]
    StartTimeout {
        url: String,
        timeout: Duration,
        log: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOutcome {
    AlreadyRunning,
    /// Started by this run, killed again if the pipeline fails.
    Started { pid: u32 },
}

/// Starts a local node in the background and stops it again.
#[async_trait]
pub trait NodeLauncher: Send + Sync {
    async fn launch(&self, settings: &LocalChainSettings) -> anyhow::Result<u32>;

    fn stop(&self, shell: &Shell, settings: &LocalChainSettings) -> anyhow::Result<()>;

    fn log_file(&self) -> PathBuf;
}

/// Launches `anvil` or `npx hardhat node` detached from this process.
pub struct FrameworkNode {
    framework: Framework,
    root: PathBuf,
}

impl FrameworkNode {
    pub fn new(framework: Framework, root: &Path) -> Self {
        Self {
            framework,
            root: root.to_path_buf(),
        }
    }
}

#[async_trait]
impl NodeLauncher for FrameworkNode {
    async fn launch(&self, settings: &LocalChainSettings) -> anyhow::Result<u32> {
        let log = self.log_file();
        match self.framework {
            Framework::Foundry => spawn_detached(
                &self.root,
                "anvil",
                &[
                    "--host".to_string(),
                    settings.host.clone(),
                    "--port".to_string(),
                    settings.port.to_string(),
                    "--chain-id".to_string(),
                    settings.chain_id.to_string(),
                ],
                &[],
                &log,
            ),
            Framework::Hardhat => spawn_detached(
                &self.root.join(Framework::Hardhat.package_dir()),
                "npx",
                &Hardhat::node_args(&settings.host, settings.port),
                &[],
                &log,
            ),
        }
    }

    fn stop(&self, shell: &Shell, settings: &LocalChainSettings) -> anyhow::Result<()> {
        stop_local_chain(shell, settings, self.framework)
    }

    fn log_file(&self) -> PathBuf {
        self.root.join(LOGS_DIR).join(CHAIN_LOG_FILE)
    }
}

pub async fn status(settings: &LocalChainSettings) -> ChainStatus {
    if !is_port_open(&settings.host, settings.port).await {
        return ChainStatus::NotRunning;
    }
    match chain_id(&settings.rpc_url(), Duration::from_secs(2)).await {
        Ok(id) if id == settings.chain_id => ChainStatus::Running,
        Ok(id) => ChainStatus::Conflict { chain_id: Some(id) },
        Err(_) => ChainStatus::Conflict { chain_id: None },
    }
}

/// Reuses a running local chain or starts one. Never starts a second node
/// over a port that is already taken.
pub async fn ensure_running(
    settings: &LocalChainSettings,
    launcher: &dyn NodeLauncher,
) -> anyhow::Result<ChainOutcome> {
    match status(settings).await {
        ChainStatus::Running => Ok(ChainOutcome::AlreadyRunning),
        ChainStatus::Conflict { chain_id } => Err(LocalChainError::PortConflict {
            port: settings.port,
            chain_id,
            expected: settings.chain_id,
        }
        .into()),
        ChainStatus::NotRunning => {
            let pid = launcher.launch(settings).await?;
            let url = settings.rpc_url();
            if wait_for_chain(
                &url,
                Some(settings.chain_id),
                settings.poll_interval,
                settings.start_timeout,
            )
            .await
            {
                Ok(ChainOutcome::Started { pid })
            } else {
                Err(LocalChainError::StartTimeout {
                    url,
                    timeout: settings.start_timeout,
                    log: launcher.log_file(),
                }
                .into())
            }
        }
    }
}

/// [`ensure_running`] with the interactive kill-or-abort choice on a port
/// conflict.
pub async fn start_local_chain(
    shell: &Shell,
    settings: &LocalChainSettings,
    launcher: &dyn NodeLauncher,
) -> anyhow::Result<ChainOutcome> {
    logger::step(MSG_STARTING_CHAIN);
    let outcome = ensure_running_or_reclaim(settings, launcher, |port| {
        if !PromptConfirm::new(msg_kill_port_prompt(port))
            .default(false)
            .ask()?
        {
            return Ok(false);
        }
        free_port(shell, port)?;
        Ok(true)
    })
    .await?;
    match outcome {
        ChainOutcome::AlreadyRunning => logger::info(msg_chain_already_running(&settings.rpc_url())),
        ChainOutcome::Started { pid } => logger::success(msg_chain_started(&settings.rpc_url(), pid)),
    }
    Ok(outcome)
}

/// On a port conflict asks `reclaim` to free the port and tries once more.
/// `reclaim` returning `false` aborts with [`PromptCancelled`].
pub async fn ensure_running_or_reclaim(
    settings: &LocalChainSettings,
    launcher: &dyn NodeLauncher,
    reclaim: impl FnOnce(u16) -> anyhow::Result<bool>,
) -> anyhow::Result<ChainOutcome> {
    match ensure_running(settings, launcher).await {
        Err(err) => match err.downcast_ref::<LocalChainError>() {
            Some(LocalChainError::PortConflict { port, .. }) => {
                let port = *port;
                logger::warn(err.to_string());
                if !reclaim(port)? {
                    return Err(PromptCancelled.into());
                }
                ensure_running(settings, launcher).await
            }
            _ => Err(err),
        },
        outcome => outcome,
    }
}

/// Awaits `stage` and stops the node when it fails, but only if this run
/// started it. A stop failure is reported and the stage error returned.
pub async fn stop_on_failure<T>(
    shell: &Shell,
    settings: &LocalChainSettings,
    launcher: &dyn NodeLauncher,
    outcome: ChainOutcome,
    stage: impl Future<Output = anyhow::Result<T>>,
) -> anyhow::Result<T> {
    let result = stage.await;
    if result.is_err() && matches!(outcome, ChainOutcome::Started { .. }) {
        logger::warn(MSG_STOPPING_STARTED_CHAIN);
        if let Err(stop_err) = launcher.stop(shell, settings) {
            logger::warn(msg_stop_chain_failed(&stop_err));
        }
    }
    result
}

/// Tears the node down again, by port and by process name.
pub fn stop_local_chain(
    shell: &Shell,
    settings: &LocalChainSettings,
    framework: Framework,
) -> anyhow::Result<()> {
    free_port(shell, settings.port)?;
    kill_by_name(shell, framework.node_process_name())?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use evvm_cli_common::ethereum::test_utils::json_rpc_responder;

    use super::*;

    #[derive(Default)]
    pub(crate) struct RecordingLauncher {
        pub(crate) launches: AtomicUsize,
        pub(crate) stops: AtomicUsize,
    }

    #[async_trait]
    impl NodeLauncher for RecordingLauncher {
        async fn launch(&self, _settings: &LocalChainSettings) -> anyhow::Result<u32> {
            self.launches.fetch_add(1, Ordering::SeqCst);
            Ok(4242)
        }

        fn stop(&self, _shell: &Shell, _settings: &LocalChainSettings) -> anyhow::Result<()> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn log_file(&self) -> PathBuf {
            PathBuf::from("chain.log")
        }
    }

    pub(crate) fn settings_for(url: &str) -> LocalChainSettings {
        let url = url::Url::parse(url).unwrap();
        LocalChainSettings {
            host: url.host_str().unwrap().to_string(),
            port: url.port().unwrap(),
            poll_interval: Duration::from_millis(50),
            start_timeout: Duration::from_millis(200),
            ..LocalChainSettings::default()
        }
    }

    #[tokio::test]
    async fn running_local_chain_is_reused() {
        let url = json_rpc_responder(r#""0x7a69""#).await;
        let settings = settings_for(&url);
        let launcher = RecordingLauncher::default();

        assert_eq!(status(&settings).await, ChainStatus::Running);
        let outcome = ensure_running(&settings, &launcher).await.unwrap();
        assert_eq!(outcome, ChainOutcome::AlreadyRunning);
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn foreign_chain_on_port_is_a_conflict() {
        let url = json_rpc_responder(r#""0xaa36a7""#).await;
        let settings = settings_for(&url);
        let launcher = RecordingLauncher::default();

        let err = ensure_running(&settings, &launcher).await.unwrap_err();
        match err.downcast_ref::<LocalChainError>() {
            Some(LocalChainError::PortConflict {
                chain_id, expected, ..
            }) => {
                assert_eq!(*chain_id, Some(11_155_111));
                assert_eq!(*expected, 31_337);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn free_port_launches_and_times_out_without_node() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let settings = settings_for(&format!("http://127.0.0.1:{port}"));
        let launcher = RecordingLauncher::default();

        assert_eq!(status(&settings).await, ChainStatus::NotRunning);
        let err = ensure_running(&settings, &launcher).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LocalChainError>(),
            Some(LocalChainError::StartTimeout { .. })
        ));
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn declined_reclaim_aborts_without_launching() {
        let url = json_rpc_responder(r#""0x1""#).await;
        let settings = settings_for(&url);
        let launcher = RecordingLauncher::default();
        let mut asked = None;

        let err = ensure_running_or_reclaim(&settings, &launcher, |port| {
            asked = Some(port);
            Ok(false)
        })
        .await
        .unwrap_err();
        assert!(err.downcast_ref::<PromptCancelled>().is_some());
        assert_eq!(asked, Some(settings.port));
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn port_still_taken_after_reclaim_is_reported() {
        let url = json_rpc_responder(r#""0x1""#).await;
        let settings = settings_for(&url);
        let launcher = RecordingLauncher::default();
        let mut reclaims = 0;

        let err = ensure_running_or_reclaim(&settings, &launcher, |_| {
            reclaims += 1;
            Ok(true)
        })
        .await
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LocalChainError>(),
            Some(LocalChainError::PortConflict { chain_id: Some(1), .. })
        ));
        assert_eq!(reclaims, 1);
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn started_chain_is_stopped_when_stage_fails() {
        let settings = LocalChainSettings::default();
        let launcher = RecordingLauncher::default();
        let shell = Shell::new().unwrap();

        let result: anyhow::Result<()> = stop_on_failure(
            &shell,
            &settings,
            &launcher,
            ChainOutcome::Started { pid: 4242 },
            async { anyhow::bail!("forge script failed") },
        )
        .await;
        assert_eq!(result.unwrap_err().to_string(), "forge script failed");
        assert_eq!(launcher.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reused_chain_survives_failed_stage() {
        let settings = LocalChainSettings::default();
        let launcher = RecordingLauncher::default();
        let shell = Shell::new().unwrap();

        let result: anyhow::Result<()> = stop_on_failure(
            &shell,
            &settings,
            &launcher,
            ChainOutcome::AlreadyRunning,
            async { anyhow::bail!("forge script failed") },
        )
        .await;
        assert!(result.is_err());
        assert_eq!(launcher.stops.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_stage_leaves_started_chain_running() {
        let settings = LocalChainSettings::default();
        let launcher = RecordingLauncher::default();
        let shell = Shell::new().unwrap();

        let value = stop_on_failure(
            &shell,
            &settings,
            &launcher,
            ChainOutcome::Started { pid: 4242 },
            async { Ok::<_, anyhow::Error>(7) },
        )
        .await
        .unwrap();
        assert_eq!(value, 7);
        assert_eq!(launcher.stops.load(Ordering::SeqCst), 0);
    }
}
