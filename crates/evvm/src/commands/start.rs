use evvm_cli_common::logger;
use evvm_cli_config::{FrontendSettings, ScaffoldConfig, ScaffoldConfigFromFileError};
use xshell::Shell;

use super::{
    args::StartArgs,
    deploy::deploy_project,
    init::{collect, init_project},
};
use crate::{
    messages::{msg_full_start_ready, MSG_REUSING_CONFIGURATION, MSG_SETUP_COMPLETE},
    utils::{
        frontend::{launch, FrontendOutcome},
        sources::ensure_source,
    },
};

/// The whole pipeline: setup when needed, deploy, then the frontend.
pub async fn run(shell: &Shell, args: StartArgs) -> anyhow::Result<()> {
    let root = shell.current_dir();
    let scaffold = match ScaffoldConfig::from_file(shell) {
        Ok(mut config) => {
            logger::info(MSG_REUSING_CONFIGURATION);
            ensure_source(shell, &root, config.contract_source, false)?;
            config.save_in(shell, &root)?;
            config
        }
        Err(ScaffoldConfigFromFileError::NotExists { .. }) => {
            let project = collect(shell, &root, args.project)?;
            init_project(shell, &root, &project)?
        }
        Err(err) => return Err(err.into()),
    };

    let result = deploy_project(shell, &root, &scaffold, args.deploy).await?;

    let frontend = if args.skip_frontend {
        FrontendOutcome::Skipped
    } else {
        launch(shell, &root, &FrontendSettings::default()).await?
    };

    match frontend {
        FrontendOutcome::Started { url, .. } => {
            logger::outro(msg_full_start_ready(&url, result.is_some()))
        }
        FrontendOutcome::Skipped => logger::outro(MSG_SETUP_COMPLETE),
    }
    Ok(())
}
