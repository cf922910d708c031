use evvm_cli_common::logger;
use evvm_cli_config::ScaffoldConfig;
use xshell::Shell;

use super::{args::ProjectArgs, init::collect};
use crate::{
    messages::{msg_inputs_written, MSG_CONFIGURATION_UPDATED, MSG_PROJECT_CONFIGURATION},
    utils::sources::ensure_source,
};

/// Re-runs the prompts with the stored values as defaults and rewrites the inputs.
pub fn run(shell: &Shell, args: ProjectArgs) -> anyhow::Result<()> {
    let root = shell.current_dir();
    let mut config = ScaffoldConfig::from_file(shell)?;
    let project = collect(shell, &root, args)?;
    project.log_summary(MSG_PROJECT_CONFIGURATION);

    if project.contract_source != config.contract_source {
        ensure_source(shell, &root, project.contract_source, false)?;
    }

    config.framework = project.framework;
    config.contract_source = project.contract_source;
    let dirs = config.input_dirs(&root);
    project.inputs.write(shell, &dirs, project.contract_source)?;
    logger::info(msg_inputs_written(&dirs));
    config.save_in(shell, &root)?;

    logger::outro(MSG_CONFIGURATION_UPDATED);
    Ok(())
}
