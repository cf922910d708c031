use std::path::Path;

use evvm_cli_common::{cast, framework_tools, logger, Prompt, PromptConfirm};
use evvm_cli_config::{DeploymentInputs, ScaffoldConfig, ScaffoldConfigFromFileError, INPUT_DIR};
use evvm_cli_types::{ContractSource, Framework};
use xshell::Shell;

use super::args::{ProjectArgs, ProjectArgsFinal};
use crate::{
    messages::{
        msg_inputs_written, msg_project_initialized, MSG_IMPORT_KEYSTORE_PROMPT,
        MSG_KEYSTORE_NAME_PROMPT, MSG_MISSING_TOOLS_NOTE, MSG_NO_KEYSTORE_WARNING,
        MSG_PROJECT_CONFIGURATION,
    },
    utils::sources::ensure_source,
};

pub fn run(shell: &Shell, args: ProjectArgs) -> anyhow::Result<()> {
    let root = shell.current_dir();
    let project = collect(shell, &root, args)?;
    init_project(shell, &root, &project)?;
    Ok(())
}

/// Runs the prerequisite probe and the prompts, seeded from an earlier `init`.
pub(crate) fn collect(
    shell: &Shell,
    root: &Path,
    args: ProjectArgs,
) -> anyhow::Result<ProjectArgsFinal> {
    let tools = framework_tools(shell);
    if !tools.missing.is_empty() {
        logger::note(MSG_MISSING_TOOLS_NOTE, tools.missing.join("\n"));
    }
    let previous = previous_project(shell, root)?;
    args.fill_values_with_prompt(&tools.available(), previous)
}

/// Earlier choices, `None` for a fresh project.
pub(crate) fn previous_project(
    shell: &Shell,
    root: &Path,
) -> anyhow::Result<Option<(Framework, ContractSource, DeploymentInputs)>> {
    let config = match ScaffoldConfig::from_file(shell) {
        Ok(config) => config,
        Err(ScaffoldConfigFromFileError::NotExists { .. }) => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let inputs = DeploymentInputs::read(shell, &root.join(INPUT_DIR))?.unwrap_or_default();
    Ok(Some((config.framework, config.contract_source, inputs)))
}

/// Gets the contracts, writes every input file and saves the project state.
pub(crate) fn init_project(
    shell: &Shell,
    root: &Path,
    project: &ProjectArgsFinal,
) -> anyhow::Result<ScaffoldConfig> {
    project.log_summary(MSG_PROJECT_CONFIGURATION);
    ensure_source(shell, root, project.contract_source, false)?;

    let mut config = ScaffoldConfig::new(project.framework, project.contract_source);
    let dirs = config.input_dirs(root);
    project
        .inputs
        .write(shell, &dirs, project.contract_source)?;
    logger::info(msg_inputs_written(&dirs));
    config.save_in(shell, root)?;

    if project.framework == Framework::Foundry {
        offer_keystore_import(shell)?;
    }

    logger::outro(msg_project_initialized(project.framework, project.contract_source));
    Ok(config)
}

/// Foundry deployments to remote networks need a keystore account.
fn offer_keystore_import(shell: &Shell) -> anyhow::Result<()> {
    if !cast::list_keystores()?.is_empty() {
        return Ok(());
    }
    logger::warn(MSG_NO_KEYSTORE_WARNING);
    if PromptConfirm::new(MSG_IMPORT_KEYSTORE_PROMPT)
        .default(false)
        .ask()?
    {
        let name = Prompt::new(MSG_KEYSTORE_NAME_PROMPT)
            .default("defaultKey")
            .ask_required()?;
        cast::wallet_import(shell, &name)?;
    }
    Ok(())
}
