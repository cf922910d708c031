use std::path::Path;

use evvm_cli_common::{cast, framework_tools, logger};
use evvm_cli_config::DeploymentResult;
use evvm_cli_types::ContractSource;
use strum::IntoEnumIterator;
use xshell::Shell;

use crate::{
    messages::{
        msg_available_frameworks, msg_keystores_found, msg_latest_deployment,
        msg_missing_contracts, msg_source_status_line, MSG_CHECK_COMPLETE, MSG_CONTRACT_SOURCES,
        MSG_MISSING_TOOLS_NOTE, MSG_NO_DEPLOYMENT_YET, MSG_NO_FRAMEWORK_ERR,
    },
    utils::sources::inspect,
};

/// Reports usable toolchains, contract sources and keystores without changing anything.
pub fn run(shell: &Shell) -> anyhow::Result<()> {
    let root = shell.current_dir();
    let tools = framework_tools(shell);
    let available = tools.available();
    if available.is_empty() {
        logger::warn(MSG_NO_FRAMEWORK_ERR);
    } else {
        logger::success(msg_available_frameworks(&available));
    }
    if !tools.missing.is_empty() {
        logger::note(MSG_MISSING_TOOLS_NOTE, tools.missing.join("\n"));
    }

    let mut lines = vec![];
    for source in ContractSource::iter() {
        let state = inspect(shell, &root, source, false)?;
        lines.push(msg_source_status_line(source, &state.status()));
    }
    logger::note(MSG_CONTRACT_SOURCES, lines.join("\n"));

    if tools.foundry {
        logger::info(msg_keystores_found(&cast::list_keystores()?));
    }

    report_latest_deployment(shell, &root)?;

    logger::outro(MSG_CHECK_COMPLETE);
    Ok(())
}

/// Returns whether the last recorded deployment is complete, `None` without one.
fn report_latest_deployment(shell: &Shell, root: &Path) -> anyhow::Result<Option<bool>> {
    let Some(latest) = DeploymentResult::read_latest(shell, root)? else {
        logger::info(MSG_NO_DEPLOYMENT_YET);
        return Ok(None);
    };
    logger::note(
        msg_latest_deployment(&latest),
        logger::object_to_string(latest.summary()),
    );
    let complete = latest.is_complete();
    if !complete {
        logger::warn(msg_missing_contracts(&latest.missing_contracts()));
    }
    Ok(Some(complete))
}

#[cfg(test)]
mod tests {
    use evvm_cli_config::ContractAddresses;
    use evvm_cli_types::Network;

    use super::*;

    #[test]
    fn no_history_reports_nothing() {
        let shell = Shell::new().unwrap();
        let dir = shell.create_temp_dir().unwrap();
        assert_eq!(report_latest_deployment(&shell, dir.path()).unwrap(), None);
    }

    #[test]
    fn sentinel_addresses_mark_latest_as_incomplete() {
        let shell = Shell::new().unwrap();
        let dir = shell.create_temp_dir().unwrap();
        let result = DeploymentResult::new(ContractAddresses::default(), Network::Localhost, 31337);
        result.save_history(&shell, dir.path()).unwrap();
        assert_eq!(
            report_latest_deployment(&shell, dir.path()).unwrap(),
            Some(false)
        );
    }
}
