use evvm_cli_common::logger;
use xshell::Shell;

use super::args::SourcesArgs;
use crate::{
    messages::{msg_source_state, MSG_SOURCES_DONE},
    utils::sources::{ensure_source, inspect},
};

/// Shows and syncs the contract repositories.
pub fn run(shell: &Shell, args: SourcesArgs) -> anyhow::Result<()> {
    let root = shell.current_dir();
    for source in args.selected() {
        let state = if args.status {
            inspect(shell, &root, source, true)?
        } else {
            ensure_source(shell, &root, source, args.update)?
        };
        logger::note(msg_source_state(source), logger::object_to_string(&state));
    }
    logger::outro(MSG_SOURCES_DONE);
    Ok(())
}
