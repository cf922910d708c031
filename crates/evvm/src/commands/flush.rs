use std::path::{Path, PathBuf};

use evvm_cli_common::{logger, process};
use evvm_cli_config::{
    FrontendSettings, LocalChainSettings, BROADCAST_DIR, FRONTEND_DIR, NEXT_CACHE_DIR,
};
use evvm_cli_types::Framework;
use strum::IntoEnumIterator;
use xshell::Shell;

use super::args::FlushArgs;
use crate::messages::{
    msg_killed_processes, msg_removed_path, MSG_FLUSH_COMPLETE, MSG_NOTHING_TO_CLEAN,
    MSG_STOPPING_PROCESSES,
};

const FOUNDRY_CACHES: [&str; 2] = ["cache", "out"];
const HARDHAT_CACHES: [&str; 2] = ["artifacts", "cache"];

/// Stops the local chain and the frontend, then removes build caches.
pub fn run(shell: &Shell, args: FlushArgs) -> anyhow::Result<()> {
    let root = shell.current_dir();

    logger::step(MSG_STOPPING_PROCESSES);
    let ports = [
        LocalChainSettings::default().port,
        FrontendSettings::default().port,
    ];
    for port in ports {
        let killed = process::free_port(shell, port)?;
        if killed > 0 {
            logger::info(msg_killed_processes(killed, &format!("port {port}")));
        }
    }
    for framework in Framework::iter() {
        let name = framework.node_process_name();
        if process::kill_by_name(shell, name)? {
            logger::info(msg_killed_processes(1, name));
        }
    }

    let mut removed = 0;
    for path in cache_paths(&root, args.broadcast) {
        if shell.path_exists(&path) {
            shell.remove_path(&path)?;
            logger::info(msg_removed_path(&path));
            removed += 1;
        }
    }
    if removed == 0 {
        logger::info(MSG_NOTHING_TO_CLEAN);
    }

    logger::outro(MSG_FLUSH_COMPLETE);
    Ok(())
}

/// Everything `flush` deletes. Broadcast history only on request.
fn cache_paths(root: &Path, broadcast: bool) -> Vec<PathBuf> {
    let foundry = root.join(Framework::Foundry.package_dir());
    let hardhat = root.join(Framework::Hardhat.package_dir());
    let mut paths: Vec<_> = FOUNDRY_CACHES
        .iter()
        .map(|dir| foundry.join(dir))
        .chain(HARDHAT_CACHES.iter().map(|dir| hardhat.join(dir)))
        .collect();
    paths.push(root.join(FRONTEND_DIR).join(NEXT_CACHE_DIR));
    if broadcast {
        paths.push(foundry.join(BROADCAST_DIR));
    }
    paths
}
