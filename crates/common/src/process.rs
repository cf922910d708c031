//! Port and process helpers for the long-running chain and frontend servers.

use std::{
    fs::{self, File},
    path::Path,
    process::{Command, Stdio},
    time::Duration,
};

use anyhow::Context;
use tokio::{net::TcpStream, time::timeout};
use xshell::{cmd, Shell};

use crate::{cmd::Cmd, logger};

/// Processes listening on `port`, via `lsof`.
pub fn pids_on_port(shell: &Shell, port: u16) -> anyhow::Result<Vec<u32>> {
    let spec = format!("tcp:{port}");
    let output = Cmd::new(cmd!(shell, "lsof -ti {spec}")).run_with_output()?;
    // lsof exits with 1 when nothing matches.
    if !output.status.success() {
        return Ok(vec![]);
    }
    Ok(parse_pids(&String::from_utf8_lossy(&output.stdout)))
}

fn parse_pids(output: &str) -> Vec<u32> {
    let mut pids: Vec<u32> = output
        .lines()
        .filter_map(|line| line.trim().parse().ok())
        .collect();
    pids.sort_unstable();
    pids.dedup();
    pids
}

pub fn kill_pids(shell: &Shell, pids: &[u32]) -> anyhow::Result<()> {
    if pids.is_empty() {
        return Ok(());
    }
    let pids: Vec<String> = pids.iter().map(u32::to_string).collect();
    Cmd::new(cmd!(shell, "kill -9 {pids...}")).run()?;
    Ok(())
}

/// Kills whatever holds `port`. Returns how many processes were signalled.
pub fn free_port(shell: &Shell, port: u16) -> anyhow::Result<usize> {
    let pids = pids_on_port(shell, port)?;
    kill_pids(shell, &pids)?;
    Ok(pids.len())
}

/// `pkill -9 -f pattern`; no match counts as success.
pub fn kill_by_name(shell: &Shell, pattern: &str) -> anyhow::Result<bool> {
    let output = Cmd::new(cmd!(shell, "pkill -9 -f {pattern}")).run_with_output()?;
    match output.status.code() {
        Some(0) => Ok(true),
        Some(1) => Ok(false),
        _ => anyhow::bail!(
            "pkill {pattern:?} failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ),
    }
}

pub async fn is_port_open(host: &str, port: u16) -> bool {
    matches!(
        timeout(Duration::from_millis(500), TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    )
}

/// Starts `program` in its own process group so it outlives this CLI.
/// Output is appended to `log_file`. Returns the child pid.
pub fn spawn_detached(
    cwd: &Path,
    program: &str,
    args: &[String],
    envs: &[(String, String)],
    log_file: &Path,
) -> anyhow::Result<u32> {
    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {parent:?}"))?;
    }
    let log = File::options()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {log_file:?}"))?;
    let err_log = log.try_clone()?;

    let mut command = Command::new(program);
    command
        .args(args)
        .current_dir(cwd)
        .envs(envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null())
        .stdout(Stdio::from(log))
        .stderr(Stdio::from(err_log));
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let child = command
        .spawn()
        .with_context(|| format!("Failed to start {program}"))?;
    logger::debug(format!(
        "Started {program} (pid {}), logs at {}",
        child.id(),
        log_file.display()
    ));
    Ok(child.id())
}
