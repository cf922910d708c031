use std::path::{Path, PathBuf};

use evvm_cli_common::{git, logger, spinner::Spinner, PromptConfirm, PromptSelect};
use evvm_cli_types::ContractSource;
use serde::Serialize;
use strum::{EnumIter, IntoEnumIterator};
use xshell::Shell;

use crate::messages::{
    msg_clone_source_prompt, msg_cloning_source, msg_source_behind, msg_source_dirty,
    msg_source_missing_err, msg_source_updated, msg_update_source_prompt, MSG_STALE_CONTRACTS_WARNING,
    MSG_UPDATE_CHOICE_CONTINUE, MSG_UPDATE_CHOICE_PULL,
};

/// Local state of one contract source checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoState {
    pub exists: bool,
    /// Copy shipped without git metadata, never updated.
    pub bundled: bool,
    pub local_commit: Option<String>,
    pub remote_commit: Option<String>,
    pub behind: u32,
    pub has_uncommitted_changes: bool,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    Missing,
    Bundled,
    UpToDate,
    Outdated { behind: u32 },
    /// Behind the remote but holding local edits, which are never overwritten.
    Blocked { behind: u32 },
}

impl RepoState {
    pub fn status(&self) -> SourceStatus {
        if !self.exists {
            SourceStatus::Missing
        } else if self.bundled {
            SourceStatus::Bundled
        } else if self.behind == 0 {
            SourceStatus::UpToDate
        } else if self.has_uncommitted_changes {
            SourceStatus::Blocked {
                behind: self.behind,
            }
        } else {
            SourceStatus::Outdated {
                behind: self.behind,
            }
        }
    }
}

/// Inspects `source` under `root`. With `fetch` the remote is contacted first;
/// fetch failures leave the last known remote state.
pub fn inspect(
    shell: &Shell,
    root: &Path,
    source: ContractSource,
    fetch: bool,
) -> anyhow::Result<RepoState> {
    let path = root.join(source.path());
    let mut state = RepoState {
        path: path.clone(),
        ..RepoState::default()
    };
    if !shell.path_exists(&path) || shell.read_dir(&path)?.is_empty() {
        return Ok(state);
    }
    state.exists = true;
    if !git::is_repository(shell, &path) {
        state.bundled = true;
        return Ok(state);
    }

    if fetch {
        if let Err(err) = git::fetch(shell, &path) {
            logger::debug(format!("git fetch failed for {}: {err:#}", path.display()));
        }
    }
    state.local_commit = Some(git::head_commit(shell, &path)?);
    state.remote_commit = git::upstream_commit(shell, &path)?;
    if state.remote_commit.is_some() && state.remote_commit != state.local_commit {
        state.behind = git::commits_behind(shell, &path)?;
    }
    state.has_uncommitted_changes = git::has_uncommitted_changes(shell, &path)?;
    Ok(state)
}

pub fn clone_source(shell: &Shell, root: &Path, source: ContractSource) -> anyhow::Result<PathBuf> {
    let target = root.join(source.path());
    let (parent, name) = match (target.parent(), target.file_name()) {
        (Some(parent), Some(name)) => (parent.to_path_buf(), name.to_string_lossy().into_owned()),
        _ => anyhow::bail!("Invalid contract source path {target:?}"),
    };
    let spinner = Spinner::new(&msg_cloning_source(source));
    match git::clone(shell, &parent, source.repository(), &name) {
        Ok(path) => {
            spinner.finish();
            Ok(path)
        }
        Err(err) => {
            spinner.fail();
            Err(err)
        }
    }
}

pub fn update_source(shell: &Shell, state: &RepoState) -> anyhow::Result<()> {
    git::pull(shell, &state.path)?;
    git::submodule_update(shell, &state.path)?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
enum UpdateChoice {
    Pull,
    Continue,
}

impl std::fmt::Display for UpdateChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateChoice::Pull => write!(f, "{MSG_UPDATE_CHOICE_PULL}"),
            UpdateChoice::Continue => write!(f, "{MSG_UPDATE_CHOICE_CONTINUE}"),
        }
    }
}

/// Makes sure `source` exists locally, offering to clone it or pull updates.
/// `auto_update` pulls without asking.
pub fn ensure_source(
    shell: &Shell,
    root: &Path,
    source: ContractSource,
    auto_update: bool,
) -> anyhow::Result<RepoState> {
    let state = inspect(shell, root, source, true)?;
    match state.status() {
        SourceStatus::Missing => {
            if !PromptConfirm::new(msg_clone_source_prompt(source))
                .default(true)
                .ask()?
            {
                anyhow::bail!(msg_source_missing_err(source));
            }
            clone_source(shell, root, source)?;
            inspect(shell, root, source, false)
        }
        SourceStatus::Bundled | SourceStatus::UpToDate => Ok(state),
        SourceStatus::Outdated { behind } => {
            logger::warn(msg_source_behind(source, behind));
            let choice = if auto_update {
                UpdateChoice::Pull
            } else {
                PromptSelect::new(&msg_update_source_prompt(source), UpdateChoice::iter()).ask()?
            };
            match choice {
                UpdateChoice::Pull => {
                    update_source(shell, &state)?;
                    logger::success(msg_source_updated(source));
                    inspect(shell, root, source, false)
                }
                UpdateChoice::Continue => {
                    logger::warn(MSG_STALE_CONTRACTS_WARNING);
                    Ok(state)
                }
            }
        }
        SourceStatus::Blocked { behind } => {
            logger::warn(msg_source_dirty(source, behind));
            logger::warn(MSG_STALE_CONTRACTS_WARNING);
            Ok(state)
        }
    }
}

#[cfg(test)]
mod tests {
    use xshell::cmd;

    use super::*;

    #[test]
    fn status_follows_repository_state() {
        let mut state = RepoState::default();
        assert_eq!(state.status(), SourceStatus::Missing);
        state.exists = true;
        state.bundled = true;
        assert_eq!(state.status(), SourceStatus::Bundled);
        state.bundled = false;
        assert_eq!(state.status(), SourceStatus::UpToDate);
        state.behind = 3;
        assert_eq!(state.status(), SourceStatus::Outdated { behind: 3 });
        state.has_uncommitted_changes = true;
        assert_eq!(state.status(), SourceStatus::Blocked { behind: 3 });
    }

    #[test]
    fn plain_directory_is_bundled() {
        let shell = Shell::new().unwrap();
        let dir = shell.create_temp_dir().unwrap();
        assert!(!inspect(&shell, dir.path(), ContractSource::Testnet, false)
            .unwrap()
            .exists);

        shell
            .write_file(
                dir.path().join(ContractSource::Testnet.path()).join("Evvm.sol"),
                "contract Evvm {}",
            )
            .unwrap();
        let state = inspect(&shell, dir.path(), ContractSource::Testnet, false).unwrap();
        assert_eq!(state.status(), SourceStatus::Bundled);
    }

    #[test]
    fn clone_reports_commits_behind() {
        let shell = Shell::new().unwrap();
        let dir = shell.create_temp_dir().unwrap();
        let remote = dir.path().join("remote");
        shell.create_dir(&remote).unwrap();
        {
            let _guard = shell.push_dir(&remote);
            cmd!(shell, "git init --quiet").run().unwrap();
            cmd!(shell, "git -c user.email=dev@evvm.info -c user.name=dev commit --quiet --allow-empty -m one")
                .run()
                .unwrap();
        }
        let checkout = dir.path().join(ContractSource::Playground.path());
        shell.create_dir(checkout.parent().unwrap()).unwrap();
        cmd!(shell, "git clone --quiet {remote} {checkout}").run().unwrap();
        {
            let _guard = shell.push_dir(&remote);
            cmd!(shell, "git -c user.email=dev@evvm.info -c user.name=dev commit --quiet --allow-empty -m two")
                .run()
                .unwrap();
        }

        let state = inspect(&shell, dir.path(), ContractSource::Playground, true).unwrap();
        assert_eq!(state.status(), SourceStatus::Outdated { behind: 1 });
        assert_ne!(state.local_commit, state.remote_commit);

        shell.write_file(checkout.join("local.sol"), "// edit").unwrap();
        let state = inspect(&shell, dir.path(), ContractSource::Playground, false).unwrap();
        assert_eq!(state.status(), SourceStatus::Blocked { behind: 1 });
    }
}
