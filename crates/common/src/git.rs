use std::path::{Path, PathBuf};

use xshell::{cmd, Shell};

use crate::cmd::Cmd;

const UPSTREAM: &str = "@{u}";

pub fn clone(
    shell: &Shell,
    path: &Path,
    repository: &str,
    name: &str,
) -> anyhow::Result<PathBuf> {
    if !shell.path_exists(path) {
        shell.create_dir(path)?;
    }
    let _dir = shell.push_dir(path);
    Cmd::new(cmd!(
        shell,
        "git clone --recurse-submodules {repository} {name}"
    ))
    .run()?;
    Ok(shell.current_dir().join(name))
}

pub fn submodule_update(shell: &Shell, link_to_code: &Path) -> anyhow::Result<()> {
    let _dir_guard = shell.push_dir(link_to_code);
    Cmd::new(cmd!(shell, "git submodule update --init --recursive")).run()?;
    Ok(())
}

/// Pulls the currently checked out branch from `origin`.
pub fn pull(shell: &Shell, link_to_code: &Path) -> anyhow::Result<()> {
    let _dir_guard = shell.push_dir(link_to_code);
    let current_branch = Cmd::new(cmd!(shell, "git rev-parse --abbrev-ref HEAD")).read_stdout()?;
    Cmd::new(cmd!(shell, "git pull origin {current_branch}")).run()?;
    Ok(())
}

pub fn fetch(shell: &Shell, link_to_code: &Path) -> anyhow::Result<()> {
    let _dir_guard = shell.push_dir(link_to_code);
    Cmd::new(cmd!(shell, "git fetch --quiet origin")).run()?;
    Ok(())
}

pub fn is_repository(shell: &Shell, path: &Path) -> bool {
    shell.path_exists(path.join(".git"))
}

pub fn head_commit(shell: &Shell, link_to_code: &Path) -> anyhow::Result<String> {
    let _dir_guard = shell.push_dir(link_to_code);
    Ok(Cmd::new(cmd!(shell, "git rev-parse HEAD")).read_stdout()?)
}

/// Commit the current branch tracks, `None` when no upstream is configured.
pub fn upstream_commit(shell: &Shell, link_to_code: &Path) -> anyhow::Result<Option<String>> {
    let _dir_guard = shell.push_dir(link_to_code);
    let upstream = UPSTREAM;
    let output = Cmd::new(cmd!(shell, "git rev-parse {upstream}")).run_with_output()?;
    if !output.status.success() {
        return Ok(None);
    }
    Ok(Some(String::from_utf8(output.stdout)?.trim().to_string()))
}

pub fn commits_behind(shell: &Shell, link_to_code: &Path) -> anyhow::Result<u32> {
    let _dir_guard = shell.push_dir(link_to_code);
    let range = format!("HEAD..{UPSTREAM}");
    let count = Cmd::new(cmd!(shell, "git rev-list --count {range}")).read_stdout()?;
    Ok(count.parse()?)
}

pub fn has_uncommitted_changes(shell: &Shell, link_to_code: &Path) -> anyhow::Result<bool> {
    let _dir_guard = shell.push_dir(link_to_code);
    let status = Cmd::new(cmd!(shell, "git status --porcelain")).read_stdout()?;
    Ok(!status.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_repo(shell: &Shell, path: &Path) {
        shell.create_dir(path).unwrap();
        let _dir = shell.push_dir(path);
        cmd!(shell, "git init --quiet").run().unwrap();
        cmd!(shell, "git -c user.email=dev@evvm.info -c user.name=dev commit --quiet --allow-empty -m init")
            .run()
            .unwrap();
    }

    #[test]
    fn detects_dirty_working_tree() {
        let shell = Shell::new().unwrap();
        let dir = shell.create_temp_dir().unwrap();
        let repo = dir.path().join("repo");
        init_repo(&shell, &repo);

        assert!(is_repository(&shell, &repo));
        assert!(!has_uncommitted_changes(&shell, &repo).unwrap());
        assert_eq!(head_commit(&shell, &repo).unwrap().len(), 40);

        shell.write_file(repo.join("Evvm.sol"), "contract Evvm {}").unwrap();
        assert!(has_uncommitted_changes(&shell, &repo).unwrap());
    }

    #[test]
    fn repository_without_upstream() {
        let shell = Shell::new().unwrap();
        let dir = shell.create_temp_dir().unwrap();
        let repo = dir.path().join("repo");
        init_repo(&shell, &repo);
        assert_eq!(upstream_commit(&shell, &repo).unwrap(), None);
    }
}
