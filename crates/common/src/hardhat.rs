use std::path::{Path, PathBuf};

use xshell::{cmd, Shell};

use crate::cmd::Cmd;

/// Hardhat is a wrapper around `npx hardhat` inside a hardhat package.
pub struct Hardhat {
    path: PathBuf,
}

impl Hardhat {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// `hardhat deploy` through the hardhat-deploy plugin.
    pub fn deploy(
        &self,
        shell: &Shell,
        network: &str,
        envs: &[(String, String)],
    ) -> anyhow::Result<()> {
        let _dir_guard = shell.push_dir(&self.path);
        let mut cmd = Cmd::new(cmd!(shell, "npx hardhat deploy --network {network}"));
        for (key, value) in envs {
            cmd = cmd.env(key, value);
        }
        cmd.with_force_run().run()?;
        Ok(())
    }

    /// Runs a ts-node deploy script that consumes foundry build artifacts.
    pub fn deploy_from_foundry_artifacts(
        &self,
        shell: &Shell,
        script: &Path,
        network: &str,
        envs: &[(String, String)],
    ) -> anyhow::Result<()> {
        let _dir_guard = shell.push_dir(&self.path);
        let mut cmd = Cmd::new(cmd!(shell, "npx ts-node {script}")).env("HARDHAT_NETWORK", network);
        for (key, value) in envs {
            cmd = cmd.env(key, value);
        }
        cmd.with_force_run().run()?;
        Ok(())
    }

    pub fn clean(&self, shell: &Shell) -> anyhow::Result<()> {
        let _dir_guard = shell.push_dir(&self.path);
        Cmd::new(cmd!(shell, "npx hardhat clean")).run()?;
        Ok(())
    }

    /// Arguments for a detached `npx hardhat node`.
    pub fn node_args(host: &str, port: u16) -> Vec<String> {
        vec![
            "hardhat".to_string(),
            "node".to_string(),
            "--hostname".to_string(),
            host.to_string(),
            "--port".to_string(),
            port.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_args_bind_host_and_port() {
        assert_eq!(
            Hardhat::node_args("127.0.0.1", 8545),
            vec!["hardhat", "node", "--hostname", "127.0.0.1", "--port", "8545"]
        );
    }
}
