use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use evvm_cli_types::{ContractSource, Framework};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use xshell::Shell;

use crate::{
    consts::{CONFIG_NAME, INPUT_DIR},
    traits::{FileConfigTrait, FileConfigWithDefaultName, ReadConfig, SaveConfigWithBasePath},
};

/// Choices made by `init`, read back by every later command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaffoldConfig {
    pub framework: Framework,
    pub contract_source: ContractSource,
    pub initialized: bool,
    pub timestamp: DateTime<Utc>,
}

impl FileConfigTrait for ScaffoldConfig {}

impl FileConfigWithDefaultName for ScaffoldConfig {
    const FILE_NAME: &'static str = CONFIG_NAME;
}

#[derive(Debug, Error)]
pub enum ScaffoldConfigFromFileError {
    #[error("Project not initialized (could not find 'scaffold.config.json' in {path:?}). Run `evvm-scaffold init` first")]
    NotExists { path: PathBuf },
    #[error("Invalid scaffold configuration")]
    InvalidConfig { source: anyhow::Error },
}

impl ScaffoldConfig {
    pub fn new(framework: Framework, contract_source: ContractSource) -> Self {
        Self {
            framework,
            contract_source,
            initialized: true,
            timestamp: Utc::now(),
        }
    }

    /// Reads the project state from the shell's current directory.
    pub fn from_file(shell: &Shell) -> Result<Self, ScaffoldConfigFromFileError> {
        let root = shell.current_dir();
        let path = Self::get_path_with_base_path(&root);
        if !shell.path_exists(&path) {
            return Err(ScaffoldConfigFromFileError::NotExists { path: root });
        }
        let config = Self::read(shell, &path)
            .map_err(|source| ScaffoldConfigFromFileError::InvalidConfig { source })?;
        if !config.initialized {
            return Err(ScaffoldConfigFromFileError::NotExists { path: root });
        }
        Ok(config)
    }

    /// Overwrites the state file with a fresh timestamp.
    pub fn save_in(&mut self, shell: &Shell, root: &Path) -> anyhow::Result<()> {
        self.timestamp = Utc::now();
        self.save_with_base_path(shell, root)
    }

    pub fn contracts_path(&self, root: &Path) -> PathBuf {
        root.join(self.contract_source.path())
    }

    pub fn package_path(&self, root: &Path) -> PathBuf {
        root.join(self.framework.package_dir())
    }

    pub fn input_dirs(&self, root: &Path) -> [PathBuf; 2] {
        [root.join(INPUT_DIR), self.package_path(root).join(INPUT_DIR)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_initialized() {
        let shell = Shell::new().unwrap();
        let dir = shell.create_temp_dir().unwrap();
        shell.change_dir(dir.path());
        let err = ScaffoldConfig::from_file(&shell).unwrap_err();
        assert!(matches!(err, ScaffoldConfigFromFileError::NotExists { .. }));
        assert!(err.to_string().starts_with("Project not initialized"));
    }

    #[test]
    fn saved_config_reads_back() {
        let shell = Shell::new().unwrap();
        let dir = shell.create_temp_dir().unwrap();
        shell.change_dir(dir.path());
        let mut config = ScaffoldConfig::new(Framework::Hardhat, ContractSource::Playground);
        config.save_in(&shell, dir.path()).unwrap();

        let raw = shell.read_file(dir.path().join(CONFIG_NAME)).unwrap();
        assert!(raw.contains(r#""contractSource": "playground""#));
        assert!(raw.contains(r#""framework": "hardhat""#));

        let read = ScaffoldConfig::from_file(&shell).unwrap();
        assert_eq!(read, config);
    }

    #[test]
    fn garbage_is_invalid() {
        let shell = Shell::new().unwrap();
        let dir = shell.create_temp_dir().unwrap();
        shell.change_dir(dir.path());
        shell.write_file(dir.path().join(CONFIG_NAME), "{ not json").unwrap();
        assert!(matches!(
            ScaffoldConfig::from_file(&shell),
            Err(ScaffoldConfigFromFileError::InvalidConfig { .. })
        ));
    }
}
