use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use evvm_cli_common::files::{read_json_file, save_json_file};
use serde::{de::DeserializeOwned, Serialize};
use xshell::Shell;

// Files owned by the scaffold CLI. All of them are JSON.
pub trait FileConfigTrait {}

pub trait FileConfigWithDefaultName {
    const FILE_NAME: &'static str;

    fn get_path_with_base_path(base_path: impl AsRef<Path>) -> PathBuf {
        base_path.as_ref().join(Self::FILE_NAME)
    }
}

impl<T: Serialize + FileConfigTrait> SaveConfig for T {
    fn save(&self, shell: &Shell, path: impl AsRef<Path>) -> anyhow::Result<()> {
        ensure_json(path.as_ref())?;
        save_json_file(shell, path, self)
    }
}

impl<T> ReadConfigWithBasePath for T
where
    T: FileConfigWithDefaultName + ReadConfig,
{
    fn read_with_base_path(shell: &Shell, base_path: impl AsRef<Path>) -> anyhow::Result<Self> {
        <Self as ReadConfig>::read(shell, base_path.as_ref().join(Self::FILE_NAME))
    }
}

impl<T> SaveConfigWithBasePath for T where T: FileConfigWithDefaultName + SaveConfig {}

/// Reads a JSON config file from a given path.
pub trait ReadConfig: Sized {
    fn read(shell: &Shell, path: impl AsRef<Path>) -> anyhow::Result<Self>;
}

impl<T> ReadConfig for T
where
    T: DeserializeOwned + FileConfigTrait,
{
    fn read(shell: &Shell, path: impl AsRef<Path>) -> anyhow::Result<Self> {
        ensure_json(path.as_ref())?;
        read_json_file(shell, &path)
            .with_context(|| format!("Failed to parse config file {:?}.", path.as_ref()))
    }
}

/// Reads a config file from a base path.
pub trait ReadConfigWithBasePath: ReadConfig + FileConfigWithDefaultName {
    fn read_with_base_path(shell: &Shell, base_path: impl AsRef<Path>) -> anyhow::Result<Self>;
}

/// Saves a JSON config file to a given path.
pub trait SaveConfig {
    fn save(&self, shell: &Shell, path: impl AsRef<Path>) -> anyhow::Result<()>;
}

/// Saves a config file under a base path.
pub trait SaveConfigWithBasePath: SaveConfig + FileConfigWithDefaultName {
    fn save_with_base_path(
        &self,
        shell: &Shell,
        base_path: impl AsRef<Path>,
    ) -> anyhow::Result<()> {
        <Self as SaveConfig>::save(self, shell, base_path.as_ref().join(Self::FILE_NAME))
    }
}

fn ensure_json(path: &Path) -> anyhow::Result<()> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(()),
        _ => bail!("Unsupported file extension for config file {:?}.", path),
    }
}
