use std::path::Path;

use anyhow::Context;
use serde::{de::DeserializeOwned, Serialize};
use xshell::Shell;

pub fn read_json_file<T>(shell: &Shell, file_path: impl AsRef<Path>) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let content = shell.read_file(file_path.as_ref())?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON file {:?}", file_path.as_ref()))
}

pub fn save_json_file(
    shell: &Shell,
    file_path: impl AsRef<Path>,
    data: impl Serialize,
) -> anyhow::Result<()> {
    let mut content = serde_json::to_string_pretty(&data)?;
    content.push('\n');
    shell.write_file(file_path, content)?;
    Ok(())
}
