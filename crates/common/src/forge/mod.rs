use std::path::{Path, PathBuf};

use xshell::{cmd, Shell};

pub use self::script::{ForgeScript, ForgeScriptArg, ForgeScriptArgs};
use crate::cmd::Cmd;

mod script;

/// Forge is a wrapper around the forge binary.
pub struct Forge {
    path: PathBuf,
}

impl Forge {
    /// Create a new Forge instance rooted at a foundry project.
    pub fn new(path: &Path) -> Self {
        Forge {
            path: path.to_path_buf(),
        }
    }

    /// Create a new ForgeScript instance.
    ///
    /// The script path can be passed as a relative path to the base path
    /// or as an absolute path.
    pub fn script(&self, path: &Path, contract_name: &str, args: ForgeScriptArgs) -> ForgeScript {
        ForgeScript::new(self.path.clone(), path.to_path_buf(), contract_name, args)
    }

    /// Removes compiler caches. Broadcast history is left untouched.
    pub fn clean(&self, shell: &Shell) -> anyhow::Result<()> {
        let _dir_guard = shell.push_dir(&self.path);
        Cmd::new(cmd!(shell, "forge clean")).run()?;
        Ok(())
    }

    pub fn build(&self, shell: &Shell, via_ir: bool) -> anyhow::Result<()> {
        let _dir_guard = shell.push_dir(&self.path);
        let args: Vec<&str> = if via_ir { vec!["--via-ir"] } else { vec![] };
        Cmd::new(cmd!(shell, "forge build {args...}")).run()?;
        Ok(())
    }
}
