use std::path::PathBuf;

use clap::Parser;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use xshell::{cmd, Shell};

use crate::{cmd::Cmd, logger};

/// ForgeScript is a wrapper around the forge script command.
pub struct ForgeScript {
    base_path: PathBuf,
    script_path: PathBuf,
    contract_name: String,
    args: ForgeScriptArgs,
}

impl ForgeScript {
    pub(super) fn new(
        base_path: PathBuf,
        script_path: PathBuf,
        contract_name: &str,
        args: ForgeScriptArgs,
    ) -> Self {
        Self {
            base_path,
            script_path,
            contract_name: contract_name.to_string(),
            args,
        }
    }

    /// Run the forge script command attached to the terminal, so keystore
    /// password prompts reach the user.
    pub fn run(mut self, shell: &Shell) -> anyhow::Result<()> {
        let _dir_guard = shell.push_dir(&self.base_path);
        let target = self.target();
        let args = self.args.build();
        Cmd::new(cmd!(shell, "forge script {target} {args...}"))
            .with_force_run()
            .run()?;
        Ok(())
    }

    /// `<script>:<contract>` as forge expects it.
    pub fn target(&self) -> String {
        format!("{}:{}", self.script_path.display(), self.contract_name)
    }

    pub fn wallet_args_passed(&self) -> bool {
        self.args.wallet_args_passed()
    }

    /// Add the rpc-url flag to the forge script command.
    pub fn with_rpc_url(mut self, rpc_url: String) -> Self {
        self.args.add_arg(ForgeScriptArg::RpcUrl { url: rpc_url });
        self
    }

    /// Add the broadcast flag to the forge script command.
    pub fn with_broadcast(mut self) -> Self {
        self.args.add_arg(ForgeScriptArg::Broadcast);
        self
    }

    /// Compile through the IR pipeline, required by the EVVM contracts' size.
    pub fn with_via_ir(mut self) -> Self {
        self.args.add_arg(ForgeScriptArg::ViaIr);
        self
    }

    /// Adds the private key of the deployer account.
    pub fn with_private_key(mut self, private_key: &SecretString) -> Self {
        self.args.add_arg(ForgeScriptArg::PrivateKey {
            private_key: private_key.expose_secret().clone(),
        });
        self
    }

    /// Signs with a named keystore; forge asks for its password.
    pub fn with_account(mut self, name: &str) -> Self {
        self.args.add_arg(ForgeScriptArg::Account {
            name: name.to_string(),
        });
        self
    }

    pub fn with_verify(mut self, etherscan_api_key: &SecretString) -> Self {
        self.args.add_arg(ForgeScriptArg::Verify);
        self.args.add_arg(ForgeScriptArg::EtherscanApiKey {
            key: etherscan_api_key.expose_secret().clone(),
        });
        self
    }

    pub fn with_verbosity(mut self, level: u8) -> Self {
        self.args.verbosity = level;
        self
    }
}

const PROHIBITED_ARGS: [&str; 10] = [
    "--contracts",
    "--root",
    "--lib-paths",
    "--out",
    "--sig",
    "--target-contract",
    "--chain-id",
    "-C",
    "-O",
    "-s",
];

const WALLET_ARGS: [&str; 18] = [
    "-a",
    "--froms",
    "-i",
    "--private-keys",
    "--private-key",
    "--mnemonics",
    "--mnenomic-passphrases",
    "--mnemonic-derivation-paths",
    "--mnemonic-indexes",
    "--keystore",
    "--account",
    "--password",
    "--password-file",
    "-l",
    "--ledger",
    "-t",
    "--trezor",
    "--aws",
];

/// Set of known forge script arguments necessary for execution.
#[derive(strum::Display, Debug, Serialize, Deserialize, Clone, PartialEq)]
#[strum(serialize_all = "kebab-case", prefix = "--")]
pub enum ForgeScriptArg {
    #[strum(to_string = "rpc-url={url}")]
    RpcUrl { url: String },
    Broadcast,
    ViaIr,
    #[strum(to_string = "private-key={private_key}")]
    PrivateKey { private_key: String },
    #[strum(to_string = "account={name}")]
    Account { name: String },
    Verify,
    #[strum(to_string = "etherscan-api-key={key}")]
    EtherscanApiKey { key: String },
}

/// ForgeScriptArgs is a set of arguments that can be passed to the forge script command.
#[derive(Default, Debug, Serialize, Deserialize, Parser, Clone)]
pub struct ForgeScriptArgs {
    /// List of known forge script arguments.
    #[clap(skip)]
    args: Vec<ForgeScriptArg>,
    /// Number of `v` in the `-v` verbosity flag, zero for none.
    #[clap(skip)]
    verbosity: u8,
    /// List of additional arguments that can be passed through the CLI.
    ///
    /// e.g.: `evvm-scaffold deploy -a --slow`
    #[clap(long, short, help_heading = "Forge options")]
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = false)]
    additional_args: Vec<String>,
}

impl ForgeScriptArgs {
    /// Build the forge script command arguments.
    pub fn build(&mut self) -> Vec<String> {
        self.cleanup_contract_args();
        let verbosity = (self.verbosity > 0).then(|| format!("-{}", "v".repeat(self.verbosity.into())));
        self.args
            .iter()
            .map(|arg| arg.to_string())
            .chain(verbosity)
            .chain(self.additional_args.clone())
            .collect()
    }

    /// Cleanup the contract arguments which are not allowed to be passed through the CLI.
    fn cleanup_contract_args(&mut self) {
        let mut skip_next = false;
        let mut cleaned_args = vec![];
        let mut forbidden_args = vec![];

        let prohibited_with_equals: Vec<String> = PROHIBITED_ARGS
            .iter()
            .map(|arg| format!("{arg}="))
            .collect();

        for arg in self.additional_args.iter() {
            if skip_next {
                skip_next = false;
                continue;
            }

            if PROHIBITED_ARGS.contains(&arg.as_str()) {
                skip_next = true;
                forbidden_args.push(arg.clone());
                continue;
            }

            if prohibited_with_equals
                .iter()
                .any(|prohibited_arg| arg.starts_with(prohibited_arg))
            {
                forbidden_args.push(arg.clone());
                continue;
            }

            cleaned_args.push(arg.clone());
        }

        if !forbidden_args.is_empty() {
            logger::warn(format!(
                "The following arguments are not allowed to be passed through the CLI and were skipped: {:?}",
                forbidden_args
            ));
        }

        self.additional_args = cleaned_args;
    }

    /// Add additional arguments to the forge script command.
    /// If the argument already exists, a warning will be printed.
    pub fn add_arg(&mut self, arg: ForgeScriptArg) {
        if self.args.contains(&arg) {
            logger::warn(format!("Argument {arg:?} already exists"));
            return;
        }
        self.args.push(arg);
    }

    pub fn wallet_args_passed(&self) -> bool {
        self.additional_args.iter().any(|arg| {
            let name = arg.split('=').next().unwrap_or(arg);
            WALLET_ARGS.contains(&name)
        })
    }
}
