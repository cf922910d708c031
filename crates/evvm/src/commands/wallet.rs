use clap::Subcommand;
use evvm_cli_common::{cast, logger};
use xshell::Shell;

use crate::messages::{
    msg_keystore_entry, msg_keystore_imported, MSG_KEYSTORES, MSG_NO_KEYSTORE_WARNING,
};

#[derive(Subcommand, Debug)]
pub enum WalletCommands {
    /// List Foundry keystore accounts
    List,
    /// Import a private key into a new Foundry keystore
    Import {
        /// Keystore account name
        name: String,
    },
}

pub fn run(shell: &Shell, args: WalletCommands) -> anyhow::Result<()> {
    match args {
        WalletCommands::List => list(),
        WalletCommands::Import { name } => {
            cast::wallet_import(shell, &name)?;
            logger::success(msg_keystore_imported(&name));
            Ok(())
        }
    }
}

fn list() -> anyhow::Result<()> {
    let names = cast::list_keystores()?;
    if names.is_empty() {
        logger::warn(MSG_NO_KEYSTORE_WARNING);
        return Ok(());
    }
    let entries: Vec<_> = names
        .iter()
        .map(|name| {
            let address = cast::keystore_address(name)
                .map(|address| format!("{address:?}"))
                .ok();
            msg_keystore_entry(name, address.as_deref())
        })
        .collect();
    logger::note(MSG_KEYSTORES, entries.join("\n"));
    Ok(())
}
