use clap::Parser;
use evvm_cli_common::{forge::ForgeScriptArgs, PromptSelect};
use evvm_cli_types::Network;
use strum::IntoEnumIterator;

use crate::messages::{
    MSG_NETWORK_HELP, MSG_NETWORK_PROMPT, MSG_SKIP_REGISTRY_HELP, MSG_SKIP_VERIFY_HELP,
    MSG_WALLET_HELP,
};

#[derive(Debug, Clone, Default, Parser)]
pub struct DeployArgs {
    #[clap(long, help = MSG_NETWORK_HELP, value_enum)]
    pub network: Option<Network>,
    #[clap(long, help = MSG_WALLET_HELP)]
    pub wallet: Option<String>,
    #[clap(long, help = MSG_SKIP_REGISTRY_HELP)]
    pub skip_registry: bool,
    #[clap(long, help = MSG_SKIP_VERIFY_HELP)]
    pub skip_verify: bool,
    #[clap(flatten)]
    pub forge_args: ForgeScriptArgs,
}

impl DeployArgs {
    pub fn network(&self) -> anyhow::Result<Network> {
        match self.network {
            Some(network) => Ok(network),
            None => PromptSelect::new(MSG_NETWORK_PROMPT, Network::iter()).ask(),
        }
    }
}
