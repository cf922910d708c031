use clap::Parser;
use evvm_cli_types::ContractSource;
use strum::IntoEnumIterator;

use crate::messages::{MSG_SOURCE_HELP, MSG_SOURCES_STATUS_HELP, MSG_SOURCES_UPDATE_HELP};

#[derive(Debug, Clone, Default, Parser)]
pub struct SourcesArgs {
    #[clap(long, help = MSG_SOURCE_HELP, value_enum)]
    pub source: Option<ContractSource>,
    #[clap(long, help = MSG_SOURCES_UPDATE_HELP, conflicts_with = "status")]
    pub update: bool,
    #[clap(long, help = MSG_SOURCES_STATUS_HELP)]
    pub status: bool,
}

impl SourcesArgs {
    pub fn selected(&self) -> Vec<ContractSource> {
        match self.source {
            Some(source) => vec![source],
            None => ContractSource::iter().collect(),
        }
    }
}
