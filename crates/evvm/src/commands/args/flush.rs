use clap::Parser;

use crate::messages::MSG_FLUSH_BROADCAST_HELP;

#[derive(Debug, Clone, Default, Parser)]
pub struct FlushArgs {
    #[clap(long, help = MSG_FLUSH_BROADCAST_HELP)]
    pub broadcast: bool,
}
