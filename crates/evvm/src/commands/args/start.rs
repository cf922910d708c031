use clap::Parser;

use super::{DeployArgs, ProjectArgs};
use crate::messages::MSG_SKIP_FRONTEND_HELP;

#[derive(Debug, Clone, Parser)]
pub struct StartArgs {
    #[clap(flatten)]
    pub project: ProjectArgs,
    #[clap(flatten)]
    pub deploy: DeployArgs,
    #[clap(long, help = MSG_SKIP_FRONTEND_HELP)]
    pub skip_frontend: bool,
}
