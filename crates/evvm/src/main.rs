use clap::{command, Parser, Subcommand};
use evvm_cli_common::{
    check_general_prerequisites,
    config::{global_config, init_global_config, GlobalConfig},
    error::log_error,
    init_prompt_theme, logger,
};
use xshell::Shell;

use crate::commands::{
    args::{AutocompleteArgs, DeployArgs, FlushArgs, ProjectArgs, SourcesArgs, StartArgs},
    wallet::WalletCommands,
};

mod commands;
mod messages;
mod utils;

#[derive(Parser, Debug)]
#[command(
    name = "evvm-scaffold",
    version,
    about = "Configure, deploy and run an EVVM instance"
)]
struct EvvmScaffold {
    #[command(subcommand)]
    command: EvvmSubcommands,
    #[clap(flatten)]
    global: EvvmGlobalArgs,
}

#[derive(Subcommand, Debug)]
pub enum EvvmSubcommands {
    /// Guided first-time setup: framework, contract sources and deployment inputs
    Init(ProjectArgs),
    /// Compile and deploy the contracts
    Deploy(DeployArgs),
    /// Edit the stored configuration
    Config(ProjectArgs),
    /// Clone or update the contract source repositories
    Sources(SourcesArgs),
    /// Stop the local chain and frontend, then clear build caches
    Flush(FlushArgs),
    /// Run the whole pipeline, from setup to a running frontend
    #[command(alias = "full-start")]
    Start(StartArgs),
    /// Report installed toolchains and contract sources
    Check,
    /// Foundry keystore accounts
    #[command(subcommand)]
    Wallet(WalletCommands),
    /// Create shell autocompletion files
    Autocomplete(AutocompleteArgs),
}

#[derive(Parser, Debug)]
#[clap(next_help_heading = "Global options")]
struct EvvmGlobalArgs {
    /// Verbose mode
    #[clap(short, long, global = true)]
    verbose: bool,
    /// Ignores prerequisites checks
    #[clap(long, global = true)]
    ignore_prerequisites: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    human_panic::setup_panic!();

    // We must parse arguments before printing the intro, because some autocomplete
    // generators rely on the output of `--help`.
    let args = EvvmScaffold::parse();

    init_prompt_theme();

    logger::new_empty_line();
    logger::intro();

    let shell = Shell::new()?;

    init_global_config(GlobalConfig {
        verbose: args.global.verbose,
        ignore_prerequisites: args.global.ignore_prerequisites,
    });

    if !global_config().ignore_prerequisites {
        check_general_prerequisites(&shell);
    }

    match run_subcommand(args, &shell).await {
        Ok(()) => {}
        Err(error) => {
            if log_error(error) {
                std::process::exit(0);
            }
            std::process::exit(1);
        }
    }
    Ok(())
}

async fn run_subcommand(args: EvvmScaffold, shell: &Shell) -> anyhow::Result<()> {
    match args.command {
        EvvmSubcommands::Init(args) => commands::init::run(shell, args)?,
        EvvmSubcommands::Deploy(args) => commands::deploy::run(shell, args).await?,
        EvvmSubcommands::Config(args) => commands::config::run(shell, args)?,
        EvvmSubcommands::Sources(args) => commands::sources::run(shell, args)?,
        EvvmSubcommands::Flush(args) => commands::flush::run(shell, args)?,
        EvvmSubcommands::Start(args) => commands::start::run(shell, args).await?,
        EvvmSubcommands::Check => commands::check::run(shell)?,
        EvvmSubcommands::Wallet(args) => commands::wallet::run(shell, args)?,
        EvvmSubcommands::Autocomplete(args) => commands::autocomplete::run(args)?,
    }
    Ok(())
}
