use std::{
    fs::File,
    io::{BufWriter, Write},
};

use anyhow::Context;
use clap::CommandFactory;
use clap_complete::{generate, Generator};
use evvm_cli_common::logger;

use super::args::AutocompleteArgs;
use crate::{messages::msg_generate_autocomplete_file, EvvmScaffold};

pub fn run(args: AutocompleteArgs) -> anyhow::Result<()> {
    let filename = autocomplete_file_name(&args.generator);
    let path = args.out.join(filename);

    logger::info(msg_generate_autocomplete_file(
        path.to_str()
            .context("the output file path is an invalid UTF8 string")?,
    ));

    let file = File::create(path).context("Failed to create file")?;
    let mut writer = BufWriter::new(file);

    generate_completions(args.generator, &mut writer)?;

    logger::outro(msg_generate_autocomplete_file(filename));
    Ok(())
}

pub fn generate_completions(generator: impl Generator, buf: &mut dyn Write) -> anyhow::Result<()> {
    let mut cmd = EvvmScaffold::command();
    let cmd_name = cmd.get_name().to_string();

    generate(generator, &mut cmd, cmd_name, buf);

    Ok(())
}

pub fn autocomplete_file_name(shell: &clap_complete::Shell) -> &'static str {
    match shell {
        clap_complete::Shell::Bash => "evvm-scaffold.sh",
        clap_complete::Shell::Fish => "evvm-scaffold.fish",
        clap_complete::Shell::Zsh => "_evvm-scaffold.zsh",
        clap_complete::Shell::Elvish => "evvm-scaffold.elv",
        clap_complete::Shell::PowerShell => "_evvm-scaffold.ps1",
        _ => "evvm-scaffold.completion",
    }
}
