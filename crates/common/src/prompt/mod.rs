use std::io;

use cliclack::{Theme, ThemeState};
use console::Style;

pub use self::{confirm::PromptConfirm, input::Prompt, select::PromptSelect};

mod confirm;
mod input;
mod select;

/// The user interrupted a prompt or left a required answer empty.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Operation cancelled by the user")]
pub struct PromptCancelled;

pub(crate) struct CliclackTheme;

impl Theme for CliclackTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().cyan(),
            ThemeState::Error(_) => Style::new().yellow(),
            _ => Style::new().cyan().dim(),
        }
    }
}

pub fn init_prompt_theme() {
    cliclack::set_theme(CliclackTheme);
}

fn map_interact_error(err: io::Error) -> anyhow::Error {
    if err.kind() == io::ErrorKind::Interrupted {
        PromptCancelled.into()
    } else {
        err.into()
    }
}
