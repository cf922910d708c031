mod prerequisites;
mod prompt;
mod term;

pub mod cast;
pub mod cmd;
pub mod config;
pub mod ethereum;
pub mod files;
pub mod forge;
pub mod git;
pub mod hardhat;
pub mod process;

pub use prerequisites::{
    check_general_prerequisites, check_prerequisite, framework_tools, FrameworkTools,
};
pub use prompt::{init_prompt_theme, Prompt, PromptCancelled, PromptConfirm, PromptSelect};
pub use term::{error, logger, spinner};
