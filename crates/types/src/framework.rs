use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// Solidity toolchain used to compile and deploy the contracts.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ValueEnum,
    EnumIter,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    #[default]
    Foundry,
    Hardhat,
}

impl Framework {
    /// Directory of the framework package inside the project.
    #[must_use]
    pub fn package_dir(&self) -> &'static str {
        match self {
            Framework::Foundry => "packages/foundry",
            Framework::Hardhat => "packages/hardhat",
        }
    }

    /// Name of the local node binary, used to find leftover processes.
    #[must_use]
    pub fn node_process_name(&self) -> &'static str {
        match self {
            Framework::Foundry => "anvil",
            Framework::Hardhat => "hardhat node",
        }
    }
}
