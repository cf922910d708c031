use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// Which flavour of the EVVM contracts the project builds against.
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
pub enum ContractSource {
    #[default]
    Testnet,
    Playground,
}

impl ContractSource {
    /// Location of the sources relative to the project root.
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            ContractSource::Testnet => "contracts/testnet",
            ContractSource::Playground => "contracts/playground",
        }
    }

    #[must_use]
    pub fn repository(&self) -> &'static str {
        match self {
            ContractSource::Testnet => "https://github.com/EVVM-org/Testnet-Contracts",
            ContractSource::Playground => "https://github.com/EVVM-org/Playground-Contracts",
        }
    }

    /// Import path of the `EvvmStructs` library used by the generated `Inputs.sol`.
    #[must_use]
    pub fn structs_import(&self) -> &'static str {
        match self {
            ContractSource::Testnet => {
                "@evvm/testnet-contracts/contracts/evvm/lib/EvvmStructs.sol"
            }
            ContractSource::Playground => {
                "@evvm/playground-contracts/src/contracts/evvm/lib/EvvmStructs.sol"
            }
        }
    }
}
