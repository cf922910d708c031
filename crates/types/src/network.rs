use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// Chain id the local Anvil / Hardhat node runs with.
pub const LOCAL_CHAIN_ID: u64 = 31_337;

#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    EnumIter,
    strum::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    #[default]
    #[strum(to_string = "Local chain")]
    Localhost,
    #[strum(to_string = "Ethereum Sepolia")]
    EthSepolia,
    #[strum(to_string = "Arbitrum Sepolia")]
    ArbSepolia,
}

impl Network {
    #[must_use]
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Localhost => LOCAL_CHAIN_ID,
            Network::EthSepolia => 11_155_111,
            Network::ArbSepolia => 421_614,
        }
    }

    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Network::Localhost)
    }

    /// Stable identifier used in file names.
    #[must_use]
    pub fn slug(&self) -> &'static str {
        match self {
            Network::Localhost => "localhost",
            Network::EthSepolia => "eth-sepolia",
            Network::ArbSepolia => "arb-sepolia",
        }
    }

    /// Network name as declared in `hardhat.config.ts`.
    #[must_use]
    pub fn hardhat_name(&self) -> &'static str {
        match self {
            Network::Localhost => "localhost",
            Network::EthSepolia => "sepolia",
            Network::ArbSepolia => "arbitrumSepolia",
        }
    }

    /// Environment variable that overrides the public RPC endpoints.
    #[must_use]
    pub fn rpc_url_env(&self) -> Option<&'static str> {
        match self {
            Network::Localhost => None,
            Network::EthSepolia => Some("RPC_URL_ETH_SEPOLIA"),
            Network::ArbSepolia => Some("RPC_URL_ARB_SEPOLIA"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_localhost_is_local() {
        assert!(Network::Localhost.is_local());
        assert!(!Network::EthSepolia.is_local());
        assert!(!Network::ArbSepolia.is_local());
        assert_eq!(Network::Localhost.chain_id(), LOCAL_CHAIN_ID);
        assert_eq!(Network::Localhost.rpc_url_env(), None);
    }
}
