//! Tunables of the pipeline stages, passed in explicitly so each stage can be
//! exercised against a fake chain or registry.

use std::time::Duration;

use anyhow::Context;
use ethers::types::U256;
use evvm_cli_types::{EvmAddress, Network, LOCAL_CHAIN_ID};
use secrecy::SecretString;
use url::Url;

use crate::{
    consts::{ANVIL_ACCOUNTS, ANVIL_PRIVATE_KEY},
    env::ProjectEnv,
};

#[derive(Debug, Clone)]
pub struct LocalChainSettings {
    pub host: String,
    pub port: u16,
    pub chain_id: u64,
    /// Pre-funded account used when no other wallet is chosen.
    pub default_account: EvmAddress,
    pub default_private_key: SecretString,
    /// Keystore wallets below this balance get topped up.
    pub funding_threshold: U256,
    pub funding_amount: U256,
    pub poll_interval: Duration,
    pub start_timeout: Duration,
}

impl Default for LocalChainSettings {
    fn default() -> Self {
        let ether = U256::exp10(18);
        Self {
            host: "127.0.0.1".to_string(),
            port: 8545,
            chain_id: LOCAL_CHAIN_ID,
            default_account: ANVIL_ACCOUNTS[0]
                .parse()
                .expect("hard-coded Anvil account is a valid address"),
            default_private_key: SecretString::new(ANVIL_PRIVATE_KEY.to_string()),
            funding_threshold: ether,
            funding_amount: ether * U256::from(100),
            poll_interval: Duration::from_millis(500),
            start_timeout: Duration::from_secs(30),
        }
    }
}

impl LocalChainSettings {
    pub fn rpc_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// The local id for `localhost`, the public id otherwise.
    pub fn chain_id_for(&self, network: Network) -> u64 {
        match network {
            Network::Localhost => self.chain_id,
            network => network.chain_id(),
        }
    }
}

/// The public EVVM registry that hands out EVVM ids.
#[derive(Debug, Clone)]
pub struct RegistrySettings {
    pub address: String,
    /// Network the registry contract lives on.
    pub network: Network,
    pub poll_interval: Duration,
    pub poll_attempts: u32,
    /// How many of the most recent ids are inspected per attempt.
    pub scan_depth: usize,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            address: "0x389dC8fb09211bbDA841D59f4a51160dA2377832".to_string(),
            network: Network::EthSepolia,
            poll_interval: Duration::from_secs(3),
            poll_attempts: 10,
            scan_depth: 25,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FrontendSettings {
    pub port: u16,
    pub poll_interval: Duration,
    pub start_timeout: Duration,
}

impl Default for FrontendSettings {
    fn default() -> Self {
        Self {
            port: 3000,
            poll_interval: Duration::from_millis(500),
            start_timeout: Duration::from_secs(60),
        }
    }
}

impl FrontendSettings {
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

/// Public RPC endpoints tried when no `RPC_URL_*` override is set.
#[derive(Debug, Clone)]
pub struct NetworkSettings {
    pub eth_sepolia: Vec<String>,
    pub arb_sepolia: Vec<String>,
    pub probe_timeout: Duration,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            eth_sepolia: vec![
                "https://0xrpc.io/sep".to_string(),
                "https://ethereum-sepolia-rpc.publicnode.com".to_string(),
                "https://sepolia.drpc.org".to_string(),
            ],
            arb_sepolia: vec![
                "https://sepolia-rollup.arbitrum.io/rpc".to_string(),
                "https://arbitrum-sepolia-rpc.publicnode.com".to_string(),
            ],
            probe_timeout: Duration::from_secs(5),
        }
    }
}

impl NetworkSettings {
    /// Candidate RPC urls for `network`, the env override first.
    pub fn rpc_candidates(
        &self,
        network: Network,
        local: &LocalChainSettings,
        env: &ProjectEnv,
    ) -> anyhow::Result<Vec<Url>> {
        let mut urls = vec![];
        if let Some(key) = network.rpc_url_env() {
            if let Some(value) = env.get(key) {
                urls.push(Url::parse(&value).with_context(|| format!("{key} is not a valid url"))?);
            }
        }
        let fallbacks: Vec<String> = match network {
            Network::Localhost => vec![local.rpc_url()],
            Network::EthSepolia => self.eth_sepolia.clone(),
            Network::ArbSepolia => self.arb_sepolia.clone(),
        };
        for fallback in fallbacks {
            let url = Url::parse(&fallback).with_context(|| format!("Invalid rpc url {fallback}"))?;
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
        Ok(urls)
    }
}
