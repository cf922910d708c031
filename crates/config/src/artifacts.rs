use std::path::{Path, PathBuf};

use anyhow::Context;
use evvm_cli_types::EvvmContract;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use xshell::Shell;

use crate::consts::{
    BROADCAST_DIR, BROADCAST_RUN_FILE, BROADCAST_SCRIPT_CANDIDATES, DEPLOYMENTS_DIR,
    HARDHAT_SUMMARY_FILE,
};

/// Placeholder for a required contract that no artifact mentions.
pub const MISSING_ADDRESS: &str = "0x";

/// Deployed addresses as recovered from the framework artifacts.
///
/// Addresses are kept verbatim, a missing required contract holds
/// [`MISSING_ADDRESS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAddresses {
    pub evvm_address: String,
    pub staking_address: String,
    pub estimator_address: String,
    pub name_service_address: String,
    pub treasury_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p2p_swap_address: Option<String>,
}

impl Default for ContractAddresses {
    fn default() -> Self {
        Self {
            evvm_address: MISSING_ADDRESS.to_string(),
            staking_address: MISSING_ADDRESS.to_string(),
            estimator_address: MISSING_ADDRESS.to_string(),
            name_service_address: MISSING_ADDRESS.to_string(),
            treasury_address: MISSING_ADDRESS.to_string(),
            p2p_swap_address: None,
        }
    }
}

impl ContractAddresses {
    /// Builds the set from a lookup by artifact name.
    pub fn collect(mut lookup: impl FnMut(&str) -> Option<String>) -> Self {
        let mut addresses = Self::default();
        for contract in EvvmContract::iter() {
            if let Some(address) = lookup(contract.artifact_name()) {
                addresses.set(contract, address);
            }
        }
        addresses
    }

    pub fn get(&self, contract: EvvmContract) -> Option<&str> {
        match contract {
            EvvmContract::Evvm => Some(&self.evvm_address),
            EvvmContract::Staking => Some(&self.staking_address),
            EvvmContract::Estimator => Some(&self.estimator_address),
            EvvmContract::NameService => Some(&self.name_service_address),
            EvvmContract::Treasury => Some(&self.treasury_address),
            EvvmContract::P2PSwap => self.p2p_swap_address.as_deref(),
        }
    }

    pub fn set(&mut self, contract: EvvmContract, address: String) {
        match contract {
            EvvmContract::Evvm => self.evvm_address = address,
            EvvmContract::Staking => self.staking_address = address,
            EvvmContract::Estimator => self.estimator_address = address,
            EvvmContract::NameService => self.name_service_address = address,
            EvvmContract::Treasury => self.treasury_address = address,
            EvvmContract::P2PSwap => self.p2p_swap_address = Some(address),
        }
    }

    /// Required contracts still holding the placeholder.
    pub fn missing(&self) -> Vec<EvvmContract> {
        EvvmContract::iter()
            .filter(|contract| !contract.is_optional())
            .filter(|contract| self.get(*contract) == Some(MISSING_ADDRESS))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct BroadcastRun {
    #[serde(default)]
    transactions: Vec<BroadcastTransaction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BroadcastTransaction {
    contract_name: Option<String>,
    contract_address: Option<String>,
}

/// `broadcast/<script>/<chain id>/run-latest.json` of the first script
/// directory that has one.
pub fn find_broadcast_run(shell: &Shell, foundry_dir: &Path, chain_id: u64) -> Option<PathBuf> {
    BROADCAST_SCRIPT_CANDIDATES
        .iter()
        .map(|script| {
            foundry_dir
                .join(BROADCAST_DIR)
                .join(script)
                .join(chain_id.to_string())
                .join(BROADCAST_RUN_FILE)
        })
        .find(|path| shell.path_exists(path))
}

/// Matches each recorded transaction's `contractName` against the EVVM set.
/// The first transaction naming a contract wins.
pub fn parse_foundry_broadcast(content: &str) -> anyhow::Result<ContractAddresses> {
    let run: BroadcastRun =
        serde_json::from_str(content).context("Malformed forge broadcast file")?;
    Ok(ContractAddresses::collect(|name| {
        run.transactions
            .iter()
            .find(|tx| tx.contract_name.as_deref() == Some(name))
            .and_then(|tx| tx.contract_address.clone())
    }))
}

pub fn read_foundry_deployment(
    shell: &Shell,
    foundry_dir: &Path,
    chain_id: u64,
) -> anyhow::Result<ContractAddresses> {
    let Some(path) = find_broadcast_run(shell, foundry_dir, chain_id) else {
        anyhow::bail!(
            "No {BROADCAST_RUN_FILE} found for chain {chain_id} under {:?}",
            foundry_dir.join(BROADCAST_DIR)
        );
    };
    let content = shell.read_file(&path)?;
    parse_foundry_broadcast(&content).with_context(|| format!("Failed to parse {path:?}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardhatDeployment {
    pub contracts: ContractAddresses,
    pub deployer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HardhatSummary {
    #[serde(default)]
    contracts: std::collections::BTreeMap<String, String>,
    deployer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HardhatContractFile {
    address: String,
}

pub fn parse_hardhat_summary(content: &str) -> anyhow::Result<HardhatDeployment> {
    let summary: HardhatSummary =
        serde_json::from_str(content).context("Malformed hardhat deployment summary")?;
    Ok(HardhatDeployment {
        contracts: ContractAddresses::collect(|name| summary.contracts.get(name).cloned()),
        deployer: summary.deployer,
    })
}

/// Reads `deployments/<network>/deployment-summary.json`, falling back to the
/// per-contract files hardhat-deploy writes next to it.
pub fn read_hardhat_deployment(
    shell: &Shell,
    hardhat_dir: &Path,
    network: &str,
) -> anyhow::Result<HardhatDeployment> {
    let dir = hardhat_dir.join(DEPLOYMENTS_DIR).join(network);
    let summary = dir.join(HARDHAT_SUMMARY_FILE);
    if shell.path_exists(&summary) {
        let content = shell.read_file(&summary)?;
        return parse_hardhat_summary(&content)
            .with_context(|| format!("Failed to parse {summary:?}"));
    }
    if !shell.path_exists(&dir) {
        anyhow::bail!("No hardhat deployments found in {dir:?}");
    }

    let contracts = ContractAddresses::collect(|name| {
        let path = dir.join(format!("{name}.json"));
        let content = shell.read_file(path).ok()?;
        serde_json::from_str::<HardhatContractFile>(&content)
            .ok()
            .map(|file| file.address)
    });
    Ok(HardhatDeployment {
        contracts,
        deployer: None,
    })
}
