use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use evvm_cli_types::{EvvmContract, Network};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use xshell::Shell;

use crate::{
    artifacts::ContractAddresses,
    consts::{DEPLOYMENTS_DIR, LATEST_DEPLOYMENT_FILE},
    traits::{FileConfigTrait, ReadConfig, SaveConfig},
};

/// Outcome of one deployment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentResult {
    #[serde(flatten)]
    pub contracts: ContractAddresses,
    pub chain_id: u64,
    pub network: Network,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployer_address: Option<String>,
    /// Keystore name, when one signed the deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployer_wallet: Option<String>,
    pub deployed_at: DateTime<Utc>,
}

impl FileConfigTrait for DeploymentResult {}

impl DeploymentResult {
    pub fn new(contracts: ContractAddresses, network: Network, chain_id: u64) -> Self {
        Self {
            contracts,
            chain_id,
            network,
            deployer_address: None,
            deployer_wallet: None,
            deployed_at: Utc::now(),
        }
    }

    /// Required contracts the artifacts did not mention.
    pub fn missing_contracts(&self) -> Vec<EvvmContract> {
        self.contracts.missing()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_contracts().is_empty()
    }

    pub fn history_file_name(&self) -> String {
        format!("deployment-{}-{}.json", self.network.slug(), self.chain_id)
    }

    /// Writes the per-network record and the `latest.json` pointer.
    pub fn save_history(&self, shell: &Shell, root: &Path) -> anyhow::Result<PathBuf> {
        let dir = root.join(DEPLOYMENTS_DIR);
        shell.create_dir(&dir)?;
        let path = dir.join(self.history_file_name());
        self.save(shell, &path)?;
        self.save(shell, dir.join(LATEST_DEPLOYMENT_FILE))?;
        Ok(path)
    }

    pub fn read_latest(shell: &Shell, root: &Path) -> anyhow::Result<Option<Self>> {
        let path = root.join(DEPLOYMENTS_DIR).join(LATEST_DEPLOYMENT_FILE);
        if !shell.path_exists(&path) {
            return Ok(None);
        }
        Ok(Some(Self::read(shell, path)?))
    }

    /// Flat name/value view for terminal output.
    pub fn summary(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("Network".into(), self.network.to_string().into());
        map.insert("Chain ID".into(), self.chain_id.into());
        for contract in EvvmContract::iter() {
            if let Some(address) = self.contracts.get(contract) {
                map.insert(contract.to_string(), address.into());
            }
        }
        if let Some(deployer) = &self.deployer_address {
            map.insert("Deployer".into(), deployer.clone().into());
        }
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::MISSING_ADDRESS;

    fn sample() -> DeploymentResult {
        let mut contracts = ContractAddresses::default();
        contracts.evvm_address = "0xE".into();
        contracts.staking_address = "0xS".into();
        contracts.estimator_address = "0xES".into();
        contracts.name_service_address = "0xN".into();
        contracts.treasury_address = "0xT".into();
        DeploymentResult::new(contracts, Network::EthSepolia, 11_155_111)
    }

    #[test]
    fn history_is_keyed_by_network_and_chain() {
        let shell = Shell::new().unwrap();
        let dir = shell.create_temp_dir().unwrap();
        let result = sample();
        let path = result.save_history(&shell, dir.path()).unwrap();
        assert!(path.ends_with("deployments/deployment-eth-sepolia-11155111.json"));

        let latest = DeploymentResult::read_latest(&shell, dir.path()).unwrap().unwrap();
        assert_eq!(latest, result);
        let raw = shell.read_file(&path).unwrap();
        assert!(raw.contains(r#""evvmAddress": "0xE""#));
        assert!(raw.contains(r#""network": "eth-sepolia""#));
        assert!(!raw.contains("p2pSwapAddress"));
    }

    #[test]
    fn placeholder_marks_incomplete_deployment() {
        let mut result = sample();
        assert!(result.is_complete());
        result.contracts.name_service_address = MISSING_ADDRESS.into();
        assert_eq!(result.missing_contracts(), vec![EvvmContract::NameService]);
    }

    #[test]
    fn summary_lists_deployed_contracts() {
        let summary = sample().summary();
        assert_eq!(summary["Evvm"], "0xE");
        assert_eq!(summary["Chain ID"], 11_155_111);
        assert!(summary.get("P2PSwap").is_none());
    }
}
