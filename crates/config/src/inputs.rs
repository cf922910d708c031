use std::path::{Path, PathBuf};

use anyhow::Context;
use evvm_cli_types::{ContractSource, DecimalString, EvmAddress};
use serde::{Deserialize, Serialize};
use xshell::Shell;

use crate::{
    consts::{
        ADDRESS_FILE, ADVANCED_METADATA_FILE, ANVIL_ACCOUNTS, BASIC_METADATA_FILE, INPUTS_SOL_FILE,
    },
    traits::{FileConfigTrait, FileConfigWithDefaultName, ReadConfigWithBasePath, SaveConfigWithBasePath},
};

/// Privileged accounts of a fresh EVVM instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressConfig {
    pub admin: EvmAddress,
    pub golden_fisher: EvmAddress,
    pub activator: EvmAddress,
}

impl FileConfigTrait for AddressConfig {}

impl FileConfigWithDefaultName for AddressConfig {
    const FILE_NAME: &'static str = ADDRESS_FILE;
}

impl Default for AddressConfig {
    fn default() -> Self {
        let [admin, golden_fisher, activator] = ANVIL_ACCOUNTS.map(|account| {
            account
                .parse::<EvmAddress>()
                .expect("hard-coded Anvil account is a valid address")
        });
        Self {
            admin,
            golden_fisher,
            activator,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicMetadata {
    #[serde(rename = "EvvmName")]
    pub evvm_name: String,
    pub principal_token_name: String,
    pub principal_token_symbol: String,
}

impl FileConfigTrait for BasicMetadata {}

impl FileConfigWithDefaultName for BasicMetadata {
    const FILE_NAME: &'static str = BASIC_METADATA_FILE;
}

impl Default for BasicMetadata {
    fn default() -> Self {
        Self {
            evvm_name: "EVVM".to_string(),
            principal_token_name: "Mate token".to_string(),
            principal_token_symbol: "MATE".to_string(),
        }
    }
}

/// Token economics in wei of the principal token.
///
/// Field order is the on-disk key order the deploy scripts rely on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedMetadata {
    #[serde(with = "bare_integer")]
    pub era_tokens: DecimalString,
    #[serde(with = "bare_integer")]
    pub reward: DecimalString,
    #[serde(with = "bare_integer")]
    pub total_supply: DecimalString,
}

impl FileConfigTrait for AdvancedMetadata {}

impl FileConfigWithDefaultName for AdvancedMetadata {
    const FILE_NAME: &'static str = ADVANCED_METADATA_FILE;
}

impl Default for AdvancedMetadata {
    fn default() -> Self {
        let parse = |digits: &str| {
            digits
                .parse::<DecimalString>()
                .expect("hard-coded amount is a decimal string")
        };
        Self {
            era_tokens: parse("1016666666500000000000000000"),
            reward: parse("5000000000000000000"),
            total_supply: parse("2033333333000000000000000000"),
        }
    }
}

/// Serializes a [`DecimalString`] as a JSON number with every digit kept.
mod bare_integer {
    use evvm_cli_types::DecimalString;
    use serde::{de::Error as _, ser::Error as _, Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::value::RawValue;

    pub fn serialize<S: Serializer>(value: &DecimalString, serializer: S) -> Result<S::Ok, S::Error> {
        RawValue::from_string(value.normalized().to_string())
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DecimalString, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        let text = raw.get().trim();
        let text = text
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .unwrap_or(text);
        text.parse().map_err(D::Error::custom)
    }
}

/// Everything the deploy scripts read from `input/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentInputs {
    pub addresses: AddressConfig,
    pub basic: BasicMetadata,
    pub advanced: AdvancedMetadata,
}

impl DeploymentInputs {
    /// Reads previously written inputs, `None` if any file is missing.
    pub fn read(shell: &Shell, dir: &Path) -> anyhow::Result<Option<Self>> {
        let all_present = [ADDRESS_FILE, BASIC_METADATA_FILE, ADVANCED_METADATA_FILE]
            .iter()
            .all(|name| shell.path_exists(dir.join(name)));
        if !all_present {
            return Ok(None);
        }
        Ok(Some(Self {
            addresses: AddressConfig::read_with_base_path(shell, dir)?,
            basic: BasicMetadata::read_with_base_path(shell, dir)?,
            advanced: AdvancedMetadata::read_with_base_path(shell, dir)?,
        }))
    }

    /// Overwrites the JSON mirrors and `Inputs.sol` in every directory.
    pub fn write(
        &self,
        shell: &Shell,
        dirs: &[PathBuf],
        source: ContractSource,
    ) -> anyhow::Result<()> {
        let solidity = self.render_inputs_sol(source);
        for dir in dirs {
            shell
                .create_dir(dir)
                .with_context(|| format!("Failed to create {dir:?}"))?;
            self.addresses.save_with_base_path(shell, dir)?;
            self.basic.save_with_base_path(shell, dir)?;
            self.advanced.save_with_base_path(shell, dir)?;
            shell.write_file(dir.join(INPUTS_SOL_FILE), &solidity)?;
        }
        Ok(())
    }

    pub fn render_inputs_sol(&self, source: ContractSource) -> String {
        format!(
            r#"// SPDX-License-Identifier: EVVM-NONCOMMERCIAL-1.0
// Generated by evvm-scaffold. Run `evvm-scaffold config` to change these values.
pragma solidity ^0.8.0;

import {{EvvmStructs}} from "{import}";

abstract contract Inputs {{
    address admin = {admin};
    address goldenFisher = {golden_fisher};
    address activator = {activator};

    EvvmStructs.EvvmMetadata inputMetadata =
        EvvmStructs.EvvmMetadata({{
            EvvmName: "{evvm_name}",
            // Assigned by the registry after deployment
            EvvmID: 0,
            principalTokenName: "{token_name}",
            principalTokenSymbol: "{token_symbol}",
            principalTokenAddress: 0x0000000000000000000000000000000000000001,
            totalSupply: {total_supply},
            eraTokens: {era_tokens},
            reward: {reward}
        }});
}}
"#,
            import = source.structs_import(),
            admin = self.addresses.admin,
            golden_fisher = self.addresses.golden_fisher,
            activator = self.addresses.activator,
            evvm_name = solidity_string(&self.basic.evvm_name),
            token_name = solidity_string(&self.basic.principal_token_name),
            token_symbol = solidity_string(&self.basic.principal_token_symbol),
            total_supply = self.advanced.total_supply.normalized(),
            era_tokens = self.advanced.era_tokens.normalized(),
            reward = self.advanced.reward.normalized(),
        )
    }
}

fn solidity_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advanced_metadata_keeps_key_order_and_digits() {
        let json = serde_json::to_string(&AdvancedMetadata::default()).unwrap();
        assert_eq!(
            json,
            r#"{"eraTokens":1016666666500000000000000000,"reward":5000000000000000000,"totalSupply":2033333333000000000000000000}"#
        );
    }

    #[test]
    fn advanced_metadata_order_survives_reordered_input() {
        let input = r#"{"totalSupply": "42", "reward": 7, "eraTokens": 21}"#;
        let parsed: AdvancedMetadata = serde_json::from_str(input).unwrap();
        assert_eq!(parsed.total_supply.as_str(), "42");
        assert_eq!(
            serde_json::to_string(&parsed).unwrap(),
            r#"{"eraTokens":21,"reward":7,"totalSupply":42}"#
        );
    }

    #[test]
    fn advanced_metadata_rejects_non_digits() {
        assert!(serde_json::from_str::<AdvancedMetadata>(
            r#"{"eraTokens": "1e3", "reward": 1, "totalSupply": 1}"#
        )
        .is_err());
    }

    #[test]
    fn basic_metadata_uses_file_key_names() {
        let json = serde_json::to_value(BasicMetadata::default()).unwrap();
        assert_eq!(json["EvvmName"], "EVVM");
        assert_eq!(json["principalTokenName"], "Mate token");
        assert_eq!(json["principalTokenSymbol"], "MATE");
    }

    #[test]
    fn short_admin_address_never_reaches_disk() {
        let json = r#"{"admin":"0x1234","goldenFisher":"0x70997970C51812dc3A010C7d01b50e0d17dc79C8","activator":"0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC"}"#;
        let err = serde_json::from_str::<AddressConfig>(json).unwrap_err();
        assert!(err.to_string().contains("Invalid address"));
    }

    #[test]
    fn inputs_sol_embeds_checksummed_addresses() {
        let inputs = DeploymentInputs::default();
        let sol = inputs.render_inputs_sol(ContractSource::Testnet);
        assert!(sol.contains("address admin = 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266;"));
        assert!(sol.contains("address activator = 0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC;"));
        assert!(sol.contains("totalSupply: 2033333333000000000000000000,"));
        assert!(sol.contains(ContractSource::Testnet.structs_import()));
        assert!(sol.contains("EvvmName: \"EVVM\","));
    }

    #[test]
    fn leading_zeros_match_between_json_and_solidity() {
        let mut inputs = DeploymentInputs::default();
        inputs.advanced.total_supply = "007".parse().unwrap();
        inputs.advanced.reward = "000".parse().unwrap();
        let json = serde_json::to_string(&inputs.advanced).unwrap();
        assert!(json.contains(r#""totalSupply":7"#));
        assert!(json.contains(r#""reward":0"#));
        let sol = inputs.render_inputs_sol(ContractSource::Testnet);
        assert!(sol.contains("totalSupply: 7,"));
        assert!(sol.contains("reward: 0\n"));
        assert!(!sol.contains("007"));
    }

    #[test]
    fn names_are_escaped_in_solidity() {
        let mut inputs = DeploymentInputs::default();
        inputs.basic.evvm_name = r#"My "EVVM""#.to_string();
        let sol = inputs.render_inputs_sol(ContractSource::Playground);
        assert!(sol.contains(r#"EvvmName: "My \"EVVM\"","#));
    }

    #[test]
    fn written_inputs_are_mirrored_and_read_back() {
        let shell = Shell::new().unwrap();
        let dir = shell.create_temp_dir().unwrap();
        let dirs = [
            dir.path().join("input"),
            dir.path().join("packages/foundry/input"),
        ];
        let mut inputs = DeploymentInputs::default();
        inputs.basic.principal_token_symbol = "TST".to_string();
        inputs.write(&shell, &dirs, ContractSource::Testnet).unwrap();

        for d in &dirs {
            assert!(shell.path_exists(d.join(INPUTS_SOL_FILE)));
            let advanced = shell.read_file(d.join(ADVANCED_METADATA_FILE)).unwrap();
            let era = advanced.find("eraTokens").unwrap();
            let reward = advanced.find("reward").unwrap();
            let supply = advanced.find("totalSupply").unwrap();
            assert!(era < reward && reward < supply);
        }
        let read = DeploymentInputs::read(&shell, &dirs[1]).unwrap().unwrap();
        assert_eq!(read, inputs);
    }

    #[test]
    fn missing_inputs_read_as_none() {
        let shell = Shell::new().unwrap();
        let dir = shell.create_temp_dir().unwrap();
        assert!(DeploymentInputs::read(&shell, dir.path()).unwrap().is_none());
    }
}
