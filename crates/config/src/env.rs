use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use chrono::Utc;
use evvm_cli_types::EvvmContract;
use secrecy::SecretString;
use strum::IntoEnumIterator;
use xshell::Shell;

use crate::{consts::ENV_FILE, deployment::DeploymentResult};

pub const CHAIN_ID_ENV: &str = "NEXT_PUBLIC_CHAIN_ID";
pub const EVVM_ID_ENV: &str = "NEXT_PUBLIC_EVVM_ID";
pub const CONFIG_VERSION_ENV: &str = "NEXT_PUBLIC_CONFIG_VERSION";
pub const PROJECT_ID_ENV: &str = "NEXT_PUBLIC_PROJECT_ID";
pub const ETHERSCAN_API_ENV: &str = "ETHERSCAN_API";
pub const DEPLOYER_PRIVATE_KEY_ENV: &str = "DEPLOYER_PRIVATE_KEY";

/// Replaces the first `KEY=...` line, or appends one. Other lines are kept
/// byte for byte, line endings included.
pub fn update_env_var(content: &str, key: &str, value: &str) -> String {
    let prefix = format!("{key}=");
    let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let mut updated = String::with_capacity(content.len() + prefix.len() + value.len() + 2);
    let mut replaced = false;
    for line in content.split_inclusive('\n') {
        if !replaced && line.starts_with(&prefix) {
            let ending = &line[line.trim_end_matches(['\r', '\n']).len()..];
            updated.push_str(&prefix);
            updated.push_str(value);
            updated.push_str(ending);
            replaced = true;
        } else {
            updated.push_str(line);
        }
    }
    if !replaced {
        if !updated.is_empty() && !updated.ends_with('\n') {
            updated.push_str(newline);
        }
        updated.push_str(&prefix);
        updated.push_str(value);
        updated.push_str(newline);
    }
    updated
}

/// Parses `KEY=value` lines, ignoring comments and blank lines.
pub fn parse_env(content: &str) -> BTreeMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            Some((key.trim().to_string(), value.to_string()))
        })
        .collect()
}

/// The project `.env`, edited in memory and written back in one go.
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
    content: String,
}

impl EnvFile {
    pub fn load(shell: &Shell, root: &Path) -> anyhow::Result<Self> {
        let path = root.join(ENV_FILE);
        let content = if shell.path_exists(&path) {
            shell.read_file(&path)?
        } else {
            String::new()
        };
        Ok(Self { path, content })
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.content = update_env_var(&self.content, key, value);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        parse_env(&self.content).remove(key)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, shell: &Shell) -> anyhow::Result<()> {
        shell.write_file(&self.path, &self.content)?;
        Ok(())
    }

    /// Writes every contract address, the chain id and a fresh config version.
    pub fn apply_deployment(&mut self, result: &DeploymentResult) {
        for contract in EvvmContract::iter() {
            let address = result.contracts.get(contract).unwrap_or_default();
            self.set(contract.env_key(), address);
        }
        self.set(CHAIN_ID_ENV, &result.chain_id.to_string());
        self.set(
            CONFIG_VERSION_ENV,
            &Utc::now().timestamp_millis().to_string(),
        );
    }
}

/// Values the CLI reads from the project `.env`. The process environment
/// takes precedence.
#[derive(Debug, Clone, Default)]
pub struct ProjectEnv {
    file: BTreeMap<String, String>,
}

impl ProjectEnv {
    pub fn load(shell: &Shell, root: &Path) -> anyhow::Result<Self> {
        let env = EnvFile::load(shell, root)?;
        Ok(Self::from_content(env.content()))
    }

    pub fn from_content(content: &str) -> Self {
        Self {
            file: parse_env(content),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let non_empty = |value: &String| !value.trim().is_empty();
        std::env::var(key)
            .ok()
            .filter(non_empty)
            .or_else(|| self.file.get(key).cloned().filter(non_empty))
    }

    pub fn secret(&self, key: &str) -> Option<SecretString> {
        self.get(key).map(SecretString::new)
    }

    pub fn etherscan_api_key(&self) -> Option<SecretString> {
        self.secret(ETHERSCAN_API_ENV)
    }

    pub fn deployer_private_key(&self) -> Option<SecretString> {
        self.secret(DEPLOYER_PRIVATE_KEY_ENV)
    }
}

#[cfg(test)]
mod tests {
    use evvm_cli_types::Network;

    use super::*;
    use crate::artifacts::ContractAddresses;

    const ENV: &str = "# frontend\nNEXT_PUBLIC_PROJECT_ID=abc\nNEXT_PUBLIC_EVVM_ADDRESS=0xold\nOTHER=1\n";

    #[test]
    fn replaces_exactly_one_line() {
        let updated = update_env_var(ENV, "NEXT_PUBLIC_EVVM_ADDRESS", "0xnew");
        assert_eq!(
            updated,
            "# frontend\nNEXT_PUBLIC_PROJECT_ID=abc\nNEXT_PUBLIC_EVVM_ADDRESS=0xnew\nOTHER=1\n"
        );
    }

    #[test]
    fn update_is_idempotent() {
        let once = update_env_var(ENV, "NEXT_PUBLIC_CHAIN_ID", "31337");
        let twice = update_env_var(&once, "NEXT_PUBLIC_CHAIN_ID", "31337");
        assert_eq!(once, twice);
        assert!(once.ends_with("OTHER=1\nNEXT_PUBLIC_CHAIN_ID=31337\n"));
    }

    #[test]
    fn key_prefix_does_not_match_longer_key() {
        let content = "NEXT_PUBLIC_EVVM_ADDRESS_OLD=keep\n";
        let updated = update_env_var(content, "NEXT_PUBLIC_EVVM_ADDRESS", "0x1");
        assert_eq!(updated, "NEXT_PUBLIC_EVVM_ADDRESS_OLD=keep\nNEXT_PUBLIC_EVVM_ADDRESS=0x1\n");
    }

    #[test]
    fn crlf_endings_are_kept() {
        let content = "# frontend\r\nNEXT_PUBLIC_EVVM_ADDRESS=0xold\r\nOTHER=1\r\n";
        let replaced = update_env_var(content, "NEXT_PUBLIC_EVVM_ADDRESS", "0xnew");
        assert_eq!(replaced, "# frontend\r\nNEXT_PUBLIC_EVVM_ADDRESS=0xnew\r\nOTHER=1\r\n");
        let appended = update_env_var(&replaced, "NEXT_PUBLIC_CHAIN_ID", "31337");
        assert!(appended.ends_with("OTHER=1\r\nNEXT_PUBLIC_CHAIN_ID=31337\r\n"));
        assert_eq!(parse_env(&appended)["NEXT_PUBLIC_EVVM_ADDRESS"], "0xnew");
    }

    #[test]
    fn missing_trailing_newline_is_completed_on_append() {
        assert_eq!(update_env_var("A=1", "B", "2"), "A=1\nB=2\n");
        assert_eq!(update_env_var("A=1", "A", "3"), "A=3");
    }

    #[test]
    fn empty_file_gets_a_line() {
        assert_eq!(update_env_var("", "A", "1"), "A=1\n");
    }

    #[test]
    fn parses_quotes_comments_and_export() {
        let values = parse_env("# c\nexport A=\"1\"\nB='two'\n\nC=3 \nbroken\n");
        assert_eq!(values["A"], "1");
        assert_eq!(values["B"], "two");
        assert_eq!(values["C"], "3");
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn deployment_writes_p2p_address_and_chain() {
        let mut contracts = ContractAddresses::default();
        contracts.p2p_swap_address = Some("0xP2P0000000000000000000000000000000000001".into());
        contracts.evvm_address = "0xE".into();
        let result = DeploymentResult::new(contracts, Network::Localhost, 31337);

        let mut env = EnvFile {
            path: PathBuf::from(".env"),
            content: ENV.to_string(),
        };
        env.apply_deployment(&result);
        assert_eq!(
            env.get("NEXT_PUBLIC_P2PSWAP_ADDRESS").as_deref(),
            Some("0xP2P0000000000000000000000000000000000001")
        );
        assert_eq!(env.get("NEXT_PUBLIC_EVVM_ADDRESS").as_deref(), Some("0xE"));
        assert_eq!(env.get("NEXT_PUBLIC_STAKING_ADDRESS").as_deref(), Some("0x"));
        assert_eq!(env.get(CHAIN_ID_ENV).as_deref(), Some("31337"));
        assert!(env.get(CONFIG_VERSION_ENV).is_some());
        assert_eq!(env.get("NEXT_PUBLIC_PROJECT_ID").as_deref(), Some("abc"));
    }

    #[test]
    fn missing_p2p_is_written_empty() {
        let result = DeploymentResult::new(ContractAddresses::default(), Network::Localhost, 31337);
        let mut env = EnvFile {
            path: PathBuf::from(".env"),
            content: String::new(),
        };
        env.apply_deployment(&result);
        assert!(env.content().contains("NEXT_PUBLIC_P2PSWAP_ADDRESS=\n"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let env = ProjectEnv::from_content("EVVM_TEST_BLANK_KEY=\nEVVM_TEST_SET_KEY=x\n");
        assert_eq!(env.get("EVVM_TEST_BLANK_KEY"), None);
        assert_eq!(env.get("EVVM_TEST_SET_KEY").as_deref(), Some("x"));
    }
}
