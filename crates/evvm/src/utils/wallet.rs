use std::fmt;

use anyhow::Context;
use ethers::{signers::LocalWallet, signers::Signer, types::Address};
use evvm_cli_common::{cast::CastAuth, forge::ForgeScript, PromptSelect};
use evvm_cli_config::LocalChainSettings;
use evvm_cli_types::{EvmAddress, Framework, Network};
use secrecy::{ExposeSecret, SecretString};

use crate::messages::{
    msg_unknown_keystore, MSG_DEFAULT_WALLET_LABEL, MSG_ENV_PRIVATE_KEY_LABEL,
    MSG_HARDHAT_KEYSTORE_UNSUPPORTED_ERR, MSG_NO_WALLET_AVAILABLE_ERR, MSG_SELECT_WALLET_PROMPT,
};

/// Account that signs the deployment.
#[derive(Debug, Clone)]
pub enum DeployerWallet {
    /// First pre-funded account of the local node.
    DefaultLocal,
    /// Foundry keystore, unlocked by password when used.
    Keystore(String),
    /// `DEPLOYER_PRIVATE_KEY` from the environment.
    PrivateKey(SecretString),
}

impl DeployerWallet {
    pub fn cast_auth(&self, local: &LocalChainSettings) -> CastAuth {
        match self {
            DeployerWallet::DefaultLocal => CastAuth::PrivateKey(local.default_private_key.clone()),
            DeployerWallet::Keystore(name) => CastAuth::Account(name.clone()),
            DeployerWallet::PrivateKey(key) => CastAuth::PrivateKey(key.clone()),
        }
    }

    pub fn keystore_name(&self) -> Option<&str> {
        match self {
            DeployerWallet::Keystore(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_default_local(&self) -> bool {
        matches!(self, DeployerWallet::DefaultLocal)
    }

    /// Private key handed to hardhat, which cannot use foundry keystores.
    pub fn hardhat_private_key(&self, local: &LocalChainSettings) -> anyhow::Result<SecretString> {
        match self {
            DeployerWallet::DefaultLocal => Ok(local.default_private_key.clone()),
            DeployerWallet::PrivateKey(key) => Ok(key.clone()),
            DeployerWallet::Keystore(_) => anyhow::bail!(MSG_HARDHAT_KEYSTORE_UNSUPPORTED_ERR),
        }
    }

    pub fn address(&self, local: &LocalChainSettings) -> anyhow::Result<Address> {
        match self {
            DeployerWallet::DefaultLocal => Ok(local.default_account.as_address()),
            DeployerWallet::Keystore(name) => evvm_cli_common::cast::keystore_address(name),
            DeployerWallet::PrivateKey(key) => Ok(key
                .expose_secret()
                .parse::<LocalWallet>()
                .context("DEPLOYER_PRIVATE_KEY is not a valid private key")?
                .address()),
        }
    }

    pub fn sign_script(&self, script: ForgeScript, local: &LocalChainSettings) -> ForgeScript {
        match self {
            DeployerWallet::DefaultLocal => script.with_private_key(&local.default_private_key),
            DeployerWallet::Keystore(name) => script.with_account(name),
            DeployerWallet::PrivateKey(key) => script.with_private_key(key),
        }
    }
}

impl fmt::Display for DeployerWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployerWallet::DefaultLocal => f.write_str(MSG_DEFAULT_WALLET_LABEL),
            DeployerWallet::Keystore(name) => write!(f, "Keystore: {name}"),
            DeployerWallet::PrivateKey(_) => f.write_str(MSG_ENV_PRIVATE_KEY_LABEL),
        }
    }
}

// Select needs `Eq`; secrets are compared by variant and keystore name only.
impl PartialEq for DeployerWallet {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DeployerWallet::DefaultLocal, DeployerWallet::DefaultLocal) => true,
            (DeployerWallet::Keystore(a), DeployerWallet::Keystore(b)) => a == b,
            (DeployerWallet::PrivateKey(_), DeployerWallet::PrivateKey(_)) => true,
            _ => false,
        }
    }
}

impl Eq for DeployerWallet {}

/// Wallets usable for `network` with `framework`, in the order offered.
pub fn wallet_choices(
    network: Network,
    framework: Framework,
    keystores: &[String],
    env_private_key: Option<SecretString>,
) -> Vec<DeployerWallet> {
    let mut choices = vec![];
    if network.is_local() {
        choices.push(DeployerWallet::DefaultLocal);
    }
    if framework == Framework::Foundry {
        choices.extend(keystores.iter().cloned().map(DeployerWallet::Keystore));
    }
    if let Some(key) = env_private_key {
        choices.push(DeployerWallet::PrivateKey(key));
    }
    choices
}

/// Picks the deployer from `--wallet`, the only available choice, or a prompt.
pub fn select_wallet(
    requested: Option<&str>,
    network: Network,
    framework: Framework,
    keystores: &[String],
    env_private_key: Option<SecretString>,
) -> anyhow::Result<DeployerWallet> {
    if let Some(name) = requested {
        if framework == Framework::Hardhat {
            anyhow::bail!(MSG_HARDHAT_KEYSTORE_UNSUPPORTED_ERR);
        }
        if !keystores.iter().any(|keystore| keystore == name) {
            anyhow::bail!(msg_unknown_keystore(name, keystores));
        }
        return Ok(DeployerWallet::Keystore(name.to_string()));
    }

    let mut choices = wallet_choices(network, framework, keystores, env_private_key);
    match choices.len() {
        0 => anyhow::bail!(MSG_NO_WALLET_AVAILABLE_ERR),
        1 => Ok(choices.remove(0)),
        _ => PromptSelect::new(MSG_SELECT_WALLET_PROMPT, choices).ask(),
    }
}

/// Deployer address to record in the deployment history.
pub fn deployer_address(wallet: &DeployerWallet, local: &LocalChainSettings) -> Option<String> {
    wallet
        .address(local)
        .ok()
        .map(|address| EvmAddress::from(address).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keystores() -> Vec<String> {
        vec!["alice".to_string(), "bob".to_string()]
    }

    #[test]
    fn local_foundry_offers_default_first() {
        let choices = wallet_choices(Network::Localhost, Framework::Foundry, &keystores(), None);
        assert_eq!(
            choices,
            vec![
                DeployerWallet::DefaultLocal,
                DeployerWallet::Keystore("alice".into()),
                DeployerWallet::Keystore("bob".into()),
            ]
        );
    }

    #[test]
    fn testnet_never_offers_default_account() {
        let key = SecretString::new("0x01".to_string());
        let choices =
            wallet_choices(Network::EthSepolia, Framework::Hardhat, &keystores(), Some(key));
        assert_eq!(choices.len(), 1);
        assert!(matches!(choices[0], DeployerWallet::PrivateKey(_)));
    }

    #[test]
    fn requested_keystore_must_exist() {
        let err = select_wallet(
            Some("carol"),
            Network::Localhost,
            Framework::Foundry,
            &keystores(),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("carol"));

        let wallet = select_wallet(
            Some("bob"),
            Network::EthSepolia,
            Framework::Foundry,
            &keystores(),
            None,
        )
        .unwrap();
        assert_eq!(wallet.keystore_name(), Some("bob"));
    }

    #[test]
    fn single_choice_is_taken_without_prompt() {
        let wallet =
            select_wallet(None, Network::Localhost, Framework::Hardhat, &[], None).unwrap();
        assert!(wallet.is_default_local());
        assert!(select_wallet(None, Network::ArbSepolia, Framework::Foundry, &[], None).is_err());
    }

    #[test]
    fn default_wallet_address_is_first_anvil_account() {
        let local = LocalChainSettings::default();
        assert_eq!(
            deployer_address(&DeployerWallet::DefaultLocal, &local).as_deref(),
            Some("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[test]
    fn private_key_wallet_derives_address() {
        let local = LocalChainSettings::default();
        let wallet = DeployerWallet::PrivateKey(local.default_private_key.clone());
        assert_eq!(
            wallet.address(&local).unwrap(),
            local.default_account.as_address()
        );
    }
}
