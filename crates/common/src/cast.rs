//! Thin wrappers around the `cast` binary.

use std::path::PathBuf;

use anyhow::Context;
use ethers::types::{Address, U256};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use xshell::{cmd, Shell};

use crate::cmd::Cmd;

/// How a `cast send` transaction gets signed.
#[derive(Debug, Clone)]
pub enum CastAuth {
    PrivateKey(SecretString),
    /// Named keystore under `~/.foundry/keystores`.
    Account(String),
}

impl CastAuth {
    fn args(&self) -> Vec<String> {
        match self {
            CastAuth::PrivateKey(key) => {
                vec!["--private-key".to_string(), key.expose_secret().clone()]
            }
            CastAuth::Account(name) => vec!["--account".to_string(), name.clone()],
        }
    }

    fn is_interactive(&self) -> bool {
        matches!(self, CastAuth::Account(_))
    }
}

/// Transfers `value` wei without calldata.
pub fn send_value(
    shell: &Shell,
    rpc_url: &str,
    auth: &CastAuth,
    to: &str,
    value: U256,
) -> anyhow::Result<()> {
    let auth_args = auth.args();
    let value = value.to_string();
    Cmd::new(cmd!(
        shell,
        "cast send {to} --value {value} --rpc-url {rpc_url} {auth_args...}"
    ))
    .run()?;
    Ok(())
}

/// Sends a contract call transaction. Keystore signing is attached to the
/// terminal so cast can ask for the password.
pub fn send(
    shell: &Shell,
    rpc_url: &str,
    auth: &CastAuth,
    to: &str,
    signature: &str,
    args: &[String],
) -> anyhow::Result<()> {
    let auth_args = auth.args();
    let mut cmd = Cmd::new(cmd!(
        shell,
        "cast send {to} {signature} {args...} --rpc-url {rpc_url} {auth_args...}"
    ));
    if auth.is_interactive() {
        cmd = cmd.with_force_run();
    }
    cmd.run()?;
    Ok(())
}

/// Read-only call, returning cast's decoded output.
pub fn call(
    shell: &Shell,
    rpc_url: &str,
    to: &str,
    signature: &str,
    args: &[String],
) -> anyhow::Result<String> {
    Ok(Cmd::new(cmd!(
        shell,
        "cast call {to} {signature} {args...} --rpc-url {rpc_url}"
    ))
    .read_stdout()?)
}

/// Interactive `cast wallet import`, prompting for the key and a password.
pub fn wallet_import(shell: &Shell, name: &str) -> anyhow::Result<()> {
    Cmd::new(cmd!(shell, "cast wallet import {name} --interactive"))
        .with_force_run()
        .run()?;
    Ok(())
}

pub fn keystore_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".foundry").join("keystores"))
}

/// Names of the keystores foundry knows about, sorted.
pub fn list_keystores() -> anyhow::Result<Vec<String>> {
    let Some(dir) = keystore_dir() else {
        return Ok(vec![]);
    };
    if !dir.is_dir() {
        return Ok(vec![]);
    }
    let mut names = vec![];
    for entry in std::fs::read_dir(&dir).with_context(|| format!("Failed to read {dir:?}"))? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Address recorded in a keystore file, read without unlocking it.
pub fn keystore_address(name: &str) -> anyhow::Result<Address> {
    let dir = keystore_dir().context("Could not locate the home directory")?;
    let path = dir.join(name);
    let content =
        std::fs::read_to_string(&path).with_context(|| format!("Keystore {name:?} not found in {dir:?}"))?;
    parse_keystore_address(&content).with_context(|| format!("Malformed keystore {path:?}"))
}

fn parse_keystore_address(content: &str) -> anyhow::Result<Address> {
    let keystore: KeystoreFile = serde_json::from_str(content)?;
    let address = keystore
        .address
        .context("Keystore does not record its address")?;
    let address = address.trim_start_matches("0x");
    Ok(format!("0x{address}").parse()?)
}

#[derive(Deserialize)]
struct KeystoreFile {
    address: Option<String>,
}

/// Strips cast's human-readable annotation, e.g. `1000 [1e3]` becomes `1000`.
fn strip_annotation(value: &str) -> &str {
    let value = value.trim();
    match value.find(" [") {
        Some(idx) => &value[..idx],
        None => value,
    }
}

/// Parses a `uint256[]` rendered by `cast call`, such as `[1000, 1001 [1.001e3]]`.
pub fn parse_call_list(output: &str) -> anyhow::Result<Vec<U256>> {
    let inner = output
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .with_context(|| format!("Expected a list, got {output:?}"))?;
    split_top_level(inner)
        .into_iter()
        .filter(|item| !item.trim().is_empty())
        .map(|item| {
            let item = strip_annotation(item);
            U256::from_dec_str(item).with_context(|| format!("Invalid list item {item:?}"))
        })
        .collect()
}

/// Parses a tuple rendered by `cast call`, such as `(11155111 [1.115e7], 0xabc..)`.
pub fn parse_call_tuple(output: &str) -> anyhow::Result<Vec<String>> {
    let inner = output
        .trim()
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .with_context(|| format!("Expected a tuple, got {output:?}"))?;
    Ok(split_top_level(inner)
        .into_iter()
        .map(|item| strip_annotation(item).to_string())
        .collect())
}

// Splits on commas outside of brackets, so annotations stay attached to their value.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = vec![];
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in s.char_indices() {
        match ch {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}
