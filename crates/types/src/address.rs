use std::{fmt, str::FromStr};

use ethers::{types::Address, utils::to_checksum};
use serde::{Deserialize, Serialize};

const ADDRESS_HEX_LEN: usize = 40;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid address {0:?}: expected 0x followed by 40 hex characters")]
pub struct EvmAddressError(pub String);

/// Returns `true` if `input` matches `^0x[0-9a-fA-F]{40}$`.
pub fn is_valid_address(input: &str) -> bool {
    match input.strip_prefix("0x") {
        Some(hex) => hex.len() == ADDRESS_HEX_LEN && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

pub fn validate_address(input: &str) -> Result<(), EvmAddressError> {
    if is_valid_address(input) {
        Ok(())
    } else {
        Err(EvmAddressError(input.to_string()))
    }
}

/// A 20-byte account address that has passed shape validation.
///
/// Serialized in its EIP-55 checksummed form, since Solidity rejects address
/// literals that fail the checksum test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EvmAddress(Address);

impl EvmAddress {
    #[must_use]
    pub fn as_address(&self) -> Address {
        self.0
    }

    #[must_use]
    pub fn checksummed(&self) -> String {
        to_checksum(&self.0, None)
    }
}

impl FromStr for EvmAddress {
    type Err = EvmAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        validate_address(s)?;
        Address::from_str(s)
            .map(Self)
            .map_err(|_| EvmAddressError(s.to_string()))
    }
}

impl From<Address> for EvmAddress {
    fn from(value: Address) -> Self {
        Self(value)
    }
}

impl TryFrom<String> for EvmAddress {
    type Error = EvmAddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EvmAddress> for String {
    fn from(value: EvmAddress) -> Self {
        value.checksummed()
    }
}

impl fmt::Display for EvmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.checksummed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANVIL_0: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn accepts_well_formed_addresses() {
        for input in [
            ANVIL_0,
            "0x0000000000000000000000000000000000000000",
            "0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF",
            "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd",
        ] {
            assert!(is_valid_address(input), "{input} should be accepted");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for input in [
            "0x1234",
            "",
            "0x",
            "f39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
            "0Xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb9226",
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb922666",
            "0xg39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
            " 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
        ] {
            assert!(!is_valid_address(input), "{input:?} should be rejected");
        }
    }

    #[test]
    fn short_address_reports_invalid_address() {
        let err = "0x1234".parse::<EvmAddress>().unwrap_err();
        assert!(err.to_string().starts_with("Invalid address"));
    }

    #[test]
    fn lowercase_input_is_checksummed() {
        let address: EvmAddress = ANVIL_0.to_lowercase().parse().unwrap();
        assert_eq!(address.checksummed(), ANVIL_0);
        assert_eq!(
            serde_json::to_string(&address).unwrap(),
            format!("\"{ANVIL_0}\"")
        );
    }

    #[test]
    fn parsed_bytes_match_ethers() {
        let upper = "0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF";
        let address: EvmAddress = upper.parse().unwrap();
        assert_eq!(address.as_address(), Address::repeat_byte(0xff));
        let anvil: EvmAddress = ANVIL_0.parse().unwrap();
        assert_eq!(anvil.as_address(), Address::from_str(ANVIL_0).unwrap());
    }

    #[test]
    fn deserialization_validates() {
        assert!(serde_json::from_str::<EvmAddress>("\"0x1234\"").is_err());
        let parsed: EvmAddress = serde_json::from_str(&format!("\"{ANVIL_0}\"")).unwrap();
        assert_eq!(parsed.to_string(), ANVIL_0);
    }
}
