use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid number {0:?}: only digits are allowed")]
pub struct DecimalStringError(pub String);

/// Returns `true` for non-empty strings made only of ASCII digits.
pub fn is_decimal_string(input: &str) -> bool {
    !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit())
}

pub fn validate_decimal(input: &str) -> Result<(), DecimalStringError> {
    if is_decimal_string(input) {
        Ok(())
    } else {
        Err(DecimalStringError(input.to_string()))
    }
}

/// Unsigned integer of arbitrary size kept in its decimal text form.
///
/// Token amounts are expressed in wei and routinely exceed `u128`, so they are
/// never converted to a machine integer on the CLI side.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DecimalString(String);

impl DecimalString {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digits without leading zeros, `"0"` for zero.
    #[must_use]
    pub fn normalized(&self) -> &str {
        let digits = self.0.trim_start_matches('0');
        if digits.is_empty() {
            "0"
        } else {
            digits
        }
    }
}

impl FromStr for DecimalString {
    type Err = DecimalStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        validate_decimal(s)?;
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for DecimalString {
    type Error = DecimalStringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DecimalString> for String {
    fn from(value: DecimalString) -> Self {
        value.0
    }
}

impl fmt::Display for DecimalString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_only_strings_are_accepted() {
        for input in ["0", "5000000000000000000", "2033333333000000000000000000"] {
            assert!(is_decimal_string(input));
            assert_eq!(input.parse::<DecimalString>().unwrap().as_str(), input);
        }
    }

    #[test]
    fn strings_with_non_digits_are_rejected() {
        for input in ["", "1e18", "-1", "1_000", "12.5", "0x10", "１２"] {
            assert!(!is_decimal_string(input), "{input:?} should be rejected");
        }
    }

    #[test]
    fn normalized_drops_leading_zeros() {
        let cases = [("007", "7"), ("000", "0"), ("0", "0"), ("100", "100")];
        for (input, expected) in cases {
            assert_eq!(input.parse::<DecimalString>().unwrap().normalized(), expected);
        }
    }
}
