//! Registry identifiers
//!
//! The Sirene register keys legal units by SIREN (9 digits) and their
//! establishments by SIRET (SIREN followed by a 5-digit NIC). Both are parsed
//! once at the edge and carried around as validated newtypes.
//!
//! No Luhn check is applied: the register contains valid SIRETs (La Poste
//! establishments) that fail it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of digits in a SIREN
pub const SIREN_LENGTH: usize = 9;

/// Number of digits in a SIRET
pub const SIRET_LENGTH: usize = 14;

/// Identifier parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("{kind} must be exactly {expected} digits, got {actual} characters")]
    Length {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{kind} must contain only digits")]
    NonDigit { kind: &'static str },
}

fn check_digits(kind: &'static str, expected: usize, value: &str) -> Result<(), IdentifierError> {
    let actual = value.chars().count();
    if actual != expected {
        return Err(IdentifierError::Length {
            kind,
            expected,
            actual,
        });
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IdentifierError::NonDigit { kind });
    }
    Ok(())
}

/// Establishment identifier (14 digits)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Siret(String);

impl Siret {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The legal unit this establishment belongs to
    pub fn siren(&self) -> Siren {
        Siren(self.0[..SIREN_LENGTH].to_string())
    }

    /// Internal classification number of the establishment within its legal unit
    pub fn nic(&self) -> &str {
        &self.0[SIREN_LENGTH..]
    }
}

impl FromStr for Siret {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        check_digits("SIRET", SIRET_LENGTH, trimmed)?;
        Ok(Self(trimmed.to_string()))
    }
}

impl TryFrom<String> for Siret {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Siret> for String {
    fn from(value: Siret) -> Self {
        value.0
    }
}

impl fmt::Display for Siret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Legal unit identifier (9 digits)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Siren(String);

impl Siren {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Siren {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        check_digits("SIREN", SIREN_LENGTH, trimmed)?;
        Ok(Self(trimmed.to_string()))
    }
}

impl TryFrom<String> for Siren {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Siren> for String {
    fn from(value: Siren) -> Self {
        value.0
    }
}

impl fmt::Display for Siren {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
