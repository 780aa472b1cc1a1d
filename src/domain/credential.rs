use std::fmt;

use crate::domain::Error;

/// A new PIN chosen by the account owner: exactly four ASCII digits.
#[derive(Clone, PartialEq, Eq)]
pub struct Pin(String);

impl Pin {
    pub const LENGTH: usize = 4;

    pub fn parse(raw: &str) -> Result<Self, Error> {
        if raw.len() == Self::LENGTH && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(Error::InvalidPin)
        }
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(****)")
    }
}

/// Stored secret an account authenticates against.
///
/// Kept as the plain string form of the PIN; comparison is exact string
/// equality. Values loaded from storage are taken as-is, only PIN changes
/// go through [`Pin`] validation.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn from_stored(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn verify(&self, candidate: &str) -> bool {
        self.0 == candidate
    }

    /// The stored form, for persistence only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<Pin> for Credential {
    fn from(pin: Pin) -> Self {
        Self(pin.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}
