//! Content fingerprint used as the cache key.
//!
//! A fingerprint is the SHA-256 of all rows concatenated in order, rendered
//! as lowercase hex. It carries no salt, so keys stay valid across restarts
//! and a durable store can be reopened.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::types::grid::Grid;

/// Hex length of a SHA-256 digest.
const HEX_LEN: usize = 64;

/// Rejected fingerprint text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    #[error("expected {expected} hex characters, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("not lowercase hex: {0}")]
    NotHex(String),
}

/// SHA-256 content digest of a grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprints a validated grid.
    pub fn of(grid: &Grid) -> Self {
        Self::of_bytes(grid.concat_bytes())
    }

    /// Fingerprints raw row content without validating it.
    pub fn of_rows<S: AsRef<str>>(rows: &[S]) -> Self {
        let mut hasher = Sha256::new();
        for row in rows {
            hasher.update(row.as_ref().as_bytes());
        }
        Self(hex::encode(hasher.finalize()))
    }

    fn of_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(bytes)))
    }

    /// Parses a stored key.
    pub fn parse(text: &str) -> Result<Self, FingerprintError> {
        if text.len() != HEX_LEN {
            return Err(FingerprintError::Length {
                expected: HEX_LEN,
                actual: text.len(),
            });
        }
        if !text
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(FingerprintError::NotHex(text.to_string()));
        }
        Ok(Self(text.to_string()))
    }

    /// Hex text of the digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 characters, for logs.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = FingerprintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Fingerprint> for String {
    fn from(value: Fingerprint) -> Self {
        value.0
    }
}
