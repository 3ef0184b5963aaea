use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Number of raw bytes in a SHA3-512 digest.
pub const DIGEST_LEN: usize = 64;

/// Number of hex characters in a rendered digest.
pub const DIGEST_HEX_LEN: usize = DIGEST_LEN * 2;

/// A SHA3-512 digest.
///
/// Digests always render as 128 lowercase hex characters. Parsing is lenient
/// about case and an optional `0x` prefix, so a digest that went through an
/// explorer or a ledger client still compares equal to the original.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Wrap raw digest bytes.
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// The raw 64-byte digest.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hex rendering (128 characters, no prefix).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 12 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..6])
    }

    /// Parse a hex digest, tolerating a `0x`/`0X` prefix and uppercase digits.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let trimmed = strip_hex_prefix(s.trim());
        if trimmed.len() != DIGEST_HEX_LEN {
            return Err(TypeError::InvalidLength {
                expected: DIGEST_HEX_LEN,
                actual: trimmed.len(),
            });
        }
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(trimmed, &mut bytes)
            .map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Compare against a hex string without requiring it to be well-formed.
    ///
    /// Anything that does not parse as a digest is simply unequal.
    pub fn matches_hex(&self, claimed: &str) -> bool {
        Self::from_hex(claimed).map(|d| d == *self).unwrap_or(false)
    }
}

/// Remove a leading `0x` or `0X`.
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Canonical spelling of a caller-supplied hash.
///
/// Anything that parses as a [`Digest`] becomes its lowercase hex without
/// prefix; other text is only trimmed.
pub fn normalize_hash(s: &str) -> String {
    let trimmed = s.trim();
    Digest::from_hex(trimmed)
        .map(|d| d.to_hex())
        .unwrap_or_else(|_| trimmed.to_string())
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.short_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; DIGEST_LEN]> for Digest {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
