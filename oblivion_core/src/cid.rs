use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::StoreError, hash::Hash};

/// URI scheme callers commonly attach to content identifiers.
pub const IPFS_SCHEME: &str = "ipfs://";

const LOCAL_CID_PREFIX: &str = "Qm";
const LOCAL_CID_HEX_LEN: usize = 44;

/// Content identifier naming an immutable blob within one backend.
///
/// The string itself is opaque: hosted backends assign it, the mock
/// derives it from a content hash. A `Cid` is always normalized, so two
/// spellings of the same identifier (`ipfs://X`, ` X `, `X`) compare equal.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cid(String);

impl Cid {
    /// Normalizes `input` and wraps it.
    ///
    /// Surrounding whitespace and a leading `ipfs://` scheme are removed.
    /// Fails with [`StoreError::InvalidCid`] if nothing is left.
    pub fn parse(input: &str) -> Result<Self, StoreError> {
        let trimmed = input.trim();
        let bare = trimmed.strip_prefix(IPFS_SCHEME).unwrap_or(trimmed).trim();
        if bare.is_empty() {
            return Err(StoreError::InvalidCid(input.to_owned()));
        }
        Ok(Cid(bare.to_owned()))
    }

    /// Locally computed identifier for content with the given hash.
    ///
    /// `Qm` followed by the first 44 hex digits of the hash. It only
    /// resembles a network CID and is not valid on a real network.
    pub fn from_content_hash(hash: &Hash) -> Self {
        let hex = hash.to_hex();
        Cid(format!("{LOCAL_CID_PREFIX}{}", &hex[..LOCAL_CID_HEX_LEN]))
    }

    /// True if this identifier has the shape produced by [`Cid::from_content_hash`].
    pub fn is_local(&self) -> bool {
        self.0.len() == LOCAL_CID_PREFIX.len() + LOCAL_CID_HEX_LEN
            && self
                .0
                .strip_prefix(LOCAL_CID_PREFIX)
                .is_some_and(|hex| hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `ipfs://` URI form of this identifier.
    pub fn to_uri(&self) -> String {
        format!("{IPFS_SCHEME}{}", self.0)
    }

    /// Short prefix for log lines.
    pub fn fmt_short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(16)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cid").field(&self.0).finish()
    }
}

impl AsRef<str> for Cid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Cid {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cid::parse(s)
    }
}

impl TryFrom<String> for Cid {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Cid::parse(&value)
    }
}

impl From<Cid> for String {
    fn from(value: Cid) -> Self {
        value.0
    }
}
