//! Content hash used for locally computed identifiers (sha256, 32 bytes)

use std::fmt;

use sha2::{Digest, Sha256};

/// Hash of a blob's exact byte content.
#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub struct Hash([u8; 32]);

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hash").field(&self.to_hex()).finish()
    }
}

impl Hash {
    /// Calculate the hash of the provided bytes.
    pub fn new(buf: impl AsRef<[u8]>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(buf.as_ref());
        Hash(hasher.finalize().into())
    }

    /// Bytes of the hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert the hash to a lowercase hex string (64 characters).
    pub fn to_hex(&self) -> String {
        data_encoding::HEXLOWER.encode(&self.0)
    }

    /// Convert to a hex string limited to the first 5 bytes for a friendly string
    /// representation of the hash.
    pub fn fmt_short(&self) -> String {
        data_encoding::HEXLOWER.encode(&self.0[..5])
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_sha256() {
        let hash = Hash::new(b"abc");
        assert_eq!(
            hash.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert!(hash.to_hex().starts_with(&hash.fmt_short()));
        assert_eq!(hash.as_ref(), hash.as_bytes());
    }

    #[test]
    fn deterministic() {
        assert_eq!(Hash::new(b"abc"), Hash::new(b"abc".to_vec()));
        assert_ne!(Hash::new(b"abc"), Hash::new(b"abd"));
    }
}
