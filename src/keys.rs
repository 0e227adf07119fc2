//! Key and tweak material.
//!
//! A [`KeyTweakPair`] is either imported from hex or derived from a secret
//! and a label. Derivation hashes the secret with a different prefix for the
//! key and for the tweak, so related labels never share tweak bytes with a
//! key.

use sha2::{Digest, Sha256};

use crate::common::{Error, Result, TWEAK_LENGTH};
use crate::ff3::Ff3Cipher;

const KEY_DOMAIN: &[u8] = b"ff3-1 key";
const TWEAK_DOMAIN: &[u8] = b"ff3-1 tweak";

/// AES key plus 56-bit FF3-1 tweak.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyTweakPair {
    key: Vec<u8>,
    tweak: [u8; TWEAK_LENGTH],
}

impl core::fmt::Debug for KeyTweakPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeyTweakPair")
            .field("key_len", &self.key.len())
            .field("tweak", &hex::encode(self.tweak))
            .finish()
    }
}

fn check_key_length(len: usize) -> Result<()> {
    match len {
        16 | 24 | 32 => Ok(()),
        _ => Err(Error::InvalidKeyLength(len)),
    }
}

fn digest(domain: &[u8], secret: &[u8], label: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update((secret.len() as u64).to_be_bytes());
    hasher.update(secret);
    hasher.update(label);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

impl KeyTweakPair {
    pub fn new(key: &[u8], tweak: &[u8]) -> Result<Self> {
        check_key_length(key.len())?;
        let tweak = tweak
            .try_into()
            .map_err(|_| Error::InvalidTweakLength(tweak.len()))?;
        Ok(Self {
            key: key.to_vec(),
            tweak,
        })
    }

    /// Deterministically derive a key of `key_len` bytes and a tweak.
    ///
    /// The same `(secret, label)` always yields the same pair; different
    /// labels give independent pairs under one secret.
    pub fn derive(secret: &[u8], label: &str, key_len: usize) -> Result<Self> {
        check_key_length(key_len)?;
        let key = digest(KEY_DOMAIN, secret, label.as_bytes())[..key_len].to_vec();
        let mut tweak = [0u8; TWEAK_LENGTH];
        tweak.copy_from_slice(&digest(TWEAK_DOMAIN, secret, label.as_bytes())[..TWEAK_LENGTH]);
        Ok(Self { key, tweak })
    }

    /// Parse hex-encoded key and tweak.
    pub fn from_hex(key: &str, tweak: &str) -> Result<Self> {
        let key = hex::decode(key.trim()).map_err(|e| Error::InvalidHex(e.to_string()))?;
        let tweak = hex::decode(tweak.trim()).map_err(|e| Error::InvalidHex(e.to_string()))?;
        Self::new(&key, &tweak)
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn tweak(&self) -> &[u8; TWEAK_LENGTH] {
        &self.tweak
    }

    pub fn key_hex(&self) -> String {
        hex::encode(&self.key)
    }

    pub fn tweak_hex(&self) -> String {
        hex::encode(self.tweak)
    }

    /// Cipher over the default alphabet.
    pub fn cipher(&self) -> Result<Ff3Cipher> {
        Ff3Cipher::new(&self.key, &self.tweak)
    }
}
