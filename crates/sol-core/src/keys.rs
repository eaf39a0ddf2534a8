//! Ed25519 key material, signatures, and blockhashes.
//!
//! All four value types are fixed-size byte arrays with a Base58 text form
//! (the standard Bitcoin alphabet, as used across the network for addresses,
//! signatures, and hashes). No hashing is applied to public keys — the raw
//! 32 bytes ARE the address bytes.

use core::fmt;
use core::str::FromStr;

use ed25519_dalek::Signer as _;
use rand::RngCore;
use rand_core::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::SolError;

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// A 32-byte Ed25519 public key identifying an account or program.
///
/// The all-zero value doubles as the "unset" sentinel (it is also the System
/// Program id, which is never a fee payer).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    pub const fn new(bytes: [u8; 32]) -> Self {
        PublicKey(bytes)
    }

    /// Decode a Base58 address string.
    pub fn from_base58(s: &str) -> Result<Self, SolError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| SolError::InvalidPublicKey(format!("base58 decode failed: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Build a key from a byte slice, which must be exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SolError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            SolError::InvalidPublicKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(PublicKey(arr))
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    /// Whether this is the all-zero "unset" sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({self})")
    }
}

impl FromStr for PublicKey {
    type Err = SolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Hash
// ---------------------------------------------------------------------------

/// A 32-byte ledger hash. Transactions embed a recent one verbatim to bound
/// their validity window and prevent replay.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }

    pub fn from_base58(s: &str) -> Result<Self, SolError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| SolError::InvalidHash(format!("base58 decode failed: {e}")))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| SolError::InvalidHash(format!("expected 32 bytes, got {}", v.len())))?;
        Ok(Hash(arr))
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({self})")
    }
}

impl FromStr for Hash {
    type Err = SolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    pub const fn new(bytes: [u8; 64]) -> Self {
        Signature(bytes)
    }

    pub fn from_base58(s: &str) -> Result<Self, SolError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| SolError::InvalidSignatureText(format!("base58 decode failed: {e}")))?;
        let arr: [u8; 64] = bytes.try_into().map_err(|v: Vec<u8>| {
            SolError::InvalidSignatureText(format!("expected 64 bytes, got {}", v.len()))
        })?;
        Ok(Signature(arr))
    }

    pub fn to_bytes(self) -> [u8; 64] {
        self.0
    }

    /// Verify this signature over `message` against `pubkey`.
    ///
    /// Returns `false` for malformed public keys as well as signature
    /// mismatches; network data must never panic here.
    pub fn verify(&self, pubkey: &PublicKey, message: &[u8]) -> bool {
        let Ok(vk) = ed25519_dalek::VerifyingKey::from_bytes(&pubkey.0) else {
            return false;
        };
        let sig = ed25519_dalek::Signature::from_bytes(&self.0);
        vk.verify_strict(message, &sig).is_ok()
    }
}

impl Default for Signature {
    fn default() -> Self {
        Signature([0u8; 64])
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

impl FromStr for Signature {
    type Err = SolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// PrivateKey
// ---------------------------------------------------------------------------

/// A 64-byte expanded Ed25519 keypair (32-byte seed followed by the 32-byte
/// public key), the layout used by keypair files and vault exports.
///
/// The bytes are validated on import — the embedded public half must match
/// the one derived from the seed — so signing itself cannot fail. The buffer
/// is zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 64]);

impl PrivateKey {
    /// Import a 64-byte keypair, checking seed/public consistency.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SolError> {
        let arr: [u8; 64] = bytes.try_into().map_err(|_| {
            SolError::InvalidPrivateKey(format!("expected 64 bytes, got {}", bytes.len()))
        })?;
        ed25519_dalek::SigningKey::from_keypair_bytes(&arr)
            .map_err(|e| SolError::InvalidPrivateKey(format!("inconsistent keypair: {e}")))?;
        Ok(PrivateKey(arr))
    }

    /// Build a keypair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let mut seed = *seed;
        let signing_key = ed25519_dalek::SigningKey::from_bytes(&seed);
        seed.zeroize();
        PrivateKey(signing_key.to_keypair_bytes())
    }

    /// Decode the Base58 form of a 64-byte keypair.
    pub fn from_base58(s: &str) -> Result<Self, SolError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| SolError::InvalidPrivateKey(format!("base58 decode failed: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Generate a fresh keypair from the OS random source.
    pub fn new_random() -> Self {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        let key = Self::from_seed(&seed);
        seed.zeroize();
        key
    }

    /// The public half of the keypair.
    pub fn pubkey(&self) -> PublicKey {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&self.0[32..]);
        PublicKey(bytes)
    }

    /// Sign `message`. Ed25519 signing is deterministic: the same key and
    /// message always produce the same signature.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&self.0[..32]);
        let signing_key = ed25519_dalek::SigningKey::from_bytes(&seed);
        seed.zeroize();
        Signature(signing_key.sign(message).to_bytes())
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material.
        write!(f, "PrivateKey({})", self.pubkey())
    }
}
