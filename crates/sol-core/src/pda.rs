//! Program-derived address (PDA) computation.
//!
//! A PDA is `SHA-256(seed_0 || ... || seed_n || program_id ||
//! "ProgramDerivedAddress")`, valid only when the result is NOT a point on
//! the Ed25519 curve — a PDA must have no corresponding private key.
//! [`find_program_address`] searches bump seeds from 255 down to 0 for the
//! first off-curve result.

use sha2::{Digest, Sha256};

use crate::error::SolError;
use crate::keys::PublicKey;

/// The domain separator appended to every PDA derivation.
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Derive the PDA for `seeds`, returning the address and the bump seed that
/// produced it.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &PublicKey,
) -> Result<(PublicKey, u8), SolError> {
    for bump in (0u8..=255).rev() {
        let mut with_bump: Vec<&[u8]> = seeds.to_vec();
        let bump_seed = [bump];
        with_bump.push(&bump_seed);
        if let Some(address) = create_program_address(&with_bump, program_id) {
            return Ok((address, bump));
        }
    }
    Err(SolError::NoProgramAddressFound)
}

/// Compute the address for an exact seed list (bump included).
///
/// Returns `None` when the derived bytes fall on the Ed25519 curve and are
/// therefore not a valid PDA.
pub fn create_program_address(seeds: &[&[u8]], program_id: &PublicKey) -> Option<PublicKey> {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program_id.as_ref());
    hasher.update(PDA_MARKER);

    let hash: [u8; 32] = hasher.finalize().into();
    if is_on_curve_bytes(&hash) {
        return None;
    }
    Some(PublicKey::new(hash))
}

/// Whether `key` is a valid Ed25519 curve point (i.e. a possible public key).
pub fn is_on_curve(key: &PublicKey) -> bool {
    is_on_curve_bytes(&key.0)
}

fn is_on_curve_bytes(bytes: &[u8; 32]) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}
