//! Pick Commitment Protocol
//!
//! Commit to a pick during the commit window without disclosing it.
//! Reveal `(pick, nonce)` later and verify it against the stored digest.
//!
//! ```text
//! digest = SHA-256("BLOCK_LOTTO_COMMIT_V1" || pick: u16 BE || nonce: 32 bytes BE)
//! ```

use crate::core::hash::{Digest32, DigestBuilder};
use crate::core::ids::{Nonce, Pick};

/// Domain separator for pick commitments.
const COMMITMENT_DOMAIN: &[u8] = b"BLOCK_LOTTO_COMMIT_V1";

/// Hiding digest of a pick and nonce.
pub type CommitmentHash = Digest32;

/// Compute the commitment digest for a raw pick value and nonce.
///
/// Accepts any `u16` so clients can build the digest before validation;
/// only picks in `[0, 999]` can ever be revealed successfully.
pub fn commitment_digest(pick: u16, nonce: &Nonce) -> CommitmentHash {
    let mut builder = DigestBuilder::new(COMMITMENT_DOMAIN);
    builder.update_u16(pick).update_nonce(nonce);
    builder.finalize()
}

/// Check a revealed `(pick, nonce)` against a stored commitment.
pub fn verify_commitment(stored: &CommitmentHash, pick: Pick, nonce: &Nonce) -> bool {
    commitment_digest(pick.value(), nonce) == *stored
}

/// Commitment recorded for a direct (already public) entry.
pub fn public_entry_digest(pick: Pick) -> CommitmentHash {
    commitment_digest(pick.value(), &Nonce::default())
}
