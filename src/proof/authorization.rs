//! Delegated Reveal Authorization
//!
//! A player signs, once at commit time, the digest of every parameter of a
//! future reveal. Anyone holding that signature can later submit the reveal
//! on the player's behalf; the engine recovers the signer from the same
//! digest and executes the reveal as if the player had called it.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ SHA-256("BLOCK_LOTTO_REVEAL_AUTH_V1"                         │
//! │         || engine address (20) || chain id (u64 BE)          │
//! │         || round id (u64 BE)   || player (20)                │
//! │         || pick (u16 BE)       || nonce (32)                 │
//! │         || commit index (u64 BE))                            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A signature is only valid for the engine address and chain id it names.

use serde::{Deserialize, Serialize};

use crate::core::hash::{Digest32, DigestBuilder};
use crate::core::ids::{Address, CommitIndex, Nonce, RoundId};

/// Domain separator for reveal authorizations.
const AUTHORIZATION_DOMAIN: &[u8] = b"BLOCK_LOTTO_REVEAL_AUTH_V1";

/// The canonical tuple a player signs to authorize a delegated reveal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealAuthorization {
    /// Custody address of the engine deployment.
    pub engine: Address,
    /// Network identifier of the deployment.
    pub chain_id: u64,
    /// Round the commitment belongs to.
    pub round_id: RoundId,
    /// Player who made the commitment.
    pub player: Address,
    /// Raw pick as signed (validated separately).
    pub pick: u16,
    /// Commitment nonce.
    pub nonce: Nonce,
    /// Index into the player's commitment list.
    pub commit_index: CommitIndex,
}

impl RevealAuthorization {
    /// Digest that must be signed by `player`.
    pub fn digest(&self) -> Digest32 {
        let mut builder = DigestBuilder::new(AUTHORIZATION_DOMAIN);
        builder
            .update_address(&self.engine)
            .update_u64(self.chain_id)
            .update_u64(self.round_id.0)
            .update_address(&self.player)
            .update_u16(self.pick)
            .update_nonce(&self.nonce)
            .update_u64(self.commit_index as u64);
        builder.finalize()
    }
}
