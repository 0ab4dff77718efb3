//! Core primitives.
//!
//! Integer-only money, identifiers and digests shared by every engine
//! component. Nothing here touches engine state.

pub mod amount;
pub mod hash;
pub mod ids;

// Re-export core types
pub use amount::{Amount, BPS_DENOMINATOR, MICROS_PER_UNIT};
pub use hash::{Digest32, DigestBuilder};
pub use ids::{
    Address, CommitIndex, Nonce, Pick, RandomWord, RequestId, RoundId, Timestamp,
    WinningNumber, PICK_MAX,
};
