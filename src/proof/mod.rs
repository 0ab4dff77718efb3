//! Commit/Reveal Proofs
//!
//! Digests that tie a revealed pick back to its commitment, and the
//! authorization tuple a player signs for delegated reveal.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PROOF LAYER                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  commitment.rs    - pick + nonce digest, verification       │
//! │  authorization.rs - signed reveal tuple for relayers        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod authorization;
pub mod commitment;

// Re-export key types
pub use authorization::RevealAuthorization;
pub use commitment::{commitment_digest, public_entry_digest, verify_commitment, CommitmentHash};
