//! # Block Lotto
//!
//! Round-based commit/reveal lottery settlement engine with tiered prizes,
//! stake-weighted payouts and carryover of unwon jackpots.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        BLOCK LOTTO                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Shared primitives                         │
//! │  ├── amount.rs   - 6-decimal fixed-point money               │
//! │  ├── ids.rs      - Addresses, round/request ids, picks       │
//! │  └── hash.rs     - Domain-separated SHA-256 digests          │
//! │                                                              │
//! │  proof/          - Off-engine verifiable digests             │
//! │  ├── commitment.rs    - Pick commitments                     │
//! │  └── authorization.rs - Delegated reveal authorization       │
//! │                                                              │
//! │  external/       - Collaborator interfaces                   │
//! │  ├── token.rs    - Stake token (+ in-memory ledger)          │
//! │  ├── randomness.rs - Request/callback randomness provider    │
//! │  └── signature.rs  - Signer recovery                         │
//! │                                                              │
//! │  engine/         - Round lifecycle                           │
//! │  ├── registry.rs - Round creation and carry hand-off         │
//! │  ├── commit.rs   - Commitments and stake custody             │
//! │  ├── reveal.rs   - Direct and delegated reveals              │
//! │  ├── randomness.rs - Draw request and fulfillment            │
//! │  ├── prize.rs    - Tier classification and payout split      │
//! │  ├── claim.rs    - Prize payout                              │
//! │  └── store.rs    - Per-round aggregates and snapshots        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Money
//!
//! All amounts are integer micro-units. No floating point is used anywhere.
//! Settlement accounts for every micro-unit: the fee, treasury accrual,
//! payouts and carry-out of a round add up to its deposits plus carry-in.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod external;
pub mod proof;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{EmptyTierPolicy, LottoConfig};
pub use crate::core::amount::Amount;
pub use crate::core::ids::{Address, Nonce, Pick, RandomWord, RequestId, RoundId, Timestamp, WinningNumber};
pub use engine::{Call, LottoEngine, LottoEvent, RoundSnapshot, SettlementSummary, WinningNumberView};
pub use error::{ErrorKind, LottoError, LottoResult};
pub use external::{InMemoryToken, RandomnessProvider, SignerRecovery, StakeToken};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
