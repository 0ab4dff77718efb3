//! Engine Errors
//!
//! Every rejected call returns one [`LottoError`] and leaves engine state
//! exactly as it was. Messages mirror the short revert strings relayers
//! already match on ("commit not open", "nothing to claim", ...).

use thiserror::Error;

use crate::config::ConfigError;
use crate::core::ids::{Address, RequestId, RoundId};
use crate::external::randomness::ProviderError;
use crate::external::token::TokenError;

/// Broad failure category, for callers that decide policy per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Call outside its permitted phase.
    WindowViolation,
    /// Out-of-range pick, malformed timestamps.
    InvalidInput,
    /// Wrong provider, invalid signature, non-admin.
    AuthorizationFailure,
    /// Double reveal, double settle, missing result, unset provider.
    StateConflict,
    /// Token balance or allowance shortfall.
    InsufficientResource,
    /// Zero or already-paid claim.
    NothingToClaim,
    /// Unknown round.
    NotFound,
}

/// Engine errors.
#[derive(Debug, Error)]
pub enum LottoError {
    /// Round timestamps are not strictly increasing or reveal time already passed.
    #[error("bad times")]
    BadTimes,

    /// Commit (or direct entry) outside `[open_time, close_time)`.
    #[error("commit not open")]
    CommitWindowViolation,

    /// Reveal outside `[close_time, reveal_time)`.
    #[error("reveal not open")]
    RevealWindowViolation,

    /// Settle before `reveal_time` while commitments are still unrevealed.
    #[error("reveal still open")]
    RevealStillOpen,

    /// Pick outside `[0, 999]`.
    #[error("bad pick: {0}")]
    BadPick(u16),

    /// Commitment index missing or already revealed.
    #[error("already revealed")]
    AlreadyRevealed,

    /// `(pick, nonce)` does not match the stored commitment.
    #[error("invalid reveal")]
    InvalidReveal,

    /// Delegated reveal signature does not recover to the player.
    #[error("bad signature")]
    BadSignature,

    /// Randomness requested before close, or requested twice.
    #[error("not closed")]
    NotClosed,

    /// No randomness provider configured.
    #[error("vrf unset")]
    ProviderUnset,

    /// Fulfillment from anyone but the configured provider.
    #[error("only vrf: {0} is not the configured provider")]
    UnauthorizedFulfiller(Address),

    /// Fulfillment for an unknown or already-consumed request.
    #[error("unknown request {0}")]
    UnknownRequest(RequestId),

    /// Settle before randomness has been fulfilled.
    #[error("no result")]
    NoResult,

    /// Round already settled.
    #[error("settled")]
    AlreadySettled,

    /// Claim before settlement.
    #[error("not settled")]
    NotSettled,

    /// No unpaid, non-zero claim for the player.
    #[error("nothing to claim")]
    NothingToClaim,

    /// Round id was never created.
    #[error("unknown round {0}")]
    UnknownRound(RoundId),

    /// Administrative call from a non-admin.
    #[error("not admin: {0}")]
    NotAdmin(Address),

    /// Amount arithmetic would overflow.
    #[error("amount overflow")]
    Overflow,

    /// Token collaborator rejected a transfer.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Randomness collaborator rejected a request.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Persisted state could not be encoded or decoded.
    #[error("state encoding: {0}")]
    State(String),

    /// Engine configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl LottoError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CommitWindowViolation | Self::RevealWindowViolation | Self::RevealStillOpen => {
                ErrorKind::WindowViolation
            }
            Self::BadTimes | Self::BadPick(_) | Self::InvalidReveal | Self::State(_) | Self::Config(_) => {
                ErrorKind::InvalidInput
            }
            Self::BadSignature | Self::UnauthorizedFulfiller(_) | Self::NotAdmin(_) => {
                ErrorKind::AuthorizationFailure
            }
            Self::AlreadyRevealed
            | Self::NotClosed
            | Self::ProviderUnset
            | Self::UnknownRequest(_)
            | Self::NoResult
            | Self::AlreadySettled
            | Self::NotSettled
            | Self::Overflow
            | Self::Provider(_) => ErrorKind::StateConflict,
            Self::Token(_) => ErrorKind::InsufficientResource,
            Self::NothingToClaim => ErrorKind::NothingToClaim,
            Self::UnknownRound(_) => ErrorKind::NotFound,
        }
    }

    /// True for outcomes a retrying caller should treat as a no-op.
    ///
    /// Provider failures and arithmetic overflow are never benign: the round
    /// stays undrawn or unsettled until someone acts on them.
    pub fn is_benign_retry_outcome(&self) -> bool {
        if matches!(self, Self::Provider(_) | Self::Overflow) {
            return false;
        }
        matches!(self.kind(), ErrorKind::NothingToClaim | ErrorKind::StateConflict)
    }
}

/// Result alias for engine operations.
pub type LottoResult<T> = Result<T, LottoError>;
