//! Round Store
//!
//! Owned per-round aggregates. Every component reads and writes one
//! [`RoundRecord`] keyed by [`RoundId`]; nothing holds references across
//! calls.
//!
//! ```text
//! RoundRecord
//! ├── round         (times, deposits, carry-in, draw state, settlement)
//! ├── commitments   player → [Commitment; commit order]
//! ├── reveals       [Reveal; reveal order]
//! └── claims        player → Claim
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::amount::Amount;
use crate::core::hash::Digest32;
use crate::core::ids::{Address, CommitIndex, Pick, RequestId, RoundId, Timestamp, WinningNumber};
use crate::engine::prize::SettlementSummary;

// =============================================================================
// POOL CARRY
// =============================================================================

/// Prize money moved between rounds, per tier.
///
/// Tier 1 carries whenever nobody matches exactly. Tiers 2 and 3 only carry
/// under [`EmptyTierPolicy::CarryForward`](crate::config::EmptyTierPolicy).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolCarry {
    /// Exact-match pool.
    pub pool1: Amount,
    /// Last-two-digits pool.
    pub pool2: Amount,
    /// Last-digit pool.
    pub pool3: Amount,
}

impl PoolCarry {
    /// Nothing carried.
    pub const NONE: Self = Self {
        pool1: Amount::ZERO,
        pool2: Amount::ZERO,
        pool3: Amount::ZERO,
    };

    /// Per-tier amounts in tier order.
    pub fn as_array(&self) -> [Amount; 3] {
        [self.pool1, self.pool2, self.pool3]
    }

    /// Build from per-tier amounts in tier order.
    pub fn from_array(pools: [Amount; 3]) -> Self {
        Self {
            pool1: pools[0],
            pool2: pools[1],
            pool3: pools[2],
        }
    }

    /// Sum over all tiers, `None` on overflow.
    pub fn total(&self) -> Option<Amount> {
        Amount::checked_sum(self.as_array())
    }

    /// Tier-wise sum, `None` on overflow.
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        Some(Self {
            pool1: self.pool1.checked_add(other.pool1)?,
            pool2: self.pool2.checked_add(other.pool2)?,
            pool3: self.pool3.checked_add(other.pool3)?,
        })
    }

    /// True when every tier is zero.
    pub fn is_empty(&self) -> bool {
        self.as_array().iter().all(|a| a.is_zero())
    }
}

// =============================================================================
// ROUND
// =============================================================================

/// Randomness progress of a round.
///
/// The winning number sits in `Fulfilled` until settlement copies it into
/// the public [`SettlementSummary`]. Nothing outside the crate can match on
/// this type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum DrawState {
    #[default]
    Idle,
    Requested {
        request_id: RequestId,
    },
    Fulfilled {
        request_id: RequestId,
        winning_number: WinningNumber,
    },
}

/// One lottery round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// Sequential id, starting at 1.
    pub id: RoundId,
    /// Commit window opens (inclusive).
    pub open_time: Timestamp,
    /// Commit window closes, reveal window opens.
    pub close_time: Timestamp,
    /// Reveal window closes.
    pub reveal_time: Timestamp,
    /// Stakes pulled into custody for this round.
    pub total_deposits: Amount,
    /// Carry received at creation.
    pub carry_in: PoolCarry,
    pub(crate) draw: DrawState,
    pub(crate) settlement: Option<SettlementSummary>,
}

impl Round {
    pub(crate) fn new(
        id: RoundId,
        open_time: Timestamp,
        close_time: Timestamp,
        reveal_time: Timestamp,
        carry_in: PoolCarry,
    ) -> Self {
        Self {
            id,
            open_time,
            close_time,
            reveal_time,
            total_deposits: Amount::ZERO,
            carry_in,
            draw: DrawState::Idle,
            settlement: None,
        }
    }

    /// Commit window `[open_time, close_time)`.
    pub fn commit_open(&self, now: Timestamp) -> bool {
        now >= self.open_time && now < self.close_time
    }

    /// Reveal window `[close_time, reveal_time)`.
    pub fn reveal_open(&self, now: Timestamp) -> bool {
        now >= self.close_time && now < self.reveal_time
    }

    /// A randomness request has been issued.
    pub fn drawn(&self) -> bool {
        !matches!(self.draw, DrawState::Idle)
    }

    /// The provider has delivered a word.
    pub fn fulfilled(&self) -> bool {
        matches!(self.draw, DrawState::Fulfilled { .. })
    }

    /// Settlement has been recorded.
    pub fn settled(&self) -> bool {
        self.settlement.is_some()
    }

    /// Request issued for this round, if any.
    pub fn request_id(&self) -> Option<RequestId> {
        match self.draw {
            DrawState::Idle => None,
            DrawState::Requested { request_id } | DrawState::Fulfilled { request_id, .. } => Some(request_id),
        }
    }

    /// Winning number, published only once the round is settled.
    pub fn winning_number(&self) -> Option<WinningNumber> {
        self.settlement.as_ref().map(|s| s.winning_number)
    }

    /// Settlement breakdown, once settled.
    pub fn settlement(&self) -> Option<&SettlementSummary> {
        self.settlement.as_ref()
    }

    pub(crate) fn hidden_result(&self) -> Option<WinningNumber> {
        match self.draw {
            DrawState::Fulfilled { winning_number, .. } => Some(winning_number),
            _ => None,
        }
    }
}

// =============================================================================
// ENTRIES AND CLAIMS
// =============================================================================

/// Hidden pick with its stake.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    /// Owning round.
    pub round_id: RoundId,
    /// Committing player.
    pub player: Address,
    /// Digest of `(pick, nonce)`.
    pub commitment_hash: Digest32,
    /// Stake pulled for this entry.
    pub stake: Amount,
    /// Set once the matching reveal succeeded.
    pub revealed: bool,
}

/// Verified pick. Only revealed entries take part in settlement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reveal {
    /// Owning round.
    pub round_id: RoundId,
    /// Player the entry belongs to.
    pub player: Address,
    /// Disclosed pick.
    pub pick: Pick,
    /// Stake of the entry.
    pub stake: Amount,
    /// Index into the player's commitment list.
    pub commit_index: CommitIndex,
}

/// Settled prize entitlement of one player in one round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Owning round.
    pub round_id: RoundId,
    /// Entitled player.
    pub player: Address,
    /// Amount owed.
    pub amount: Amount,
    /// Paid out.
    pub claimed: bool,
}

/// Everything stored for one round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Round metadata.
    pub round: Round,
    /// Commitments per player, in commit order.
    pub commitments: BTreeMap<Address, Vec<Commitment>>,
    /// Reveals in reveal order.
    pub reveals: Vec<Reveal>,
    /// Claims per player, written at settlement.
    pub claims: BTreeMap<Address, Claim>,
}

impl RoundRecord {
    pub(crate) fn new(round: Round) -> Self {
        Self {
            round,
            commitments: BTreeMap::new(),
            reveals: Vec::new(),
            claims: BTreeMap::new(),
        }
    }

    /// Number of commitments across all players.
    pub fn total_commitments(&self) -> usize {
        self.commitments.values().map(Vec::len).sum()
    }

    /// Commitments not yet opened, across all players.
    pub fn unrevealed_commitments(&self) -> usize {
        self.commitments.values().flatten().filter(|c| !c.revealed).count()
    }

    /// Picks revealed by `player`, in reveal order.
    pub fn revealed_picks(&self, player: &Address) -> Vec<Pick> {
        self.reveals
            .iter()
            .filter(|r| r.player == *player)
            .map(|r| r.pick)
            .collect()
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Public view of the winning number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinningNumberView {
    /// Not settled yet.
    NotAvailable,
    /// Settled with this number.
    Published(WinningNumber),
}

/// Read-only copy of a round's public fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    /// Round id.
    pub id: RoundId,
    /// Commit window opens.
    pub open_time: Timestamp,
    /// Commit window closes.
    pub close_time: Timestamp,
    /// Reveal window closes.
    pub reveal_time: Timestamp,
    /// Stakes in custody for the round.
    pub total_deposits: Amount,
    /// Carry received at creation.
    pub carry_in: PoolCarry,
    /// Randomness requested.
    pub drawn: bool,
    /// Settlement recorded.
    pub settled: bool,
    /// Winning number, hidden until settlement.
    pub winning_number: WinningNumberView,
}

impl From<&Round> for RoundSnapshot {
    fn from(round: &Round) -> Self {
        Self {
            id: round.id,
            open_time: round.open_time,
            close_time: round.close_time,
            reveal_time: round.reveal_time,
            total_deposits: round.total_deposits,
            carry_in: round.carry_in,
            drawn: round.drawn(),
            settled: round.settled(),
            winning_number: match round.winning_number() {
                Some(n) => WinningNumberView::Published(n),
                None => WinningNumberView::NotAvailable,
            },
        }
    }
}
