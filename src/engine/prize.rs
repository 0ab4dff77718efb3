//! Prize Engine
//!
//! Splits a round's deposits into fee and three tier pools, classifies each
//! revealed entry against the winning number and divides every tier pool
//! among its entries in proportion to stake.
//!
//! ```text
//! total ──┬── pool1 (70%) + carry_in.pool1 ──► exact match     │ empty → carry_out.pool1
//!         ├── pool2 (15%) + carry_in.pool2 ──► last two digits │ empty → policy
//!         ├── pool3 ( 5%) + carry_in.pool3 ──► last digit      │ empty → policy
//!         └── fee = total - pools ──────────► treasury
//! ```
//!
//! Every micro-unit is accounted for:
//! `fee + treasury_accrual + Σpayouts + carry_out == total + carry_in`.
//! Shares round down; the remainder of a tier goes to the first entry of
//! that tier in reveal order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{EmptyTierPolicy, LottoConfig};
use crate::core::amount::Amount;
use crate::core::ids::{Address, CommitIndex, Pick, RoundId, WinningNumber};
use crate::engine::events::LottoEvent;
use crate::engine::store::{Claim, PoolCarry, Reveal};
use crate::engine::{Call, LottoEngine};
use crate::error::{LottoError, LottoResult};
use crate::external::token::StakeToken;

// =============================================================================
// TIERS
// =============================================================================

/// Prize tier of a revealed entry. Each entry lands in at most one tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// All three digits match.
    Exact,
    /// Last two digits match.
    LastTwo,
    /// Last digit matches.
    LastDigit,
}

impl Tier {
    /// Tiers in payout order.
    pub const ALL: [Tier; 3] = [Tier::Exact, Tier::LastTwo, Tier::LastDigit];

    /// Position in [`Tier::ALL`] and in per-tier arrays.
    pub fn index(self) -> usize {
        match self {
            Tier::Exact => 0,
            Tier::LastTwo => 1,
            Tier::LastDigit => 2,
        }
    }

    /// Highest tier `pick` reaches against `winning`, if any.
    pub fn classify(pick: Pick, winning: WinningNumber) -> Option<Tier> {
        if pick == winning {
            Some(Tier::Exact)
        } else if pick.last_two() == winning.last_two() {
            Some(Tier::LastTwo)
        } else if pick.last_digit() == winning.last_digit() {
            Some(Tier::LastDigit)
        } else {
            None
        }
    }
}

// =============================================================================
// SETTLEMENT TYPES
// =============================================================================

/// One winning entry and its share.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerShare {
    /// Entry owner.
    pub player: Address,
    /// Winning pick.
    pub pick: Pick,
    /// Entry position in the owner's commitment list.
    pub commit_index: CommitIndex,
    /// Entry stake (the weight).
    pub stake: Amount,
    /// Amount awarded, dust included.
    pub amount: Amount,
}

/// Result for one tier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPayout {
    /// Tier.
    pub tier: Tier,
    /// Pool plus carry-in for this tier.
    pub distributable: Amount,
    /// Winning entries in reveal order. Empty when nobody qualified.
    pub winners: Vec<WinnerShare>,
}

impl TierPayout {
    /// Sum of all shares. Equals `distributable` when there are winners.
    pub fn paid(&self) -> Amount {
        self.winners.iter().fold(Amount::ZERO, |acc, w| acc + w.amount)
    }
}

/// Full breakdown of a settled round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSummary {
    /// Drawn number.
    pub winning_number: WinningNumber,
    /// Deposits of the round.
    pub total_deposits: Amount,
    /// Carry received at creation.
    pub carry_in: PoolCarry,
    /// Pools carved from this round's deposits, per tier.
    pub pools: [Amount; 3],
    /// Deposits left after the pools.
    pub fee: Amount,
    /// Empty-tier pools sent to the treasury.
    pub treasury_accrual: Amount,
    /// Amount handed to the next created round.
    pub carry_out: PoolCarry,
    /// Per-tier results, in [`Tier::ALL`] order.
    pub tiers: Vec<TierPayout>,
    /// Sum of all winner shares.
    pub total_payout: Amount,
}

impl SettlementSummary {
    /// Result for one tier.
    pub fn tier(&self, tier: Tier) -> Option<&TierPayout> {
        self.tiers.iter().find(|t| t.tier == tier)
    }

    /// Total owed to each player across tiers and entries, non-zero only.
    pub fn payouts_by_player(&self) -> LottoResult<BTreeMap<Address, Amount>> {
        let mut owed: BTreeMap<Address, Amount> = BTreeMap::new();
        for share in self.tiers.iter().flat_map(|t| t.winners.iter()) {
            let entry = owed.entry(share.player).or_default();
            *entry = entry.checked_add(share.amount).ok_or(LottoError::Overflow)?;
        }
        owed.retain(|_, amount| !amount.is_zero());
        Ok(owed)
    }

    /// Amount moved to the treasury at settlement.
    pub fn treasury_transfer(&self) -> LottoResult<Amount> {
        self.fee.checked_add(self.treasury_accrual).ok_or(LottoError::Overflow)
    }
}

/// What [`compute_settlement`] needs from a round.
#[derive(Clone, Copy, Debug)]
pub struct SettlementInput<'a> {
    /// Drawn number.
    pub winning_number: WinningNumber,
    /// Deposits of the round.
    pub total_deposits: Amount,
    /// Carry received at creation.
    pub carry_in: PoolCarry,
    /// Revealed entries in reveal order.
    pub reveals: &'a [Reveal],
}

// =============================================================================
// SPLIT
// =============================================================================

/// Compute the settlement of a round without touching any state.
pub fn compute_settlement(input: &SettlementInput<'_>, config: &LottoConfig) -> LottoResult<SettlementSummary> {
    let total = input.total_deposits;
    let pools = config.pool_bps.map(|bps| total.bps(bps));
    let pooled = Amount::checked_sum(pools).ok_or(LottoError::Overflow)?;
    let fee = total.checked_sub(pooled).ok_or(LottoError::Overflow)?;

    let carry_in = input.carry_in.as_array();
    let mut carry_out = [Amount::ZERO; 3];
    let mut treasury_accrual = Amount::ZERO;
    let mut tiers = Vec::with_capacity(Tier::ALL.len());

    for tier in Tier::ALL {
        let k = tier.index();
        let distributable = pools[k].checked_add(carry_in[k]).ok_or(LottoError::Overflow)?;

        let entries: Vec<&Reveal> = input
            .reveals
            .iter()
            .filter(|r| Tier::classify(r.pick, input.winning_number) == Some(tier))
            .collect();

        if entries.is_empty() {
            match (tier, config.empty_tier_policy) {
                (Tier::Exact, _) | (_, EmptyTierPolicy::CarryForward) => carry_out[k] = distributable,
                (_, EmptyTierPolicy::Treasury) => {
                    treasury_accrual = treasury_accrual
                        .checked_add(distributable)
                        .ok_or(LottoError::Overflow)?;
                }
            }
        }

        tiers.push(TierPayout {
            tier,
            distributable,
            winners: split_by_stake(distributable, &entries)?,
        });
    }

    let total_payout = Amount::checked_sum(tiers.iter().map(TierPayout::paid)).ok_or(LottoError::Overflow)?;

    Ok(SettlementSummary {
        winning_number: input.winning_number,
        total_deposits: total,
        carry_in: input.carry_in,
        pools,
        fee,
        treasury_accrual,
        carry_out: PoolCarry::from_array(carry_out),
        tiers,
        total_payout,
    })
}

/// Divide `amount` across `entries` by stake, rounding down, with the
/// remainder added to the first entry.
fn split_by_stake(amount: Amount, entries: &[&Reveal]) -> LottoResult<Vec<WinnerShare>> {
    let tier_stake = Amount::checked_sum(entries.iter().map(|r| r.stake)).ok_or(LottoError::Overflow)?;

    let mut shares: Vec<WinnerShare> = entries
        .iter()
        .map(|r| WinnerShare {
            player: r.player,
            pick: r.pick,
            commit_index: r.commit_index,
            stake: r.stake,
            amount: amount.mul_div(r.stake.micros(), tier_stake.micros()),
        })
        .collect();

    let paid = Amount::checked_sum(shares.iter().map(|s| s.amount)).ok_or(LottoError::Overflow)?;
    if let Some(first) = shares.first_mut() {
        first.amount = first
            .amount
            .checked_add(amount.saturating_sub(paid))
            .ok_or(LottoError::Overflow)?;
    }
    Ok(shares)
}

// =============================================================================
// SETTLE
// =============================================================================

impl<T: StakeToken, R, S> LottoEngine<T, R, S> {
    /// Settle a round whose randomness has been fulfilled.
    ///
    /// Publishes the winning number, records claims, sends the fee (plus any
    /// empty-tier accrual) to the treasury and queues carry-out for the next
    /// created round. Open to any caller.
    ///
    /// Before `reveal_time` a round settles only once every commitment has
    /// been opened, which lets rounds of direct entries settle at close.
    pub fn settle(&mut self, call: &Call, round_id: RoundId) -> LottoResult<SettlementSummary> {
        let record = self.record(round_id)?;
        let winning_number = record.round.hidden_result().ok_or(LottoError::NoResult)?;
        if record.round.settled() {
            return Err(LottoError::AlreadySettled);
        }
        let unrevealed = record.unrevealed_commitments();
        if unrevealed > 0 && call.now < record.round.reveal_time {
            debug!(round_id = %round_id, now = call.now, unrevealed, "settle rejected: reveal still open");
            return Err(LottoError::RevealStillOpen);
        }

        let summary = compute_settlement(
            &SettlementInput {
                winning_number,
                total_deposits: record.round.total_deposits,
                carry_in: record.round.carry_in,
                reveals: &record.reveals,
            },
            &self.config,
        )?;
        let owed = summary.payouts_by_player()?;
        let to_treasury = summary.treasury_transfer()?;
        let unresolved_carry = self
            .state
            .unresolved_carry
            .checked_add(&summary.carry_out)
            .ok_or(LottoError::Overflow)?;

        if !to_treasury.is_zero() {
            let engine = self.config.engine_address;
            let treasury = self.config.treasury;
            if let Err(e) = self.token.transfer(&engine, &treasury, to_treasury) {
                debug!(round_id = %round_id, error = %e, "settle rejected: treasury transfer");
                return Err(e.into());
            }
        }

        let record = self.record_mut(round_id)?;
        record.claims = owed
            .into_iter()
            .map(|(player, amount)| {
                (
                    player,
                    Claim {
                        round_id,
                        player,
                        amount,
                        claimed: false,
                    },
                )
            })
            .collect();
        record.round.settlement = Some(summary.clone());
        let claimants = record.claims.len();
        self.state.unresolved_carry = unresolved_carry;

        info!(
            round_id = %round_id,
            settled_by = %call.caller.short(),
            winning_number = winning_number.value(),
            fee = summary.fee.micros(),
            payout = summary.total_payout.micros(),
            carry_pool1 = summary.carry_out.pool1.micros(),
            claimants,
            "round settled"
        );
        self.emit(LottoEvent::Settled {
            round_id,
            winning_number,
            pools: summary.pools,
            fee: summary.fee,
            treasury_accrual: summary.treasury_accrual,
            total_payout: summary.total_payout,
            carry_out: summary.carry_out,
        });
        Ok(summary)
    }
}
