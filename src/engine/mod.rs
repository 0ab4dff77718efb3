//! Lottery Engine
//!
//! Round-based commit/reveal lottery over three collaborators: a stake
//! token, a randomness provider and a signature-recovery primitive.
//!
//! ```text
//! create_round ─► commit_pick / enter ─► reveal_pick(_for)
//!                                              │
//!       claim(_for) ◄── settle ◄── fulfill ◄── close_and_request_random
//! ```
//!
//! Every mutating call takes a [`Call`] carrying the caller and the current
//! time, validates everything first, performs external transfers, and only
//! then writes state. A rejected call leaves the engine untouched.

pub mod claim;
pub mod commit;
pub mod events;
pub mod prize;
pub mod randomness;
pub mod registry;
pub mod reveal;
pub mod store;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::LottoConfig;
use crate::core::ids::{Address, CommitIndex, Pick, RequestId, RoundId, Timestamp};
use crate::error::{LottoError, LottoResult};
use crate::external::randomness::ProviderConfig;

pub use events::LottoEvent;
pub use prize::{compute_settlement, SettlementInput, SettlementSummary, Tier, TierPayout, WinnerShare};
pub use store::{Claim, Commitment, PoolCarry, Reveal, Round, RoundRecord, RoundSnapshot, WinningNumberView};

/// Caller context supplied by the execution environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Call {
    /// Authenticated identity making the call.
    pub caller: Address,
    /// Current time in seconds.
    pub now: Timestamp,
}

impl Call {
    /// Create a call context.
    pub const fn new(caller: Address, now: Timestamp) -> Self {
        Self { caller, now }
    }
}

/// Persistent engine state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LottoState {
    pub(crate) rounds: BTreeMap<RoundId, RoundRecord>,
    pub(crate) pending: BTreeMap<RequestId, RoundId>,
    pub(crate) unresolved_carry: PoolCarry,
    pub(crate) provider: Option<ProviderConfig>,
    pub(crate) next_round_id: RoundId,
}

impl Default for LottoState {
    fn default() -> Self {
        Self {
            rounds: BTreeMap::new(),
            pending: BTreeMap::new(),
            unresolved_carry: PoolCarry::NONE,
            provider: None,
            next_round_id: RoundId::FIRST,
        }
    }
}

impl LottoState {
    /// Encode with bincode.
    ///
    /// The encoding contains fulfilled-but-unsettled winning numbers, so it
    /// belongs in operator storage, not in anything players can read.
    pub fn to_bytes(&self) -> LottoResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| LottoError::State(e.to_string()))
    }

    /// Decode from bincode.
    pub fn from_bytes(data: &[u8]) -> LottoResult<Self> {
        bincode::deserialize(data).map_err(|e| LottoError::State(e.to_string()))
    }
}

/// The lottery engine.
pub struct LottoEngine<T, R, S> {
    config: LottoConfig,
    token: T,
    provider: R,
    signer: S,
    state: LottoState,
    events: Vec<LottoEvent>,
}

impl<T, R, S> LottoEngine<T, R, S> {
    /// Create an engine with empty state.
    ///
    /// Fails with [`LottoError::Config`] when the configuration does not
    /// validate, before any stake could be taken under it.
    pub fn new(config: LottoConfig, token: T, provider: R, signer: S) -> LottoResult<Self> {
        config.validate()?;
        info!(
            engine = %config.engine_address,
            chain_id = config.chain_id,
            stake = config.stake.micros(),
            "lotto engine created"
        );
        Ok(Self {
            config,
            token,
            provider,
            signer,
            state: LottoState::default(),
            events: Vec::new(),
        })
    }

    /// Rebuild an engine from bytes produced by [`LottoEngine::export_state`].
    pub fn restore(config: LottoConfig, state_bytes: &[u8], token: T, provider: R, signer: S) -> LottoResult<Self> {
        config.validate()?;
        let state = LottoState::from_bytes(state_bytes)?;
        info!(
            rounds = state.rounds.len(),
            pending = state.pending.len(),
            "lotto engine restored"
        );
        Ok(Self {
            config,
            token,
            provider,
            signer,
            state,
            events: Vec::new(),
        })
    }

    /// Encode the full engine state.
    pub fn export_state(&self) -> LottoResult<Vec<u8>> {
        self.state.to_bytes()
    }

    /// Engine configuration.
    pub fn config(&self) -> &LottoConfig {
        &self.config
    }

    /// Stake token.
    pub fn token(&self) -> &T {
        &self.token
    }

    /// Stake token, mutably (funding, approvals).
    pub fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }

    /// Randomness provider.
    pub fn provider(&self) -> &R {
        &self.provider
    }

    /// Randomness provider, mutably.
    pub fn provider_mut(&mut self) -> &mut R {
        &mut self.provider
    }

    /// Drain events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<LottoEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: LottoEvent) {
        self.events.push(event);
    }

    fn record(&self, round_id: RoundId) -> LottoResult<&RoundRecord> {
        self.state
            .rounds
            .get(&round_id)
            .ok_or(LottoError::UnknownRound(round_id))
    }

    fn record_mut(&mut self, round_id: RoundId) -> LottoResult<&mut RoundRecord> {
        self.state
            .rounds
            .get_mut(&round_id)
            .ok_or(LottoError::UnknownRound(round_id))
    }

    // =========================================================================
    // READ VIEWS
    // =========================================================================

    /// Public snapshot of a round.
    pub fn round(&self, round_id: RoundId) -> LottoResult<RoundSnapshot> {
        Ok(RoundSnapshot::from(&self.record(round_id)?.round))
    }

    /// Most recently created round.
    pub fn current_round_id(&self) -> Option<RoundId> {
        self.state.rounds.keys().next_back().copied()
    }

    /// A player's commitments in commit order.
    pub fn commitments(&self, round_id: RoundId, player: &Address) -> LottoResult<&[Commitment]> {
        Ok(self
            .record(round_id)?
            .commitments
            .get(player)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    /// Number of commitments a player made.
    pub fn commit_count(&self, round_id: RoundId, player: &Address) -> LottoResult<CommitIndex> {
        Ok(self.commitments(round_id, player)?.len())
    }

    /// Picks a player has revealed, in reveal order.
    pub fn revealed_picks(&self, round_id: RoundId, player: &Address) -> LottoResult<Vec<Pick>> {
        Ok(self.record(round_id)?.revealed_picks(player))
    }

    /// Commitments across all players.
    pub fn total_commitments(&self, round_id: RoundId) -> LottoResult<usize> {
        Ok(self.record(round_id)?.total_commitments())
    }

    /// All reveals in reveal order.
    pub fn reveals(&self, round_id: RoundId) -> LottoResult<&[Reveal]> {
        Ok(&self.record(round_id)?.reveals)
    }

    /// A player's claim, present only after settlement and only if non-zero.
    pub fn claim_of(&self, round_id: RoundId, player: &Address) -> LottoResult<Option<&Claim>> {
        Ok(self.record(round_id)?.claims.get(player))
    }

    /// Settlement breakdown, once settled.
    pub fn settlement(&self, round_id: RoundId) -> LottoResult<Option<&SettlementSummary>> {
        Ok(self.record(round_id)?.round.settlement())
    }

    /// Carry waiting for the next created round.
    pub fn unresolved_carry(&self) -> PoolCarry {
        self.state.unresolved_carry
    }

    /// Round a pending request belongs to.
    pub fn pending_request(&self, request_id: RequestId) -> Option<RoundId> {
        self.state.pending.get(&request_id).copied()
    }

    /// Current randomness configuration.
    pub fn provider_config(&self) -> Option<&ProviderConfig> {
        self.state.provider.as_ref()
    }
}
