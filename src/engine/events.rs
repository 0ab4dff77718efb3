//! Engine Events
//!
//! Emitted by successful calls only, in call order. Relayers watch
//! `RandomnessFulfilled` to know when a round can be settled and `Settled`
//! to know who to pay.

use serde::{Deserialize, Serialize};

use crate::core::amount::Amount;
use crate::core::hash::Digest32;
use crate::core::ids::{Address, CommitIndex, Pick, RequestId, RoundId, Timestamp, WinningNumber};
use crate::engine::store::PoolCarry;

/// Engine event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LottoEvent {
    /// New round registered.
    RoundCreated {
        /// Assigned id.
        round_id: RoundId,
        /// First second commits are accepted.
        open_time: Timestamp,
        /// End of the commit window, start of the reveal window.
        close_time: Timestamp,
        /// End of the reveal window.
        reveal_time: Timestamp,
        /// Pools inherited from earlier rounds.
        carry_in: PoolCarry,
    },

    /// Hidden pick committed and stake pulled.
    Committed {
        /// Round entered.
        round_id: RoundId,
        /// Committing player.
        player: Address,
        /// Position in the player's commitment list.
        commit_index: CommitIndex,
        /// Digest of the hidden pick and nonce.
        commitment_hash: Digest32,
        /// Stake taken into custody.
        stake: Amount,
    },

    /// Public pick entered directly.
    Entered {
        /// Round entered.
        round_id: RoundId,
        /// Entering player.
        player: Address,
        /// Public pick.
        pick: Pick,
        /// Position in the player's commitment list.
        commit_index: CommitIndex,
        /// Stake taken into custody.
        stake: Amount,
    },

    /// Commitment opened. `relayer` is set for delegated reveals.
    Revealed {
        /// Round revealed in.
        round_id: RoundId,
        /// Owner of the commitment.
        player: Address,
        /// Opened pick.
        pick: Pick,
        /// Commitment that was opened.
        commit_index: CommitIndex,
        /// Submitter of a delegated reveal.
        relayer: Option<Address>,
    },

    /// Randomness source (re)configured.
    ProviderConfigured {
        /// Only identity allowed to fulfill.
        provider: Address,
        /// Provider key selector.
        key_hash: Digest32,
        /// Billing subscription.
        subscription_id: u64,
    },

    /// Randomness requested for a closed round.
    RandomnessRequested {
        /// Round being drawn.
        round_id: RoundId,
        /// Provider-issued id.
        request_id: RequestId,
    },

    /// Word delivered. The number stays private until settlement.
    RandomnessFulfilled {
        /// Round drawn.
        round_id: RoundId,
        /// Consumed request.
        request_id: RequestId,
    },

    /// Round settled.
    Settled {
        /// Round settled.
        round_id: RoundId,
        /// Published result.
        winning_number: WinningNumber,
        /// This round's tier pools, before carry-in.
        pools: [Amount; 3],
        /// Protocol fee sent to the treasury.
        fee: Amount,
        /// Empty-tier pools sent to the treasury.
        treasury_accrual: Amount,
        /// Sum of all claims recorded.
        total_payout: Amount,
        /// Pools queued for the next created round.
        carry_out: PoolCarry,
    },

    /// Prize paid out.
    Claimed {
        /// Round paid from.
        round_id: RoundId,
        /// Recipient.
        player: Address,
        /// Amount transferred.
        amount: Amount,
        /// Caller of `claim` or `claim_for`.
        triggered_by: Address,
    },
}

impl LottoEvent {
    /// Round the event concerns, if any.
    pub fn round_id(&self) -> Option<RoundId> {
        match self {
            Self::RoundCreated { round_id, .. }
            | Self::Committed { round_id, .. }
            | Self::Entered { round_id, .. }
            | Self::Revealed { round_id, .. }
            | Self::RandomnessRequested { round_id, .. }
            | Self::RandomnessFulfilled { round_id, .. }
            | Self::Settled { round_id, .. }
            | Self::Claimed { round_id, .. } => Some(*round_id),
            Self::ProviderConfigured { .. } => None,
        }
    }

    /// Serialize to JSON for external observers.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
