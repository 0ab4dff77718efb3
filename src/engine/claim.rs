//! Claim Ledger
//!
//! Pays settled prizes out of custody. Each claim pays at most once; the
//! claimed flag is only set after the transfer succeeds.

use tracing::{debug, info};

use crate::core::amount::Amount;
use crate::core::ids::{Address, RoundId};
use crate::engine::events::LottoEvent;
use crate::engine::{Call, LottoEngine};
use crate::error::{LottoError, LottoResult};
use crate::external::token::StakeToken;

impl<T: StakeToken, R, S> LottoEngine<T, R, S> {
    /// Collect the caller's prize for a settled round.
    pub fn claim(&mut self, call: &Call, round_id: RoundId) -> LottoResult<Amount> {
        self.pay_claim(call, round_id, call.caller)
    }

    /// Pay `player`'s prize on their behalf. Funds always go to `player`.
    pub fn claim_for(&mut self, call: &Call, round_id: RoundId, player: Address) -> LottoResult<Amount> {
        self.pay_claim(call, round_id, player)
    }

    fn pay_claim(&mut self, call: &Call, round_id: RoundId, player: Address) -> LottoResult<Amount> {
        let record = self.record(round_id)?;
        if !record.round.settled() {
            return Err(LottoError::NotSettled);
        }
        let amount = record
            .claims
            .get(&player)
            .filter(|c| !c.claimed && !c.amount.is_zero())
            .map(|c| c.amount)
            .ok_or(LottoError::NothingToClaim)?;

        let engine = self.config.engine_address;
        if let Err(e) = self.token.transfer(&engine, &player, amount) {
            debug!(round_id = %round_id, player = %player.short(), error = %e, "claim transfer failed");
            return Err(e.into());
        }

        if let Some(claim) = self.record_mut(round_id)?.claims.get_mut(&player) {
            claim.claimed = true;
        }

        info!(
            round_id = %round_id,
            player = %player.short(),
            amount = amount.micros(),
            triggered_by = %call.caller.short(),
            "prize claimed"
        );
        self.emit(LottoEvent::Claimed {
            round_id,
            player,
            amount,
            triggered_by: call.caller,
        });
        Ok(amount)
    }
}
