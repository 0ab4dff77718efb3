//! Commitment Ledger
//!
//! Records hidden picks during the commit window and pulls one stake per
//! commitment into custody. A player may commit any number of times; each
//! commitment is addressed later by its position in the player's list.

use tracing::{debug, info};

use crate::core::amount::Amount;
use crate::core::hash::{digest_hex, Digest32};
use crate::core::ids::{CommitIndex, Pick, RoundId};
use crate::engine::events::LottoEvent;
use crate::engine::store::{Commitment, Reveal};
use crate::engine::{Call, LottoEngine};
use crate::error::{LottoError, LottoResult};
use crate::external::token::StakeToken;
use crate::proof::commitment::public_entry_digest;

impl<T: StakeToken, R, S> LottoEngine<T, R, S> {
    /// Commit a hidden pick and pay the stake.
    ///
    /// The stake is pulled from the caller with the engine as spender, so the
    /// caller must have approved at least one stake beforehand.
    pub fn commit_pick(&mut self, call: &Call, round_id: RoundId, commitment_hash: Digest32) -> LottoResult<CommitIndex> {
        let stake = self.pull_stake(call, round_id)?;

        let record = self.record_mut(round_id)?;
        let list = record.commitments.entry(call.caller).or_default();
        let commit_index = list.len();
        list.push(Commitment {
            round_id,
            player: call.caller,
            commitment_hash,
            stake,
            revealed: false,
        });

        info!(
            round_id = %round_id,
            player = %call.caller.short(),
            commit_index,
            commitment = %digest_hex(&commitment_hash),
            total_deposits = record.round.total_deposits.micros(),
            "pick committed"
        );
        self.emit(LottoEvent::Committed {
            round_id,
            player: call.caller,
            commit_index,
            commitment_hash,
            stake,
        });
        Ok(commit_index)
    }

    /// Enter a public pick directly, without the commit/reveal handshake.
    ///
    /// Same window and stake as [`LottoEngine::commit_pick`]. The entry is
    /// recorded as an already-revealed commitment and joins settlement at once.
    pub fn enter(&mut self, call: &Call, round_id: RoundId, pick: u16) -> LottoResult<CommitIndex> {
        {
            let round = &self.record(round_id)?.round;
            if !round.commit_open(call.now) {
                debug!(round_id = %round_id, now = call.now, "enter rejected: window");
                return Err(LottoError::CommitWindowViolation);
            }
        }
        let pick = Pick::new(pick).ok_or(LottoError::BadPick(pick))?;
        let stake = self.pull_stake(call, round_id)?;

        let record = self.record_mut(round_id)?;
        let list = record.commitments.entry(call.caller).or_default();
        let commit_index = list.len();
        list.push(Commitment {
            round_id,
            player: call.caller,
            commitment_hash: public_entry_digest(pick),
            stake,
            revealed: true,
        });
        record.reveals.push(Reveal {
            round_id,
            player: call.caller,
            pick,
            stake,
            commit_index,
        });

        info!(
            round_id = %round_id,
            player = %call.caller.short(),
            pick = pick.value(),
            commit_index,
            "public entry"
        );
        self.emit(LottoEvent::Entered {
            round_id,
            player: call.caller,
            pick,
            commit_index,
            stake,
        });
        Ok(commit_index)
    }

    /// Check the commit window, move one stake into custody and book it on
    /// the round. Nothing is written if the transfer fails.
    fn pull_stake(&mut self, call: &Call, round_id: RoundId) -> LottoResult<Amount> {
        let stake = self.config.stake;
        let engine = self.config.engine_address;

        let new_total = {
            let round = &self.record(round_id)?.round;
            if !round.commit_open(call.now) {
                debug!(round_id = %round_id, now = call.now, "commit rejected: window");
                return Err(LottoError::CommitWindowViolation);
            }
            round.total_deposits.checked_add(stake).ok_or(LottoError::Overflow)?
        };

        if let Err(e) = self.token.transfer_from(&engine, &call.caller, &engine, stake) {
            debug!(round_id = %round_id, player = %call.caller.short(), error = %e, "stake pull failed");
            return Err(e.into());
        }

        self.record_mut(round_id)?.round.total_deposits = new_total;
        Ok(stake)
    }
}
