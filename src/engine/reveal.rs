//! Reveal Verifier
//!
//! Opens commitments during the reveal window. A reveal either comes from
//! the player directly or from a relayer carrying the player's signature
//! over a [`RevealAuthorization`].
//!
//! Check order (first failure wins, nothing is written on failure):
//!
//! ```text
//! round exists ─► not settled ─► reveal window ─► pick ≤ 999
//!   ─► signature (delegated only) ─► commitment unrevealed ─► digest match
//! ```

use tracing::{debug, info};

use crate::core::ids::{Address, CommitIndex, Nonce, Pick, RoundId};
use crate::engine::events::LottoEvent;
use crate::engine::store::Reveal;
use crate::engine::{Call, LottoEngine};
use crate::error::{LottoError, LottoResult};
use crate::external::signature::SignerRecovery;
use crate::proof::authorization::RevealAuthorization;
use crate::proof::commitment::verify_commitment;

impl<T, R, S> LottoEngine<T, R, S> {
    /// Reveal one of the caller's own commitments.
    pub fn reveal_pick(
        &mut self,
        call: &Call,
        round_id: RoundId,
        pick: u16,
        nonce: Nonce,
        commit_index: CommitIndex,
    ) -> LottoResult<()> {
        let pick = self.check_reveal_window(call, round_id, pick)?;
        self.open_commitment(round_id, call.caller, pick, &nonce, commit_index, None)
    }

    /// Round is known, unsettled and inside its reveal window, and the pick
    /// is in range.
    fn check_reveal_window(&self, call: &Call, round_id: RoundId, pick: u16) -> LottoResult<Pick> {
        let round = &self.record(round_id)?.round;
        if round.settled() {
            return Err(LottoError::AlreadySettled);
        }
        if !round.reveal_open(call.now) {
            debug!(round_id = %round_id, now = call.now, "reveal rejected: window");
            return Err(LottoError::RevealWindowViolation);
        }
        Pick::new(pick).ok_or(LottoError::BadPick(pick))
    }

    fn open_commitment(
        &mut self,
        round_id: RoundId,
        player: Address,
        pick: Pick,
        nonce: &Nonce,
        commit_index: CommitIndex,
        relayer: Option<Address>,
    ) -> LottoResult<()> {
        let record = self.record_mut(round_id)?;
        let commitment = record
            .commitments
            .get_mut(&player)
            .and_then(|list| list.get_mut(commit_index))
            .filter(|c| !c.revealed)
            .ok_or(LottoError::AlreadyRevealed)?;

        if !verify_commitment(&commitment.commitment_hash, pick, nonce) {
            debug!(round_id = %round_id, player = %player.short(), commit_index, "reveal rejected: digest mismatch");
            return Err(LottoError::InvalidReveal);
        }

        commitment.revealed = true;
        let stake = commitment.stake;
        record.reveals.push(Reveal {
            round_id,
            player,
            pick,
            stake,
            commit_index,
        });

        info!(
            round_id = %round_id,
            player = %player.short(),
            pick = pick.value(),
            commit_index,
            delegated = relayer.is_some(),
            "pick revealed"
        );
        self.emit(LottoEvent::Revealed {
            round_id,
            player,
            pick,
            commit_index,
            relayer,
        });
        Ok(())
    }
}

impl<T, R, S: SignerRecovery> LottoEngine<T, R, S> {
    /// Reveal on behalf of `player`, authorized by the player's signature
    /// over the [`RevealAuthorization`] digest for exactly this tuple.
    #[allow(clippy::too_many_arguments)]
    pub fn reveal_pick_for(
        &mut self,
        call: &Call,
        round_id: RoundId,
        player: Address,
        pick: u16,
        nonce: Nonce,
        commit_index: CommitIndex,
        signature: &[u8],
    ) -> LottoResult<()> {
        let checked = self.check_reveal_window(call, round_id, pick)?;

        let authorization = RevealAuthorization {
            engine: self.config.engine_address,
            chain_id: self.config.chain_id,
            round_id,
            player,
            pick,
            nonce,
            commit_index,
        };
        if self.signer.recover_signer(&authorization.digest(), signature) != Some(player) {
            debug!(round_id = %round_id, player = %player.short(), relayer = %call.caller.short(), "reveal rejected: signature");
            return Err(LottoError::BadSignature);
        }

        self.open_commitment(round_id, player, checked, &nonce, commit_index, Some(call.caller))
    }
}
