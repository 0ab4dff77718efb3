//! Randomness Coordinator
//!
//! One request per round, issued after close. The provider answers through
//! [`LottoEngine::fulfill_randomness`]; the word is reduced mod 1000 and
//! kept private until settlement.

use tracing::{debug, info, warn};

use crate::core::hash::Digest32;
use crate::core::ids::{Address, RandomWord, RequestId, RoundId};
use crate::engine::events::LottoEvent;
use crate::engine::store::DrawState;
use crate::engine::{Call, LottoEngine};
use crate::error::{LottoError, LottoResult};
use crate::external::randomness::{ProviderConfig, ProviderError, RandomnessProvider};

impl<T, R, S> LottoEngine<T, R, S> {
    /// Set or replace the randomness source. Admin only.
    pub fn configure_provider(
        &mut self,
        call: &Call,
        provider: Address,
        key_hash: Digest32,
        subscription_id: u64,
    ) -> LottoResult<()> {
        if call.caller != self.config.admin {
            return Err(LottoError::NotAdmin(call.caller));
        }

        self.state.provider = Some(ProviderConfig {
            provider,
            key_hash,
            subscription_id,
        });

        info!(provider = %provider, subscription_id, "randomness provider configured");
        self.emit(LottoEvent::ProviderConfigured {
            provider,
            key_hash,
            subscription_id,
        });
        Ok(())
    }

    /// Accept a word from the configured provider for a pending request.
    ///
    /// Each request is consumed by its first fulfillment; replays fail with
    /// [`LottoError::UnknownRequest`].
    pub fn fulfill_randomness(&mut self, call: &Call, request_id: RequestId, word: RandomWord) -> LottoResult<()> {
        let provider = self.state.provider.as_ref().map(|p| p.provider);
        if provider != Some(call.caller) {
            warn!(caller = %call.caller, "fulfillment from unauthorized caller");
            return Err(LottoError::UnauthorizedFulfiller(call.caller));
        }

        let round_id = *self
            .state
            .pending
            .get(&request_id)
            .ok_or(LottoError::UnknownRequest(request_id))?;

        let winning_number = word.winning_number();
        self.record_mut(round_id)?.round.draw = DrawState::Fulfilled {
            request_id,
            winning_number,
        };
        self.state.pending.remove(&request_id);

        info!(round_id = %round_id, request_id = %request_id, "randomness fulfilled");
        self.emit(LottoEvent::RandomnessFulfilled { round_id, request_id });
        Ok(())
    }
}

impl<T, R: RandomnessProvider, S> LottoEngine<T, R, S> {
    /// Request randomness for a round whose commit window has closed.
    pub fn close_and_request_random(&mut self, call: &Call, round_id: RoundId) -> LottoResult<RequestId> {
        {
            let round = &self.record(round_id)?.round;
            if call.now < round.close_time || round.drawn() {
                debug!(round_id = %round_id, now = call.now, drawn = round.drawn(), "request rejected: not closed");
                return Err(LottoError::NotClosed);
            }
        }

        let config = self.state.provider.clone().ok_or(LottoError::ProviderUnset)?;
        let request_id = self.provider.request_random_words(&config)?;
        if self.state.pending.contains_key(&request_id) {
            return Err(ProviderError::Rejected(format!("duplicate request id {request_id}")).into());
        }

        self.record_mut(round_id)?.round.draw = DrawState::Requested { request_id };
        self.state.pending.insert(request_id, round_id);

        info!(round_id = %round_id, request_id = %request_id, "randomness requested");
        self.emit(LottoEvent::RandomnessRequested { round_id, request_id });
        Ok(request_id)
    }
}
