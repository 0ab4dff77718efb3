//! Round Registry
//!
//! Creates rounds with strictly increasing times and hands the pending carry
//! to each new round exactly once.

use tracing::{debug, info};

use crate::core::ids::{RoundId, Timestamp};
use crate::engine::events::LottoEvent;
use crate::engine::store::{PoolCarry, Round, RoundRecord};
use crate::engine::{Call, LottoEngine};
use crate::error::{LottoError, LottoResult};

impl<T, R, S> LottoEngine<T, R, S> {
    /// Register a round with an explicit reveal deadline.
    ///
    /// Requires `open_time < close_time < reveal_time` and
    /// `reveal_time >= now`. Open to any caller.
    pub fn create_round(
        &mut self,
        call: &Call,
        open_time: Timestamp,
        close_time: Timestamp,
        reveal_time: Timestamp,
    ) -> LottoResult<RoundId> {
        if close_time <= open_time || reveal_time <= close_time || reveal_time < call.now {
            debug!(open_time, close_time, reveal_time, now = call.now, "create_round rejected: bad times");
            return Err(LottoError::BadTimes);
        }

        let id = self.state.next_round_id;
        let carry_in = std::mem::replace(&mut self.state.unresolved_carry, PoolCarry::NONE);

        self.state
            .rounds
            .insert(id, RoundRecord::new(Round::new(id, open_time, close_time, reveal_time, carry_in)));
        self.state.next_round_id = id.next();

        info!(
            round_id = %id,
            open_time,
            close_time,
            reveal_time,
            carry_pool1 = carry_in.pool1.micros(),
            "round created"
        );
        self.emit(LottoEvent::RoundCreated {
            round_id: id,
            open_time,
            close_time,
            reveal_time,
            carry_in,
        });
        Ok(id)
    }

    /// Register a round whose reveal window lasts the configured legacy
    /// offset past `close_time`.
    pub fn create_round_legacy(
        &mut self,
        call: &Call,
        open_time: Timestamp,
        close_time: Timestamp,
    ) -> LottoResult<RoundId> {
        let reveal_time = close_time
            .checked_add(self.config.legacy_reveal_offset_secs)
            .ok_or(LottoError::BadTimes)?;
        self.create_round(call, open_time, close_time, reveal_time)
    }
}
