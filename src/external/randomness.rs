//! Randomness Provider Interface
//!
//! The provider is an opaque request/callback service. The engine issues a
//! request and gets back a [`RequestId`]; some time later the provider
//! calls `fulfill_randomness` on the engine with that id and a 256-bit word.
//! Proof mechanics stay on the provider's side.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::hash::Digest32;
use crate::core::ids::{Address, RequestId};

/// Administrative configuration of the randomness source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Identity allowed to deliver fulfillments.
    pub provider: Address,
    /// Provider key material (key hash / lane selector).
    pub key_hash: Digest32,
    /// Billing subscription the request is charged to.
    pub subscription_id: u64,
}

/// Request failures reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Subscription cannot pay for the request.
    #[error("subscription {0} is not funded")]
    SubscriptionUnfunded(u64),

    /// Provider refused for another reason.
    #[error("provider rejected request: {0}")]
    Rejected(String),
}

/// Outbound half of the provider handshake.
pub trait RandomnessProvider {
    /// Issue one request for a random word. The id must be unique for the
    /// lifetime of the engine.
    fn request_random_words(&mut self, config: &ProviderConfig) -> Result<RequestId, ProviderError>;
}
