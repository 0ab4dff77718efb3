//! External Collaborators
//!
//! Interfaces to the systems the engine consumes but does not own: the
//! stake token, the randomness provider and the signature primitive.

pub mod randomness;
pub mod signature;
pub mod token;

pub use randomness::{ProviderConfig, ProviderError, RandomnessProvider};
pub use signature::SignerRecovery;
pub use token::{InMemoryToken, StakeToken, TokenError};
