//! Test fixtures: well-known identities, a counting randomness provider, a
//! keyless signer and a ready-made engine.

use sha2::{Digest, Sha256};

use crate::config::LottoConfig;
use crate::core::amount::Amount;
use crate::core::hash::Digest32;
use crate::core::ids::{Address, RequestId, RoundId};
use crate::engine::{Call, LottoEngine};
use crate::external::randomness::{ProviderConfig, ProviderError, RandomnessProvider};
use crate::external::signature::SignerRecovery;
use crate::external::token::InMemoryToken;

pub const ADMIN: Address = Address::repeat_byte(0xAD);
pub const TREASURY: Address = Address::repeat_byte(0x7E);
pub const PROVIDER: Address = Address::repeat_byte(0xF0);
pub const ENGINE: Address = Address::repeat_byte(0xEE);
pub const RELAYER: Address = Address::repeat_byte(0x5E);
pub const ALICE: Address = Address::repeat_byte(0xA1);
pub const BOB: Address = Address::repeat_byte(0xB0);
pub const CAROL: Address = Address::repeat_byte(0xC0);

pub type TestEngine = LottoEngine<InMemoryToken, SequentialProvider, TestSigner>;

/// Install a test-writer subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Hands out request ids 1, 2, 3, ... and remembers every request.
/// [`SequentialProvider::reissue_next`] repeats the last id once.
#[derive(Debug, Default)]
pub struct SequentialProvider {
    issued: u64,
    fail_next: bool,
    reissue_next: bool,
    pub requests: Vec<ProviderConfig>,
}

impl SequentialProvider {
    /// Make the next request fail with an unfunded subscription.
    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }

    /// Make the next request hand out the previous id again.
    pub fn reissue_next(&mut self) {
        self.reissue_next = true;
    }
}

impl RandomnessProvider for SequentialProvider {
    fn request_random_words(&mut self, config: &ProviderConfig) -> Result<RequestId, ProviderError> {
        if std::mem::take(&mut self.fail_next) {
            return Err(ProviderError::SubscriptionUnfunded(config.subscription_id));
        }
        if !std::mem::take(&mut self.reissue_next) {
            self.issued += 1;
        }
        self.requests.push(config.clone());
        Ok(RequestId(self.issued))
    }
}

/// Signature = signer address (20 bytes) || SHA-256(signer || digest).
#[derive(Debug, Default, Clone, Copy)]
pub struct TestSigner;

fn mac(signer: &Address, digest: &Digest32) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update(signer.as_bytes());
    hasher.update(digest);
    hasher.finalize().into()
}

/// Produce a [`TestSigner`] signature.
pub fn sign(signer: &Address, digest: &Digest32) -> Vec<u8> {
    let mut signature = signer.as_bytes().to_vec();
    signature.extend_from_slice(&mac(signer, digest));
    signature
}

impl SignerRecovery for TestSigner {
    fn recover_signer(&self, digest: &Digest32, signature: &[u8]) -> Option<Address> {
        if signature.len() != 52 {
            return None;
        }
        let signer = Address::new(signature[..20].try_into().ok()?);
        (signature[20..] == mac(&signer, digest)).then_some(signer)
    }
}

pub fn config() -> LottoConfig {
    LottoConfig {
        engine_address: ENGINE,
        admin: ADMIN,
        treasury: TREASURY,
        ..LottoConfig::default()
    }
}

pub fn engine() -> TestEngine {
    engine_with(config())
}

pub fn engine_with(config: LottoConfig) -> TestEngine {
    init_tracing();
    LottoEngine::new(config, InMemoryToken::new(), SequentialProvider::default(), TestSigner).unwrap()
}

/// Mint `units` to `player` and approve the engine for all of it.
pub fn fund(engine: &mut TestEngine, player: &Address, units: u64) {
    let amount = Amount::from_units(units);
    engine.token_mut().mint(player, amount).unwrap();
    engine.token_mut().approve(player, &ENGINE, amount);
}

pub fn configure(engine: &mut TestEngine) {
    engine
        .configure_provider(&Call::new(ADMIN, 0), PROVIDER, [0x11; 32], 42)
        .unwrap();
}

/// Close, request and fulfill with a word that reduces to `winning`.
pub fn draw(engine: &mut TestEngine, round_id: RoundId, now: u64, winning: u16) {
    let request = engine
        .close_and_request_random(&Call::new(RELAYER, now), round_id)
        .unwrap();
    let word = crate::core::ids::RandomWord::from(7_000u64 + winning as u64);
    engine
        .fulfill_randomness(&Call::new(PROVIDER, now), request, word)
        .unwrap();
}
