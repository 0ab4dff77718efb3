//! Whole-engine scenarios: full rounds from creation to payout.

use crate::config::{EmptyTierPolicy, LottoConfig};
use crate::core::amount::Amount;
use crate::core::ids::{Address, Nonce, RandomWord, RoundId};
use crate::engine::{Call, LottoEngine, LottoEvent, Tier, WinningNumberView};
use crate::error::LottoError;
use crate::external::token::StakeToken;
use crate::proof::commitment::commitment_digest;
use crate::testing::{
    configure, config, draw, engine, engine_with, fund, SequentialProvider, TestEngine, TestSigner, ADMIN, ALICE,
    BOB, CAROL, ENGINE, PROVIDER, RELAYER, TREASURY,
};

const OPEN: u64 = 100;
const CLOSE: u64 = 200;
const REVEAL: u64 = 300;

fn new_round(e: &mut TestEngine) -> RoundId {
    e.create_round(&Call::new(ADMIN, 0), OPEN, CLOSE, REVEAL).unwrap()
}

/// Commit at `OPEN` and reveal at `CLOSE`, with nonce derived from the pick.
fn play(e: &mut TestEngine, round_id: RoundId, player: Address, pick: u16) {
    let nonce = Nonce::from(pick as u64 + 1_000);
    let index = e
        .commit_pick(&Call::new(player, OPEN), round_id, commitment_digest(pick, &nonce))
        .unwrap();
    e.reveal_pick(&Call::new(player, CLOSE), round_id, pick, nonce, index)
        .unwrap();
}

fn three_player_round() -> (TestEngine, RoundId) {
    let mut e = engine();
    configure(&mut e);
    let id = new_round(&mut e);
    for (player, pick) in [(ALICE, 123), (BOB, 223), (CAROL, 403)] {
        fund(&mut e, &player, 5);
        play(&mut e, id, player, pick);
    }
    (e, id)
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn test_one_winner_per_tier_pays_out() {
    let (mut e, id) = three_player_round();
    draw(&mut e, id, REVEAL, 123);
    let summary = e.settle(&Call::new(RELAYER, REVEAL), id).unwrap();

    assert_eq!(summary.fee, Amount::from_micros(1_500_000));
    assert_eq!(e.token().balance_of(&TREASURY), Amount::from_micros(1_500_000));

    assert_eq!(e.claim(&Call::new(ALICE, 400), id).unwrap(), Amount::from_micros(10_500_000));
    assert_eq!(e.claim(&Call::new(BOB, 400), id).unwrap(), Amount::from_micros(2_250_000));
    assert_eq!(e.claim(&Call::new(CAROL, 400), id).unwrap(), Amount::from_micros(750_000));

    assert_eq!(e.token().balance_of(&ENGINE), Amount::ZERO);
    assert_eq!(e.token().total_supply(), Amount::from_units(15));
}

#[test]
fn test_no_exact_match_rolls_into_next_round() {
    let mut e = engine();
    configure(&mut e);
    let first = new_round(&mut e);
    fund(&mut e, &ALICE, 10);
    play(&mut e, first, ALICE, 1);
    play(&mut e, first, ALICE, 2);

    draw(&mut e, first, REVEAL, 999);
    let summary = e.settle(&Call::new(RELAYER, REVEAL), first).unwrap();
    assert_eq!(summary.carry_out.pool1, Amount::from_units(7));
    assert_eq!(e.unresolved_carry().pool1, Amount::from_units(7));
    assert_eq!(e.token().balance_of(&ENGINE), Amount::from_units(7));

    let second = e.create_round(&Call::new(ADMIN, REVEAL), 400, 500, 600).unwrap();
    assert_eq!(e.round(second).unwrap().carry_in.pool1, Amount::from_units(7));
    assert!(e.unresolved_carry().is_empty());

    // Only the first round created afterwards receives the carry.
    let third = e.create_round(&Call::new(ADMIN, REVEAL), 400, 500, 600).unwrap();
    assert!(e.round(third).unwrap().carry_in.is_empty());

    fund(&mut e, &BOB, 5);
    let nonce = Nonce::from(77u64);
    e.commit_pick(&Call::new(BOB, 400), second, commitment_digest(555, &nonce))
        .unwrap();
    e.reveal_pick(&Call::new(BOB, 500), second, 555, nonce, 0).unwrap();
    draw(&mut e, second, 600, 555);
    e.settle(&Call::new(RELAYER, 600), second).unwrap();

    // 70% of 5.00 plus the 7.00 carried in.
    assert_eq!(e.claim(&Call::new(BOB, 700), second).unwrap(), Amount::from_micros(10_500_000));
}

#[test]
fn test_pick_bounds() {
    let mut e = engine();
    let id = new_round(&mut e);
    fund(&mut e, &ALICE, 10);

    let high = Nonce::from(1u64);
    let low = Nonce::from(2u64);
    e.commit_pick(&Call::new(ALICE, OPEN), id, commitment_digest(999, &high))
        .unwrap();
    e.commit_pick(&Call::new(ALICE, OPEN), id, commitment_digest(0, &low))
        .unwrap();

    assert!(matches!(
        e.reveal_pick(&Call::new(ALICE, CLOSE), id, 1000, high, 0),
        Err(LottoError::BadPick(1000))
    ));
    e.reveal_pick(&Call::new(ALICE, CLOSE), id, 999, high, 0).unwrap();
    e.reveal_pick(&Call::new(ALICE, CLOSE), id, 0, low, 1).unwrap();

    let picks: Vec<u16> = e.revealed_picks(id, &ALICE).unwrap().iter().map(|p| p.value()).collect();
    assert_eq!(picks, vec![999, 0]);
}

#[test]
fn test_settle_ordering() {
    let (mut e, id) = three_player_round();
    assert!(matches!(e.settle(&Call::new(RELAYER, REVEAL), id), Err(LottoError::NoResult)));

    e.close_and_request_random(&Call::new(RELAYER, REVEAL), id).unwrap();
    assert!(matches!(e.settle(&Call::new(RELAYER, REVEAL), id), Err(LottoError::NoResult)));

    e.fulfill_randomness(&Call::new(PROVIDER, REVEAL), crate::core::ids::RequestId(1), RandomWord::from(123u64))
        .unwrap();
    e.settle(&Call::new(RELAYER, REVEAL), id).unwrap();

    let err = e.settle(&Call::new(RELAYER, REVEAL), id).unwrap_err();
    assert!(matches!(err, LottoError::AlreadySettled));
    assert!(err.is_benign_retry_outcome());
}

// =============================================================================
// SECRECY AND FORFEITURE
// =============================================================================

#[test]
fn test_winning_number_hidden_until_settled() {
    let (mut e, id) = three_player_round();
    draw(&mut e, id, REVEAL, 123);

    let snapshot = e.round(id).unwrap();
    assert!(snapshot.drawn);
    assert_eq!(snapshot.winning_number, WinningNumberView::NotAvailable);
    assert!(e.settlement(id).unwrap().is_none());
    assert!(e.claim_of(id, &ALICE).unwrap().is_none());
    for event in e.take_events() {
        assert!(!matches!(event, LottoEvent::Settled { .. }));
    }

    e.settle(&Call::new(RELAYER, REVEAL), id).unwrap();
    let published = e.round(id).unwrap().winning_number;
    assert!(matches!(published, WinningNumberView::Published(n) if n.value() == 123));
}

#[test]
fn test_winning_number_zero_is_a_real_result() {
    let mut e = engine();
    configure(&mut e);
    let id = new_round(&mut e);
    fund(&mut e, &ALICE, 5);
    play(&mut e, id, ALICE, 0);

    e.close_and_request_random(&Call::new(RELAYER, CLOSE), id).unwrap();
    e.fulfill_randomness(&Call::new(PROVIDER, CLOSE), crate::core::ids::RequestId(1), RandomWord::from(5_000u64))
        .unwrap();
    let summary = e.settle(&Call::new(RELAYER, CLOSE), id).unwrap();

    assert_eq!(summary.winning_number.value(), 0);
    assert_eq!(summary.tier(Tier::Exact).unwrap().winners.len(), 1);
}

#[test]
fn test_unrevealed_commitment_forfeits() {
    let mut e = engine();
    configure(&mut e);
    let id = new_round(&mut e);
    fund(&mut e, &ALICE, 5);
    fund(&mut e, &BOB, 5);

    play(&mut e, id, ALICE, 500);
    e.commit_pick(&Call::new(BOB, OPEN), id, commitment_digest(500, &Nonce::from(3u64)))
        .unwrap();

    draw(&mut e, id, REVEAL, 500);
    let summary = e.settle(&Call::new(RELAYER, REVEAL), id).unwrap();

    assert_eq!(summary.total_deposits, Amount::from_units(10));
    assert!(e.claim_of(id, &BOB).unwrap().is_none());
    assert!(matches!(e.claim(&Call::new(BOB, 400), id), Err(LottoError::NothingToClaim)));
    assert_eq!(e.claim(&Call::new(ALICE, 400), id).unwrap(), Amount::from_units(7));
}

#[test]
fn test_settle_waits_for_open_commitments() {
    let mut e = engine();
    configure(&mut e);
    let id = new_round(&mut e);
    fund(&mut e, &ALICE, 5);
    let nonce = Nonce::from(9u64);
    e.commit_pick(&Call::new(ALICE, OPEN), id, commitment_digest(10, &nonce))
        .unwrap();

    draw(&mut e, id, CLOSE + 1, 10);
    let err = e.settle(&Call::new(BOB, CLOSE + 1), id).unwrap_err();
    assert!(matches!(err, LottoError::RevealStillOpen));
    assert_eq!(err.kind(), crate::error::ErrorKind::WindowViolation);
    assert!(!e.round(id).unwrap().settled);
    assert!(e.unresolved_carry().is_empty());

    e.reveal_pick(&Call::new(ALICE, CLOSE + 50), id, 10, nonce, 0)
        .unwrap();
    e.settle(&Call::new(BOB, CLOSE + 50), id).unwrap();
    assert_eq!(e.claim_of(id, &ALICE).unwrap().unwrap().amount, Amount::from_micros(3_500_000));
}

#[test]
fn test_settle_after_deadline_ignores_unrevealed() {
    let mut e = engine();
    configure(&mut e);
    let id = new_round(&mut e);
    fund(&mut e, &ALICE, 5);
    e.commit_pick(&Call::new(ALICE, OPEN), id, commitment_digest(10, &Nonce::from(9u64)))
        .unwrap();

    draw(&mut e, id, CLOSE, 10);
    assert!(matches!(
        e.settle(&Call::new(RELAYER, REVEAL - 1), id),
        Err(LottoError::RevealStillOpen)
    ));
    e.settle(&Call::new(RELAYER, REVEAL), id).unwrap();
    assert_eq!(e.unresolved_carry().pool1, Amount::from_micros(3_500_000));
}

#[test]
fn test_reveal_after_settlement_rejected() {
    let mut e = engine();
    configure(&mut e);
    let id = new_round(&mut e);
    fund(&mut e, &ALICE, 10);
    play(&mut e, id, ALICE, 10);
    let nonce = Nonce::from(9u64);
    e.commit_pick(&Call::new(ALICE, OPEN), id, commitment_digest(20, &nonce))
        .unwrap();

    draw(&mut e, id, REVEAL, 10);
    e.settle(&Call::new(RELAYER, REVEAL), id).unwrap();

    assert!(matches!(
        e.reveal_pick(&Call::new(ALICE, REVEAL), id, 20, nonce, 1),
        Err(LottoError::AlreadySettled)
    ));
}

// =============================================================================
// CLAIMS
// =============================================================================

#[test]
fn test_claim_is_idempotent() {
    let (mut e, id) = three_player_round();
    assert!(matches!(e.claim(&Call::new(ALICE, 250), id), Err(LottoError::NotSettled)));

    draw(&mut e, id, REVEAL, 123);
    e.settle(&Call::new(RELAYER, REVEAL), id).unwrap();

    e.claim(&Call::new(ALICE, 400), id).unwrap();
    assert!(e.claim_of(id, &ALICE).unwrap().unwrap().claimed);

    let err = e.claim(&Call::new(ALICE, 401), id).unwrap_err();
    assert!(matches!(err, LottoError::NothingToClaim));
    assert!(err.is_benign_retry_outcome());
    assert!(matches!(
        e.claim_for(&Call::new(RELAYER, 402), id, ALICE),
        Err(LottoError::NothingToClaim)
    ));
    assert_eq!(e.token().balance_of(&ALICE), Amount::from_micros(10_500_000));
}

#[test]
fn test_claim_for_pays_the_player() {
    let (mut e, id) = three_player_round();
    draw(&mut e, id, REVEAL, 123);
    e.settle(&Call::new(RELAYER, REVEAL), id).unwrap();
    e.take_events();

    assert_eq!(
        e.claim_for(&Call::new(RELAYER, 400), id, BOB).unwrap(),
        Amount::from_micros(2_250_000)
    );
    assert_eq!(e.token().balance_of(&BOB), Amount::from_micros(2_250_000));
    assert_eq!(e.token().balance_of(&RELAYER), Amount::ZERO);
    assert!(matches!(
        e.take_events().as_slice(),
        [LottoEvent::Claimed { player: BOB, triggered_by: RELAYER, .. }]
    ));
}

#[test]
fn test_failed_payout_keeps_claim_open() {
    let (mut e, id) = three_player_round();
    draw(&mut e, id, REVEAL, 123);
    e.settle(&Call::new(RELAYER, REVEAL), id).unwrap();

    e.token_mut().block(&CAROL);
    assert!(matches!(e.claim(&Call::new(CAROL, 400), id), Err(LottoError::Token(_))));
    assert!(!e.claim_of(id, &CAROL).unwrap().unwrap().claimed);

    e.token_mut().unblock(&CAROL);
    assert_eq!(e.claim(&Call::new(CAROL, 401), id).unwrap(), Amount::from_micros(750_000));
}

#[test]
fn test_failed_treasury_transfer_aborts_settle() {
    let (mut e, id) = three_player_round();
    draw(&mut e, id, REVEAL, 123);

    e.token_mut().block(&TREASURY);
    assert!(matches!(e.settle(&Call::new(RELAYER, REVEAL), id), Err(LottoError::Token(_))));
    assert!(!e.round(id).unwrap().settled);
    assert!(e.claim_of(id, &ALICE).unwrap().is_none());

    e.token_mut().unblock(&TREASURY);
    assert!(e.settle(&Call::new(RELAYER, REVEAL), id).is_ok());
}

// =============================================================================
// POLICY, LEGACY FLOW, PERSISTENCE
// =============================================================================

#[test]
fn test_carry_forward_policy_moves_empty_tiers() {
    let mut e = engine_with(LottoConfig {
        empty_tier_policy: EmptyTierPolicy::CarryForward,
        ..config()
    });
    configure(&mut e);
    let first = new_round(&mut e);
    fund(&mut e, &ALICE, 20);
    play(&mut e, first, ALICE, 1);
    play(&mut e, first, ALICE, 2);
    play(&mut e, first, ALICE, 3);
    play(&mut e, first, ALICE, 4);

    draw(&mut e, first, REVEAL, 999);
    e.settle(&Call::new(RELAYER, REVEAL), first).unwrap();

    assert_eq!(e.token().balance_of(&TREASURY), Amount::from_units(2));
    let second = e.create_round(&Call::new(ADMIN, REVEAL), 400, 500, 600).unwrap();
    assert_eq!(
        e.round(second).unwrap().carry_in.as_array(),
        [Amount::from_units(14), Amount::from_units(3), Amount::from_units(1)]
    );
}

#[test]
fn test_legacy_round_with_direct_entries() {
    let mut e = engine();
    configure(&mut e);
    let id = e.create_round_legacy(&Call::new(ADMIN, 0), OPEN, CLOSE).unwrap();
    fund(&mut e, &ALICE, 5);
    fund(&mut e, &BOB, 5);

    e.enter(&Call::new(ALICE, OPEN), id, 321).unwrap();
    e.enter(&Call::new(BOB, OPEN + 1), id, 21).unwrap();

    draw(&mut e, id, CLOSE, 321);
    e.settle(&Call::new(RELAYER, CLOSE), id).unwrap();

    assert_eq!(e.claim(&Call::new(ALICE, CLOSE), id).unwrap(), Amount::from_units(7));
    assert_eq!(e.claim(&Call::new(BOB, CLOSE), id).unwrap(), Amount::from_micros(1_500_000));
}

#[test]
fn test_state_survives_restore() {
    let (mut e, id) = three_player_round();
    e.close_and_request_random(&Call::new(RELAYER, REVEAL), id).unwrap();
    let bytes = e.export_state().unwrap();

    let mut restored = LottoEngine::restore(
        config(),
        &bytes,
        e.token().clone(),
        SequentialProvider::default(),
        TestSigner,
    )
    .unwrap();

    assert_eq!(restored.current_round_id(), Some(id));
    assert_eq!(restored.total_commitments(id).unwrap(), 3);
    assert_eq!(restored.pending_request(crate::core::ids::RequestId(1)), Some(id));

    restored
        .fulfill_randomness(&Call::new(PROVIDER, REVEAL), crate::core::ids::RequestId(1), RandomWord::from(123u64))
        .unwrap();
    restored.settle(&Call::new(RELAYER, REVEAL), id).unwrap();
    assert_eq!(
        restored.claim(&Call::new(ALICE, 400), id).unwrap(),
        Amount::from_micros(10_500_000)
    );
}

#[test]
fn test_invalid_config_is_rejected_up_front() {
    let bad = LottoConfig {
        fee_bps: 0,
        pool_bps: [8_000, 1_500, 1_500],
        ..config()
    };
    let created = LottoEngine::new(
        bad.clone(),
        crate::external::token::InMemoryToken::new(),
        SequentialProvider::default(),
        TestSigner,
    );
    assert!(matches!(
        created,
        Err(LottoError::Config(crate::config::ConfigError::BpsSum(11_000)))
    ));

    let bytes = engine().export_state().unwrap();
    let restored = LottoEngine::restore(
        bad,
        &bytes,
        crate::external::token::InMemoryToken::new(),
        SequentialProvider::default(),
        TestSigner,
    );
    assert!(matches!(restored, Err(LottoError::Config(_))));
}

#[test]
fn test_restore_rejects_garbage() {
    let result = LottoEngine::restore(
        config(),
        &[0xFF; 3],
        crate::external::token::InMemoryToken::new(),
        SequentialProvider::default(),
        TestSigner,
    );
    assert!(matches!(result, Err(LottoError::State(_))));
}

#[test]
fn test_event_log_follows_call_order() {
    let (mut e, id) = three_player_round();
    draw(&mut e, id, REVEAL, 123);
    e.settle(&Call::new(RELAYER, REVEAL), id).unwrap();

    let kinds: Vec<&'static str> = e
        .take_events()
        .iter()
        .map(|event| match event {
            LottoEvent::ProviderConfigured { .. } => "provider",
            LottoEvent::RoundCreated { .. } => "created",
            LottoEvent::Committed { .. } => "committed",
            LottoEvent::Entered { .. } => "entered",
            LottoEvent::Revealed { .. } => "revealed",
            LottoEvent::RandomnessRequested { .. } => "requested",
            LottoEvent::RandomnessFulfilled { .. } => "fulfilled",
            LottoEvent::Settled { .. } => "settled",
            LottoEvent::Claimed { .. } => "claimed",
        })
        .collect();

    assert_eq!(
        kinds,
        vec![
            "provider", "created", "committed", "revealed", "committed", "revealed", "committed", "revealed",
            "requested", "fulfilled", "settled",
        ]
    );
    assert!(e.take_events().is_empty());
}
