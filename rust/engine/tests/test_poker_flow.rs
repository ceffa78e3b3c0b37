use arena_engine::cards::{Card, Rank as R, Suit as S};
use arena_engine::game::Game;
use arena_engine::poker::{PokerConfig, PokerEngine, SeatStatus, Stage};

fn c(s: S, r: R) -> Card {
    Card { suit: s, rank: r }
}

fn names(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("Seat{i}")).collect()
}

fn engine(n: usize) -> PokerEngine {
    PokerEngine::new(names(n), PokerConfig::default(), Some(42)).unwrap()
}

fn total_chips(engine: &PokerEngine) -> u32 {
    engine.seats().iter().map(|s| s.chips).sum()
}

#[test]
fn blinds_are_posted_on_first_hand() {
    let engine = engine(4);
    assert_eq!(engine.stage(), Stage::Preflop);
    assert_eq!(engine.pot(), 75);
    assert_eq!(total_chips(&engine) + engine.pot(), 4000);
    // Every funded seat got exactly two hole cards
    for seat in engine.seats() {
        assert_eq!(seat.hole.len(), 2);
    }
    // Action opens on an active seat
    assert_eq!(
        engine.seats()[engine.current_idx()].status,
        SeatStatus::Active
    );
}

#[test]
fn chips_plus_pot_stay_constant_during_betting() {
    let mut engine = engine(3);
    let start = total_chips(&engine) + engine.pot();

    for mv in ["call", "call", "check", "raise 100", "call", "fold"] {
        assert!(engine.make_move(mv, ""), "move '{mv}' should be accepted");
        if engine.stage() != Stage::HandOver {
            assert_eq!(total_chips(&engine) + engine.pot(), start);
            // Accepted moves always leave the action on an active seat
            assert_eq!(
                engine.seats()[engine.current_idx()].status,
                SeatStatus::Active
            );
        }
    }
}

#[test]
fn illegal_moves_are_rejected_without_mutation() {
    let mut engine = engine(3);
    let pot_before = engine.pot();
    let actor = engine.current_idx();
    let chips_before = engine.seats()[actor].chips;

    // UTG faces the big blind, so checking is illegal
    assert!(!engine.make_move("check", ""));
    // Raise below the minimum raise
    assert!(!engine.make_move("raise 10", ""));
    // Raise the actor cannot afford
    assert!(!engine.make_move("raise 2000", ""));
    // Garbage and empty input
    assert!(!engine.make_move("banana", ""));
    assert!(!engine.make_move("", ""));
    assert!(!engine.make_move("raise lots", ""));

    assert_eq!(engine.pot(), pot_before);
    assert_eq!(engine.current_idx(), actor);
    assert_eq!(engine.seats()[actor].chips, chips_before);
}

#[test]
fn raise_reopens_action_for_other_seats() {
    let mut engine = engine(3);
    assert!(engine.make_move("call", ""));
    assert!(engine.make_move("call", ""));
    // Big blind raises; the two callers must act again
    assert!(engine.make_move("raise 100", ""));
    assert_eq!(engine.stage(), Stage::Preflop);
    let unacted = engine
        .seats()
        .iter()
        .filter(|s| s.status == SeatStatus::Active && !s.acted)
        .count();
    assert_eq!(unacted, 2);
}

#[test]
fn three_folds_award_pot_without_showdown() {
    let mut engine = engine(4);
    let bb_winner = {
        // With four seats the blinds sit one and two after the button; the
        // big blind is the last seat standing after three folds
        let d = engine.dealer_idx();
        (d + 2) % 4
    };

    assert!(engine.make_move("fold", ""));
    assert!(engine.make_move("fold", ""));
    assert!(engine.make_move("fold", ""));

    assert_eq!(engine.stage(), Stage::HandOver);
    assert!(engine.community_cards().is_empty());
    let result = engine.last_hand_result().expect("hand result");
    assert_eq!(result.winning_hand_name, "Opponents Folded");
    assert_eq!(result.pot, 75);
    assert_eq!(result.winner_indices, vec![bb_winner]);
    assert!(result.player_hands.is_empty());
    // Winner collected small blind + big blind
    assert_eq!(engine.seats()[bb_winner].chips, 1025);
    assert_eq!(total_chips(&engine), 4000);
    assert_eq!(engine.wins().get(&engine.seats()[bb_winner].name), Some(&1));
}

#[test]
fn all_in_call_runs_out_the_board() {
    let mut engine = engine(2);
    assert!(engine.make_move("allin", ""));
    assert!(engine.make_move("call", ""));

    assert_eq!(engine.stage(), Stage::HandOver);
    assert_eq!(engine.community_cards().len(), 5);
    let result = engine.last_hand_result().expect("hand result");
    assert_eq!(result.player_hands.len(), 2);
    assert!(!result.winners.is_empty());
    // Pot was even, so nothing is lost whether split or won outright
    assert_eq!(total_chips(&engine), 2000);
}

#[test]
fn split_pot_remainder_is_not_distributed() {
    let mut engine = engine(3);
    // UTG shoves, small blind folds (25 dead chips make the pot odd),
    // big blind calls all-in
    assert!(engine.make_move("allin", ""));
    assert!(engine.make_move("fold", ""));
    // A board that plays for everyone forces an exact tie
    engine.set_community_for_test(vec![
        c(S::Spades, R::Ten),
        c(S::Spades, R::Jack),
        c(S::Spades, R::Queen),
        c(S::Spades, R::King),
        c(S::Spades, R::Ace),
    ]);
    assert!(engine.make_move("call", ""));

    assert_eq!(engine.stage(), Stage::HandOver);
    let result = engine.last_hand_result().expect("hand result");
    assert_eq!(result.winners.len(), 2);
    assert_eq!(result.pot, 2025);
    assert_eq!(result.winning_hand_name, "Royal Flush");
    // 2025 // 2 = 1012 each; the odd chip vanishes
    for &w in &result.winner_indices {
        assert_eq!(engine.seats()[w].chips, 1012);
    }
    assert_eq!(total_chips(&engine), 2999);
}

#[test]
fn showdown_winner_takes_stacked_pot() {
    let mut engine = engine(2);
    let first = engine.current_idx();
    let second = (first + 1) % 2;
    assert!(engine.make_move("allin", ""));
    engine.set_hole_cards_for_test(first, vec![c(S::Hearts, R::Ace), c(S::Diamonds, R::Ace)]);
    engine.set_hole_cards_for_test(second, vec![c(S::Clubs, R::Seven), c(S::Diamonds, R::Two)]);
    engine.set_community_for_test(vec![
        c(S::Clubs, R::King),
        c(S::Diamonds, R::Queen),
        c(S::Hearts, R::Nine),
        c(S::Spades, R::Eight),
        c(S::Diamonds, R::Four),
    ]);
    assert!(engine.make_move("call", ""));

    assert_eq!(engine.stage(), Stage::HandOver);
    let result = engine.last_hand_result().expect("hand result");
    assert_eq!(result.winners, vec![engine.seats()[first].name.clone()]);
    assert_eq!(result.winning_hand_name, "Pair");
    assert_eq!(engine.seats()[first].chips, 2000);
    assert_eq!(engine.seats()[second].chips, 0);

    // One seat holds every chip: the game is over and they win the match
    assert!(engine.is_game_over());
    assert_eq!(engine.winner(), Some(engine.seats()[first].name.clone()));
    assert_eq!(engine.winner_idx(), Some(first));
}

#[test]
fn force_fold_advances_and_completes_round() {
    let mut engine = engine(4);
    let utg = engine.current_idx();
    engine.force_fold(utg);
    assert_eq!(engine.seats()[utg].status, SeatStatus::Folded);
    assert_ne!(engine.current_idx(), utg);
    assert_eq!(
        engine.seats()[engine.current_idx()].status,
        SeatStatus::Active
    );
}

#[test]
fn eliminated_seat_stays_out_of_future_hands() {
    let mut engine = engine(3);
    let victim = engine.current_idx();
    engine.eliminate_player(victim);
    assert_eq!(engine.seats()[victim].status, SeatStatus::Folded);

    // Finish the hand, then start the next one
    while engine.stage() != Stage::HandOver {
        let actor = engine.current_idx();
        if !engine.make_move("call", "") && !engine.make_move("check", "") {
            engine.force_fold(actor);
        }
    }
    engine.start_new_hand().unwrap();
    assert_eq!(engine.seats()[victim].status, SeatStatus::Out);
    assert!(engine.seats()[victim].hole.is_empty());
}

#[test]
fn next_hand_rotates_dealer_and_reposts_blinds() {
    let mut engine = engine(3);
    let first_dealer = engine.dealer_idx();

    assert!(engine.make_move("fold", ""));
    assert!(engine.make_move("fold", ""));
    assert_eq!(engine.stage(), Stage::HandOver);

    engine.start_new_hand().unwrap();
    assert_eq!(engine.stage(), Stage::Preflop);
    assert_ne!(engine.dealer_idx(), first_dealer);
    assert_eq!(engine.pot(), 75);
    assert!(engine.last_hand_result().is_none());
}

#[test]
fn board_snapshot_hides_live_hands_until_showdown() {
    let engine = PokerEngine::new(
        vec!["Human Player".to_string(), "Bot".to_string()],
        PokerConfig::default(),
        Some(7),
    )
    .unwrap();
    let board = engine.board_state();
    let players = board["players"].as_array().unwrap();
    // The single human sees its own cards; the live bot hand stays hidden
    assert!(players[0]["cards"].is_array());
    assert!(players[1]["cards"].is_null());
    assert_eq!(board["pot"], 75);
    assert_eq!(board["stage"], "PREFLOP");
}

#[test]
fn spectator_mode_reveals_all_hands() {
    let engine = engine(2);
    let board = engine.board_state();
    for player in board["players"].as_array().unwrap() {
        assert!(player["cards"].is_array());
    }
}
