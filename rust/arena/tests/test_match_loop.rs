use std::time::Duration;

use arena_agents::{HumanAgent, ScriptedAgent};
use arena_engine::grid::TicTacToe;
use arena_match::{EventBus, Match, Player, UpdateEvent};

fn drain(sub: &mut arena_match::EventSubscription) -> Vec<UpdateEvent> {
    let mut events = Vec::new();
    while let Ok(ev) = sub.receiver.try_recv() {
        events.push(ev);
    }
    events
}

fn tictactoe_match(x_moves: &[&str], o_moves: &[&str], bus: EventBus) -> Match {
    let players = vec![
        Player::new("Alice", "X", Box::new(ScriptedAgent::new(x_moves.to_vec()))),
        Player::new("Bob", "O", Box::new(ScriptedAgent::new(o_moves.to_vec()))),
    ];
    Match::new(
        Box::new(TicTacToe::new()),
        players,
        "You are playing Tic-Tac-Toe.",
        bus,
    )
}

#[test]
fn x_wins_row_zero_against_a_non_blocking_opponent() {
    let bus = EventBus::new();
    let m = tictactoe_match(&["0,0", "0,1", "0,2"], &["1,0", "1,1"], bus.clone());
    let mut sub = bus.subscribe(m.id().to_string());

    let report = m.run();

    assert_eq!(report.winner.as_deref(), Some("Alice"));
    assert_eq!(report.winner_index, Some(0));
    assert!(report.error_by.is_none());
    assert_eq!(report.turns, 5);

    let events = drain(&mut sub);
    let last = events.last().expect("final event");
    assert!(last.game_over);
    assert_eq!(last.winner.as_deref(), Some("Alice"));
    assert_eq!(last.current_player, "System");

    // Per turn: one thinking event and one move event, plus the start and
    // game-over events
    assert_eq!(events.len(), 2 + 2 * 5);
    let thinking = events.iter().filter(|e| e.is_thinking).count();
    assert_eq!(thinking, 5);
}

#[test]
fn agents_may_reason_before_stating_the_move() {
    let bus = EventBus::new();
    let m = tictactoe_match(
        &[
            "The center is strongest.\naction: 1,1",
            "Now the corner.\naction: 0,0",
            "I block at (2,2)? No.\naction: 0,1",
            "Finishing the column.\naction: 2,1",
        ],
        &["0,2", "2,0", "2,2"],
        bus.clone(),
    );
    let mut sub = bus.subscribe(m.id().to_string());

    let report = m.run();
    assert_eq!(report.winner.as_deref(), Some("Alice"));

    let events = drain(&mut sub);
    let move_events: Vec<_> = events
        .iter()
        .filter(|e| e.raw_response.is_some() && !e.is_thinking)
        .collect();
    // The extracted action is what the message reports, and the verbose
    // content was promoted to thinking for display
    assert!(move_events[0].message.contains("played 1,1"));
    assert!(move_events[0].thinking.is_some());
    assert!(move_events[0].metrics.is_some());
}

#[test]
fn invalid_move_ends_match_crediting_the_opponent() {
    let bus = EventBus::new();
    // Bob repeats Alice's occupied cell on his first move
    let m = tictactoe_match(&["0,0", "0,1"], &["0,0"], bus.clone());
    let mut sub = bus.subscribe(m.id().to_string());

    let report = m.run();

    assert_eq!(report.winner.as_deref(), Some("Alice"));
    assert_eq!(report.error_by.as_deref(), Some("Bob"));
    assert_eq!(report.seats[1].invalid_moves, 1);
    assert_eq!(report.seats[0].invalid_moves, 0);

    let events = drain(&mut sub);
    let last = events.last().expect("final event");
    assert!(last.game_over);
    assert_eq!(last.error_by.as_deref(), Some("Bob"));
    assert_eq!(last.winner.as_deref(), Some("Alice"));
}

#[test]
fn exhausted_script_counts_as_invalid_and_ends_the_match() {
    let bus = EventBus::new();
    // Bob runs out of moves after one turn; his empty move is invalid
    let m = tictactoe_match(&["0,0", "1,1", "2,2"], &["0,1"], bus.clone());
    let report = m.run();
    assert_eq!(report.winner.as_deref(), Some("Alice"));
    assert_eq!(report.error_by.as_deref(), Some("Bob"));
}

#[test]
fn human_timeout_is_an_invalid_empty_move() {
    let bus = EventBus::new();
    let human = HumanAgent::with_timeout(Duration::from_millis(50));
    let players = vec![
        Player::new("Alice", "X", Box::new(ScriptedAgent::new(["0,0"]))),
        Player::new("Human", "O", Box::new(human)),
    ];
    let m = Match::new(
        Box::new(TicTacToe::new()),
        players,
        "You are playing Tic-Tac-Toe.",
        bus,
    );

    let report = m.run();
    // Nobody delivered a move, so the empty response loses the match
    assert_eq!(report.winner.as_deref(), Some("Alice"));
    assert_eq!(report.error_by.as_deref(), Some("Human"));
}

#[test]
fn human_moves_delivered_from_another_thread_are_played() {
    let bus = EventBus::new();
    let human = HumanAgent::with_timeout(Duration::from_secs(5));
    let handle = human.handle();
    let players = vec![
        Player::new("Alice", "X", Box::new(ScriptedAgent::new(["0,0", "0,1", "0,2"]))),
        Player::new("Human", "O", Box::new(human)),
    ];
    let m = Match::new(
        Box::new(TicTacToe::new()),
        players,
        "You are playing Tic-Tac-Toe.",
        bus,
    );

    let feeder = std::thread::spawn(move || {
        for mv in ["1,0", "1,1"] {
            std::thread::sleep(Duration::from_millis(100));
            handle.submit(mv);
        }
    });

    let report = m.run();
    feeder.join().expect("feeder thread");

    assert_eq!(report.winner.as_deref(), Some("Alice"));
    assert!(report.error_by.is_none());
    assert_eq!(report.turns, 5);
}

#[test]
fn draw_emits_no_winner() {
    let bus = EventBus::new();
    // X O X / X O O / O X X fills the board with no line
    let m = tictactoe_match(
        &["0,0", "0,2", "1,0", "2,1", "2,2"],
        &["0,1", "1,1", "1,2", "2,0"],
        bus.clone(),
    );
    let mut sub = bus.subscribe(m.id().to_string());

    let report = m.run();
    assert_eq!(report.winner, None);
    assert_eq!(report.winner_index, None);

    let events = drain(&mut sub);
    let last = events.last().expect("final event");
    assert!(last.game_over);
    assert_eq!(last.message, "Draw!");
}

#[test]
fn spawned_match_reports_through_its_handle() {
    let bus = EventBus::new();
    let m = tictactoe_match(&["0,0", "0,1", "0,2"], &["1,0", "1,1"], bus);
    let handle = m.spawn();
    let report = handle.join().expect("match thread");
    assert_eq!(report.winner.as_deref(), Some("Alice"));
}

#[test]
fn events_include_defensive_board_copies() {
    let bus = EventBus::new();
    let m = tictactoe_match(&["0,0", "0,1", "0,2"], &["1,0", "1,1"], bus.clone());
    let mut sub = bus.subscribe(m.id().to_string());
    m.run();

    let events = drain(&mut sub);
    // The start event's board must still show the empty grid, not the
    // final position
    assert_eq!(events[0].board[0][0], " ");
    assert_eq!(events.last().unwrap().board[0][0], "X");
}
