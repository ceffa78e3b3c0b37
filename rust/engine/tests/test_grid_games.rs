use arena_engine::game::Game;
use arena_engine::grid::{TicTacToe, TicTacToePlus};

#[test]
fn accepts_common_coordinate_formats() {
    for mv in ["(1,1)", "1, 1", "move to 1,1", "Action: 1,1"] {
        let mut game = TicTacToe::new();
        assert!(game.make_move(mv, "X"), "should accept {mv:?}");
        assert_eq!(game.board_state()[1][1], "X");
    }
}

#[test]
fn uses_the_last_numeric_pair_in_the_text() {
    let mut game = TicTacToe::new();
    let reasoning = "I considered (0,0) and (2,2), but I'll take the center.\naction: 1,1";
    assert!(game.make_move(reasoning, "X"));
    assert_eq!(game.board_state()[1][1], "X");
    assert_eq!(game.board_state()[0][0], " ");
}

#[test]
fn rejects_occupied_and_out_of_range_cells() {
    let mut game = TicTacToe::new();
    assert!(game.make_move("0,0", "X"));
    assert!(!game.make_move("0,0", "O"));
    assert!(!game.make_move("3,1", "O"));
    assert!(!game.make_move("0,9", "O"));
    assert!(!game.make_move("no coordinates here", "O"));
    assert!(!game.make_move("", "O"));
    // The rejected moves left the board untouched
    assert_eq!(game.board_state()[0][0], "X");
    assert_eq!(game.available_moves().len(), 8);
}

#[test]
fn x_wins_the_top_row() {
    let mut game = TicTacToe::new();
    // O never blocks row 0
    assert!(game.make_move("0,0", "X"));
    assert!(game.make_move("1,0", "O"));
    assert!(game.make_move("0,1", "X"));
    assert!(game.make_move("1,1", "O"));
    assert!(!game.is_game_over());
    assert!(game.make_move("0,2", "X"));

    assert!(game.is_game_over());
    assert_eq!(game.winner(), Some("X".to_string()));
}

#[test]
fn full_board_without_line_is_a_draw() {
    let mut game = TicTacToe::new();
    // X O X / X O O / O X X — no three in a row anywhere
    let moves = [
        ("0,0", "X"),
        ("0,1", "O"),
        ("0,2", "X"),
        ("1,0", "X"),
        ("1,1", "O"),
        ("1,2", "O"),
        ("2,0", "O"),
        ("2,1", "X"),
        ("2,2", "X"),
    ];
    for (mv, sym) in moves {
        assert!(game.make_move(mv, sym));
    }
    assert!(game.is_game_over());
    assert_eq!(game.winner(), None);
}

#[test]
fn connect5_needs_five_in_a_row() {
    let mut game = TicTacToePlus::new();
    for i in 0..4 {
        assert!(game.make_move(&format!("4,{i}"), "X"));
        assert!(game.make_move(&format!("8,{i}"), "O"));
    }
    // Four in a row is not enough
    assert!(!game.is_game_over());
    assert!(game.make_move("4,4", "X"));
    assert!(game.is_game_over());
    assert_eq!(game.winner(), Some("X".to_string()));
}

#[test]
fn state_text_shows_symbol_and_board() {
    let game = TicTacToe::new();
    let text = game.state_for_player(0);
    assert!(text.contains("'X'"));
    assert!(text.contains("Row 0"));
    let text = game.state_for_player(1);
    assert!(text.contains("'O'"));

    let plus = TicTacToePlus::new();
    assert!(plus.state_for_player(0).contains("Connect 5"));
}

#[test]
fn moves_after_game_over_are_rejected() {
    let mut game = TicTacToe::new();
    assert!(game.make_move("0,0", "X"));
    assert!(game.make_move("1,0", "O"));
    assert!(game.make_move("0,1", "X"));
    assert!(game.make_move("1,1", "O"));
    assert!(game.make_move("0,2", "X"));
    assert!(game.is_game_over());
    assert!(!game.make_move("2,2", "O"));
}
