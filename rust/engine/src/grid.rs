use crate::game::Game;

/// Shared board storage and win scanning for the grid games.
#[derive(Debug, Clone)]
struct GridBoard {
    size: usize,
    win_len: usize,
    cells: Vec<Vec<char>>,
    winner: Option<char>,
    over: bool,
}

impl GridBoard {
    fn new(size: usize, win_len: usize) -> Self {
        Self {
            size,
            win_len,
            cells: vec![vec![' '; size]; size],
            winner: None,
            over: false,
        }
    }

    /// Copy of the board as rows of one-character strings.
    fn snapshot(&self) -> serde_json::Value {
        let rows: Vec<Vec<String>> = self
            .cells
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect();
        serde_json::json!(rows)
    }

    fn open_cells(&self) -> Vec<String> {
        let mut moves = Vec::new();
        for r in 0..self.size {
            for c in 0..self.size {
                if self.cells[r][c] == ' ' {
                    moves.push(format!("{r},{c}"));
                }
            }
        }
        moves
    }

    fn place(&mut self, mv: &str, symbol: &str) -> bool {
        if self.over {
            return false;
        }
        let symbol = match symbol.chars().next() {
            Some(ch) => ch,
            None => return false,
        };
        let (r, c) = match last_numeric_pair(mv) {
            Some(pair) => pair,
            None => return false,
        };
        if r >= self.size || c >= self.size || self.cells[r][c] != ' ' {
            return false;
        }
        self.cells[r][c] = symbol;
        self.refresh_outcome();
        true
    }

    /// Scan rows, columns and both diagonals for a completed line; a full
    /// board with no line is a draw.
    fn refresh_outcome(&mut self) {
        let (s, w) = (self.size, self.win_len);
        for r in 0..s {
            for c in 0..s {
                let symbol = self.cells[r][c];
                if symbol == ' ' {
                    continue;
                }

                // Horizontal
                if c + w <= s && (0..w).all(|i| self.cells[r][c + i] == symbol) {
                    self.winner = Some(symbol);
                    self.over = true;
                    return;
                }
                // Vertical
                if r + w <= s && (0..w).all(|i| self.cells[r + i][c] == symbol) {
                    self.winner = Some(symbol);
                    self.over = true;
                    return;
                }
                // Diagonal (\)
                if r + w <= s && c + w <= s && (0..w).all(|i| self.cells[r + i][c + i] == symbol) {
                    self.winner = Some(symbol);
                    self.over = true;
                    return;
                }
                // Anti-diagonal (/)
                if r + 1 >= w && c + w <= s && (0..w).all(|i| self.cells[r - i][c + i] == symbol) {
                    self.winner = Some(symbol);
                    self.over = true;
                    return;
                }
            }
        }

        if self.cells.iter().all(|row| row.iter().all(|&c| c != ' ')) {
            self.over = true;
        }
    }

    fn render_rows(&self, sep: &str) -> String {
        let mut lines = Vec::with_capacity(self.size);
        for (i, row) in self.cells.iter().enumerate() {
            let vis: Vec<String> = row
                .iter()
                .map(|&c| if c == ' ' { "_".to_string() } else { c.to_string() })
                .collect();
            lines.push(format!("Row {i}: {}", vis.join(sep)));
        }
        lines.join("\n")
    }
}

/// Extract the last `row,col`-like numeric pair from free-form move text.
/// Accepts `(1,1)`, `1, 1`, `1 1`, and pairs embedded in prose; agents
/// often reason first and state the final move at the end.
fn last_numeric_pair(text: &str) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut result = None;
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let first_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let first_end = i;

        // One or more separators (whitespace and/or commas) between numbers
        let mut j = i;
        while j < bytes.len() && (bytes[j] == b',' || bytes[j].is_ascii_whitespace()) {
            j += 1;
        }
        if j == i || j >= bytes.len() || !bytes[j].is_ascii_digit() {
            continue;
        }
        let second_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }

        let first = text[first_start..first_end].parse::<usize>();
        let second = text[second_start..j].parse::<usize>();
        if let (Ok(r), Ok(c)) = (first, second) {
            result = Some((r, c));
        }
        // Non-overlapping: resume after the second number
        i = j;
    }
    result
}

/// Standard 3×3 Tic-Tac-Toe, three in a row in any orientation.
#[derive(Debug, Clone)]
pub struct TicTacToe {
    board: GridBoard,
}

impl TicTacToe {
    pub fn new() -> Self {
        Self {
            board: GridBoard::new(3, 3),
        }
    }
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for TicTacToe {
    fn board_state(&self) -> serde_json::Value {
        self.board.snapshot()
    }

    fn available_moves(&self) -> Vec<String> {
        self.board.open_cells()
    }

    fn make_move(&mut self, mv: &str, symbol: &str) -> bool {
        self.board.place(mv, symbol)
    }

    fn is_game_over(&self) -> bool {
        self.board.over
    }

    fn winner(&self) -> Option<String> {
        self.board.winner.map(|c| c.to_string())
    }

    fn state_for_player(&self, idx: usize) -> String {
        let symbol = if idx == 0 { "X" } else { "O" };
        format!(
            "You are playing as symbol: '{symbol}'.\n\
             This is a standard 3x3 Tic-Tac-Toe.\n\n\
             Current game state:\n{}\n\n\
             What is your next move? Please output coordinates in 'row,col' format (e.g. '1,1' for center).",
            self.board.render_rows(", ")
        )
    }
}

/// 9×9 Tic-Tac-Toe Plus: exactly five in a row wins.
#[derive(Debug, Clone)]
pub struct TicTacToePlus {
    board: GridBoard,
}

impl TicTacToePlus {
    pub fn new() -> Self {
        Self {
            board: GridBoard::new(9, 5),
        }
    }
}

impl Default for TicTacToePlus {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for TicTacToePlus {
    fn board_state(&self) -> serde_json::Value {
        self.board.snapshot()
    }

    fn available_moves(&self) -> Vec<String> {
        self.board.open_cells()
    }

    fn make_move(&mut self, mv: &str, symbol: &str) -> bool {
        self.board.place(mv, symbol)
    }

    fn is_game_over(&self) -> bool {
        self.board.over
    }

    fn winner(&self) -> Option<String> {
        self.board.winner.map(|c| c.to_string())
    }

    fn state_for_player(&self, idx: usize) -> String {
        let symbol = if idx == 0 { "X" } else { "O" };
        let header: Vec<String> = (0..self.board.size).map(|i| i.to_string()).collect();
        format!(
            "You are playing as symbol: '{symbol}'.\n\
             This is a 9x9 Tic-Tac-Toe Plus (Connect 5).\n\n\
             Current state (9x9 grid, coordinates 0-8):\n    {}\n{}\n\n\
             What is your next move? Please output coordinates in 'row,col' format.",
            header.join(" "),
            self.board.render_rows(" ")
        )
    }
}
