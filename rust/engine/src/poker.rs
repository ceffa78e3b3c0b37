use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::cards::{cards_to_text, Card};
use crate::deck::Deck;
use crate::errors::GameError;
use crate::game::Game;
use crate::hand::{evaluate_hand, HandScore};

/// Betting phases of a poker hand plus the terminal between-hands state.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    HandOver,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Preflop => "PREFLOP",
            Stage::Flop => "FLOP",
            Stage::Turn => "TURN",
            Stage::River => "RIVER",
            Stage::Showdown => "SHOWDOWN",
            Stage::HandOver => "HAND_OVER",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Active,
    Folded,
    AllIn,
    Out,
}

/// One seat at the table. Owned exclusively by [`PokerEngine`]; per-hand
/// fields reset on every `start_new_hand`, chips and elimination persist.
#[derive(Debug, Clone)]
pub struct Seat {
    pub name: String,
    pub chips: u32,
    pub hole: Vec<Card>,
    pub status: SeatStatus,
    pub round_bet: u32,
    pub total_bet: u32,
    pub acted: bool,
    pub eliminated: bool,
    /// (category value, kickers) recorded at showdown.
    pub hand_rank: Option<(u8, Vec<u8>)>,
}

impl Seat {
    fn new(name: String, chips: u32) -> Self {
        Self {
            name,
            chips,
            hole: Vec::new(),
            status: SeatStatus::Active,
            round_bet: 0,
            total_bet: 0,
            acted: false,
            eliminated: false,
            hand_rank: None,
        }
    }

    fn is_live(&self) -> bool {
        matches!(self.status, SeatStatus::Active | SeatStatus::AllIn)
    }
}

/// Outcome summary of a finished hand, kept for the hand-summary event and
/// the board snapshot until the next hand starts.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandResult {
    pub winners: Vec<String>,
    pub winner_indices: Vec<usize>,
    pub pot: u32,
    pub community_cards: Vec<String>,
    pub winning_cards: Vec<String>,
    pub winning_kickers: Vec<String>,
    pub winning_hand_name: String,
    pub player_hands: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PokerConfig {
    pub starting_chips: u32,
    pub small_blind: u32,
    pub big_blind: u32,
}

impl Default for PokerConfig {
    fn default() -> Self {
        Self {
            starting_chips: 1000,
            small_blind: 25,
            big_blind: 50,
        }
    }
}

/// No-Limit Hold'em table for 2–23 seats: betting rounds, blinds,
/// elimination, and hand resolution via the evaluator.
///
/// Pot splitting uses integer floor division with no side-pot mechanism
/// for unequal all-in stacks; the remainder of a split pot is not
/// distributed.
#[derive(Debug)]
pub struct PokerEngine {
    seats: Vec<Seat>,
    deck: Deck,
    community: Vec<Card>,
    pot: u32,
    stage: Stage,
    dealer_idx: usize,
    current_idx: usize,
    small_blind: u32,
    big_blind: u32,
    min_raise: u32,
    last_raiser_idx: Option<usize>,
    last_hand_result: Option<HandResult>,
    wins: BTreeMap<String, u32>,
}

impl PokerEngine {
    pub fn new(
        names: Vec<String>,
        config: PokerConfig,
        seed: Option<u64>,
    ) -> Result<Self, GameError> {
        if names.len() < 2 {
            return Err(GameError::NotEnoughPlayers(names.len()));
        }
        if names.len() > 23 {
            return Err(GameError::TooManyPlayers(names.len()));
        }

        let mut rng = match seed {
            Some(s) => ChaCha20Rng::seed_from_u64(s),
            None => ChaCha20Rng::from_os_rng(),
        };
        // Pick a random starting dealer; start_new_hand rotates forward, so
        // park the button one seat behind the target.
        let n = names.len();
        let target_dealer = rng.random_range(0..n);
        let dealer_idx = (target_dealer + n - 1) % n;

        let wins = names.iter().map(|name| (name.clone(), 0)).collect();
        let seats = names
            .into_iter()
            .map(|name| Seat::new(name, config.starting_chips))
            .collect();

        let mut engine = Self {
            seats,
            deck: Deck::with_rng(rng),
            community: Vec::new(),
            pot: 0,
            stage: Stage::Preflop,
            dealer_idx,
            current_idx: 0,
            small_blind: config.small_blind,
            big_blind: config.big_blind,
            min_raise: config.big_blind,
            last_raiser_idx: None,
            last_hand_result: None,
            wins,
        };
        engine.start_new_hand()?;
        Ok(engine)
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn pot(&self) -> u32 {
        self.pot
    }

    pub fn current_idx(&self) -> usize {
        self.current_idx
    }

    pub fn set_current_idx(&mut self, idx: usize) {
        if idx < self.seats.len() {
            self.current_idx = idx;
        }
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn community_cards(&self) -> &[Card] {
        &self.community
    }

    pub fn last_hand_result(&self) -> Option<&HandResult> {
        self.last_hand_result.as_ref()
    }

    pub fn dealer_idx(&self) -> usize {
        self.dealer_idx
    }

    pub fn big_blind(&self) -> u32 {
        self.big_blind
    }

    /// Seat of the last aggressive action (bet, raise, qualifying all-in)
    /// this round; the big blind at the start of a hand.
    pub fn last_raiser_idx(&self) -> Option<usize> {
        self.last_raiser_idx
    }

    pub fn wins(&self) -> &BTreeMap<String, u32> {
        &self.wins
    }

    /// Test hook: overwrite a seat's hole cards for a scripted showdown.
    pub fn set_hole_cards_for_test(&mut self, idx: usize, cards: Vec<Card>) {
        if let Some(seat) = self.seats.get_mut(idx) {
            seat.hole = cards;
        }
    }

    /// Test hook: overwrite the community cards for a scripted showdown.
    pub fn set_community_for_test(&mut self, cards: Vec<Card>) {
        self.community = cards;
    }

    /// Prepare the next hand: reshuffle, rotate the button to the next
    /// seat still holding chips, deal hole cards, post blinds, and seat
    /// the action on the first active player after the big blind.
    pub fn start_new_hand(&mut self) -> Result<(), GameError> {
        self.deck.reset();
        self.community.clear();
        self.pot = 0;
        self.stage = Stage::Preflop;
        self.last_hand_result = None;

        self.dealer_idx = self.next_funded_seat(self.dealer_idx);

        for seat in &mut self.seats {
            seat.round_bet = 0;
            seat.total_bet = 0;
            seat.acted = false;
            seat.hand_rank = None;
            if seat.chips > 0 && !seat.eliminated {
                seat.status = SeatStatus::Active;
            } else {
                seat.status = SeatStatus::Out;
                seat.hole.clear();
            }
        }
        for idx in 0..self.seats.len() {
            if self.seats[idx].status == SeatStatus::Active {
                self.seats[idx].hole = self.deck.deal(2)?;
            }
        }

        let sb_idx = self.next_active_seat(self.dealer_idx);
        let bb_idx = self.next_active_seat(sb_idx);
        tracing::debug!(
            dealer = self.dealer_idx,
            sb = sb_idx,
            bb = bb_idx,
            "posting blinds"
        );
        self.post_blind(sb_idx, self.small_blind);
        self.post_blind(bb_idx, self.big_blind);

        self.current_idx = self.next_active_seat(bb_idx);
        self.last_raiser_idx = Some(bb_idx);
        self.min_raise = self.big_blind;
        tracing::debug!(current = self.current_idx, "hand started, action on UTG");
        Ok(())
    }

    /// Force the acting seat to fold. Used by the orchestrator when an
    /// agent produced an unusable move.
    pub fn force_fold(&mut self, idx: usize) {
        if idx >= self.seats.len() {
            return;
        }
        self.seats[idx].status = SeatStatus::Folded;
        self.advance_current_from(idx);
        self.check_round_completion();
    }

    /// Permanently remove a seat from play: folded for this hand, excluded
    /// from all future deals.
    pub fn eliminate_player(&mut self, idx: usize) {
        if idx >= self.seats.len() {
            return;
        }
        self.seats[idx].status = SeatStatus::Folded;
        self.seats[idx].eliminated = true;
        self.advance_current_from(idx);
        self.check_round_completion();
    }

    pub fn winner_idx(&self) -> Option<usize> {
        if !self.is_game_over() {
            return None;
        }
        self.seats
            .iter()
            .enumerate()
            .max_by_key(|(_, s)| s.chips)
            .map(|(i, _)| i)
    }

    fn next_active_seat(&self, start: usize) -> usize {
        let n = self.seats.len();
        for i in 1..=n {
            let idx = (start + i) % n;
            if self.seats[idx].status == SeatStatus::Active {
                return idx;
            }
        }
        start
    }

    fn next_funded_seat(&self, start: usize) -> usize {
        let n = self.seats.len();
        for i in 1..=n {
            let idx = (start + i) % n;
            if self.seats[idx].chips > 0 && !self.seats[idx].eliminated {
                return idx;
            }
        }
        start
    }

    fn post_blind(&mut self, idx: usize, amount: u32) {
        let actual = self.seats[idx].chips.min(amount);
        self.bet_chips(idx, actual);
        if self.seats[idx].chips == 0 {
            self.seats[idx].status = SeatStatus::AllIn;
        }
    }

    fn bet_chips(&mut self, idx: usize, amount: u32) {
        let seat = &mut self.seats[idx];
        seat.chips -= amount;
        seat.round_bet += amount;
        seat.total_bet += amount;
        self.pot += amount;
    }

    fn current_max_bet(&self) -> u32 {
        self.seats
            .iter()
            .filter(|s| s.is_live())
            .map(|s| s.round_bet)
            .max()
            .unwrap_or(0)
    }

    fn advance_current_from(&mut self, idx: usize) {
        let n = self.seats.len();
        for i in 1..=n {
            let next = (idx + i) % n;
            if self.seats[next].status == SeatStatus::Active {
                self.current_idx = next;
                return;
            }
        }
    }

    fn reopen_action(&mut self, raiser: usize) {
        self.last_raiser_idx = Some(raiser);
        for (i, seat) in self.seats.iter_mut().enumerate() {
            if i != raiser && seat.status == SeatStatus::Active {
                seat.acted = false;
            }
        }
    }

    fn check_round_completion(&mut self) {
        let live: Vec<usize> = (0..self.seats.len())
            .filter(|&i| self.seats[i].is_live())
            .collect();

        // A single surviving seat takes the pot without a showdown
        if live.len() == 1 {
            let w = live[0];
            self.seats[w].chips += self.pot;
            let name = self.seats[w].name.clone();
            *self.wins.entry(name.clone()).or_insert(0) += 1;
            self.last_hand_result = Some(HandResult {
                winners: vec![name],
                winner_indices: vec![w],
                pot: self.pot,
                community_cards: self.community.iter().map(|c| c.to_string()).collect(),
                winning_cards: Vec::new(),
                winning_kickers: Vec::new(),
                winning_hand_name: "Opponents Folded".to_string(),
                player_hands: BTreeMap::new(),
            });
            self.stage = Stage::HandOver;
            return;
        }

        let active_count = self
            .seats
            .iter()
            .filter(|s| s.status == SeatStatus::Active)
            .count();

        // Everyone remaining is all-in: run the board out and show down
        if active_count == 0 {
            self.run_out_board();
            return;
        }

        let max_bet = self.current_max_bet();
        let round_done = self
            .seats
            .iter()
            .filter(|s| s.status == SeatStatus::Active)
            .all(|s| s.round_bet == max_bet && s.acted);
        if round_done {
            self.next_stage();
        }
    }

    fn next_stage(&mut self) {
        for seat in &mut self.seats {
            seat.round_bet = 0;
            seat.acted = false;
        }

        let next = match self.stage {
            Stage::Preflop => Stage::Flop,
            Stage::Flop => Stage::Turn,
            Stage::Turn => Stage::River,
            Stage::River => Stage::Showdown,
            Stage::Showdown | Stage::HandOver => {
                self.resolve_hand();
                return;
            }
        };
        self.stage = next;
        tracing::debug!(stage = next.as_str(), "stage advanced");

        match next {
            Stage::Flop => self.deal_community(3),
            Stage::Turn | Stage::River => self.deal_community(1),
            Stage::Showdown => {
                self.resolve_hand();
                return;
            }
            _ => {}
        }

        // Post-flop action starts at the first active seat after the button
        self.min_raise = self.big_blind;
        self.advance_current_from(self.dealer_idx);
    }

    fn deal_community(&mut self, n: usize) {
        // Deck size is validated at construction; a 52-card deck always
        // covers hole cards plus the full board.
        if let Ok(cards) = self.deck.deal(n) {
            self.community.extend(cards);
        }
    }

    fn run_out_board(&mut self) {
        let missing = 5usize.saturating_sub(self.community.len());
        self.deal_community(missing);
        self.stage = Stage::Showdown;
        self.resolve_hand();
    }

    fn resolve_hand(&mut self) {
        let contestants: Vec<usize> = (0..self.seats.len())
            .filter(|&i| self.seats[i].is_live())
            .collect();
        if contestants.is_empty() {
            return;
        }

        let mut winners: Vec<usize> = Vec::new();
        let mut best: Option<HandScore> = None;

        if contestants.len() == 1 {
            winners.push(contestants[0]);
            self.seats[contestants[0]].chips += self.pot;
            let name = self.seats[contestants[0]].name.clone();
            *self.wins.entry(name).or_insert(0) += 1;
        } else {
            for &i in &contestants {
                let mut full = self.seats[i].hole.clone();
                full.extend_from_slice(&self.community);
                let score = evaluate_hand(&full);
                self.seats[i].hand_rank =
                    Some((score.category as u8, score.kickers.clone()));

                match &best {
                    None => {
                        best = Some(score);
                        winners = vec![i];
                    }
                    Some(b) => {
                        if score > *b {
                            best = Some(score);
                            winners = vec![i];
                        } else if score == *b {
                            winners.push(i);
                        }
                    }
                }
            }

            // Floor division split; the remainder is deliberately lost
            let share = self.pot / winners.len() as u32;
            for &w in &winners {
                self.seats[w].chips += share;
                let name = self.seats[w].name.clone();
                *self.wins.entry(name).or_insert(0) += 1;
            }
        }

        let (winning_cards, winning_kickers, winning_hand_name) = match &best {
            Some(score) => (
                score.core.iter().map(|c| c.to_string()).collect(),
                if winners.len() > 1 {
                    score.spare.iter().map(|c| c.to_string()).collect()
                } else {
                    Vec::new()
                },
                score.category.label().to_string(),
            ),
            None => (Vec::new(), Vec::new(), String::new()),
        };

        self.last_hand_result = Some(HandResult {
            winners: winners
                .iter()
                .map(|&w| self.seats[w].name.clone())
                .collect(),
            winner_indices: winners,
            pot: self.pot,
            community_cards: self.community.iter().map(|c| c.to_string()).collect(),
            winning_cards,
            winning_kickers,
            winning_hand_name,
            player_hands: contestants
                .iter()
                .map(|&i| {
                    (
                        self.seats[i].name.clone(),
                        self.seats[i].hole.iter().map(|c| c.to_string()).collect(),
                    )
                })
                .collect(),
        });
        self.stage = Stage::HandOver;
    }

    fn render_state_text(&self, viewer: usize) -> String {
        let n = self.seats.len();
        let sb_idx = (self.dealer_idx + 1) % n;
        let bb_idx = (self.dealer_idx + 2) % n;

        let mut txt = String::new();
        if let Some(seat) = self.seats.get(viewer) {
            txt.push_str(&format!("You are playing as: **{}**\n\n", seat.name));
        }
        txt.push_str(&format!("### Poker Table (Stage: {})\n", self.stage.as_str()));
        txt.push_str(&format!(
            "- **Blinds:** Small Blind: `{}` | Big Blind: `{}`\n",
            self.small_blind, self.big_blind
        ));
        txt.push_str(&format!("- **Total Pot:** {}\n", self.pot));
        txt.push_str(&format!(
            "- **Community Cards:** {}\n\n",
            cards_to_text(&self.community)
        ));

        txt.push_str("### Players Status:\n");
        for (i, seat) in self.seats.iter().enumerate() {
            let mut roles = Vec::new();
            if i == self.dealer_idx {
                roles.push("DEALER");
            }
            if i == sb_idx {
                roles.push("SMALL BLIND");
            }
            if i == bb_idx {
                roles.push("BIG BLIND");
            }
            let role_str = if roles.is_empty() {
                String::new()
            } else {
                format!(" **[{}]**", roles.join(", "))
            };

            txt.push_str(&format!("- **{}**{}\n", seat.name, role_str));
            txt.push_str(&format!(
                "  - Chips: `{}` | Current Bet: `{}` | Status: `{}`\n",
                seat.chips,
                seat.round_bet,
                status_str(seat.status)
            ));
            if i == viewer {
                txt.push_str(&format!(
                    "  - **YOUR HAND:** {}\n",
                    cards_to_text(&seat.hole)
                ));
            }
        }

        txt.push_str("\n**What is your next move?**");
        txt
    }
}

fn status_str(status: SeatStatus) -> &'static str {
    match status {
        SeatStatus::Active => "active",
        SeatStatus::Folded => "folded",
        SeatStatus::AllIn => "allin",
        SeatStatus::Out => "out",
    }
}

impl Game for PokerEngine {
    fn board_state(&self) -> serde_json::Value {
        let has_human = self
            .seats
            .iter()
            .any(|s| s.name.to_lowercase().contains("human"));
        let human_count = self
            .seats
            .iter()
            .filter(|s| s.name.to_lowercase().contains("human"))
            .count();

        let players: Vec<serde_json::Value> = self
            .seats
            .iter()
            .enumerate()
            .map(|(i, seat)| {
                let is_human_seat = seat.name.to_lowercase().contains("human");
                let show_cards = matches!(self.stage, Stage::Showdown | Stage::HandOver)
                    || seat.status == SeatStatus::Folded
                    // Spectator mode: no humans seated, reveal everything
                    || !has_human
                    // Hotseat: a human only sees its own cards on its turn
                    || (is_human_seat && (human_count <= 1 || i == self.current_idx));

                let cards: Option<Vec<String>> = if show_cards {
                    Some(seat.hole.iter().map(|c| c.to_string()).collect())
                } else {
                    None
                };
                json!({
                    "name": seat.name,
                    "chips": seat.chips,
                    "bet": seat.round_bet,
                    "total_bet": seat.total_bet,
                    "status": status_str(seat.status),
                    "has_acted": seat.acted,
                    "is_dealer": i == self.dealer_idx,
                    "cards": cards,
                    "hand_rank": seat.hand_rank,
                })
            })
            .collect();

        json!({
            "pot": self.pot,
            "community_cards": self.community.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
            "stage": self.stage.as_str(),
            "dealer_idx": self.dealer_idx,
            "current_player_idx": self.current_idx,
            "players": players,
            "last_hand_result": self.last_hand_result,
            "wins": self.wins,
        })
    }

    fn available_moves(&self) -> Vec<String> {
        vec![
            "fold".to_string(),
            "check".to_string(),
            "call".to_string(),
            "raise <amount>".to_string(),
            "allin".to_string(),
        ]
    }

    fn make_move(&mut self, mv: &str, _symbol: &str) -> bool {
        if self.stage == Stage::HandOver {
            return false;
        }
        let p_idx = self.current_idx;
        if self.seats[p_idx].status != SeatStatus::Active {
            return false;
        }

        let mv = mv.to_lowercase();
        let mut parts = mv.split_whitespace();
        let action = match parts.next() {
            Some(a) => a,
            None => return false,
        };

        let current_max = self.current_max_bet();
        let to_call = current_max.saturating_sub(self.seats[p_idx].round_bet);

        let valid = match action {
            "fold" => {
                self.seats[p_idx].status = SeatStatus::Folded;
                true
            }
            "check" => to_call == 0,
            "call" => {
                let amount = to_call.min(self.seats[p_idx].chips);
                self.bet_chips(p_idx, amount);
                if self.seats[p_idx].chips == 0 {
                    self.seats[p_idx].status = SeatStatus::AllIn;
                }
                true
            }
            "raise" => match parts.next().and_then(|t| t.parse::<u32>().ok()) {
                Some(amount) => {
                    let needed = to_call + amount;
                    if needed <= self.seats[p_idx].chips && amount >= self.min_raise {
                        self.bet_chips(p_idx, needed);
                        self.min_raise = amount;
                        self.reopen_action(p_idx);
                        true
                    } else {
                        false
                    }
                }
                None => false,
            },
            "allin" => {
                let amount = self.seats[p_idx].chips;
                self.bet_chips(p_idx, amount);
                self.seats[p_idx].status = SeatStatus::AllIn;
                // An all-in only reopens action when it exceeds the current
                // max bet by more than a full minimum raise
                let new_bet = self.seats[p_idx].round_bet;
                if new_bet > current_max {
                    let raise_amt = new_bet - current_max;
                    if raise_amt > self.min_raise {
                        self.min_raise = raise_amt;
                        self.reopen_action(p_idx);
                    }
                }
                true
            }
            _ => false,
        };

        if !valid {
            return false;
        }

        self.seats[p_idx].acted = true;
        self.advance_current_from(p_idx);
        self.check_round_completion();
        true
    }

    fn is_game_over(&self) -> bool {
        self.seats.iter().filter(|s| s.chips > 0).count() <= 1
    }

    fn winner(&self) -> Option<String> {
        if !self.is_game_over() {
            return None;
        }
        self.seats
            .iter()
            .max_by_key(|s| s.chips)
            .map(|s| s.name.clone())
    }

    fn state_for_player(&self, idx: usize) -> String {
        self.render_state_text(idx)
    }
}
