use std::cmp::Ordering;

use crate::cards::Card;

/// Hand categories ordered from weakest to strongest.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum HandCategory {
    HighCard = 1,
    Pair = 2,
    TwoPair = 3,
    ThreeOfAKind = 4,
    Straight = 5,
    Flush = 6,
    FullHouse = 7,
    FourOfAKind = 8,
    StraightFlush = 9,
    RoyalFlush = 10,
}

impl HandCategory {
    pub fn label(&self) -> &'static str {
        match self {
            HandCategory::HighCard => "High Card",
            HandCategory::Pair => "Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::ThreeOfAKind => "Three Of A Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::FourOfAKind => "Four Of A Kind",
            HandCategory::StraightFlush => "Straight Flush",
            HandCategory::RoyalFlush => "Royal Flush",
        }
    }
}

/// Score of the best 5-card hand found in a card set.
///
/// `core` holds the cards that constitute the category (all four cards of a
/// quad, both pairs of two pair, the five cards of a straight); `spare`
/// holds the remaining cards of the chosen 5-card hand. Both are for result
/// display only — comparison uses `category` and `kickers` exclusively.
#[derive(Debug, Clone)]
pub struct HandScore {
    pub category: HandCategory,
    /// Tiebreak ranks ordered high to low.
    pub kickers: Vec<u8>,
    pub core: Vec<Card>,
    pub spare: Vec<Card>,
}

// Two hands are the same hand when category and kickers agree; the concrete
// core/spare cards are display data and never break ties
impl PartialEq for HandScore {
    fn eq(&self, other: &Self) -> bool {
        compare_scores(self, other) == Ordering::Equal
    }
}

impl Eq for HandScore {}

impl Ord for HandScore {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_scores(self, other)
    }
}

impl PartialOrd for HandScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub fn compare_scores(a: &HandScore, b: &HandScore) -> Ordering {
    match a.category.cmp(&b.category) {
        Ordering::Equal => a.kickers.cmp(&b.kickers),
        ord => ord,
    }
}

/// Evaluates the best 5-card poker hand over a set of 5–7 cards by scoring
/// every 5-card subset. Fewer than 5 cards degrades to a high-card score
/// over what is present.
pub fn evaluate_hand(cards: &[Card]) -> HandScore {
    if cards.len() < 5 {
        let mut ranks: Vec<u8> = cards.iter().map(|c| c.rank as u8).collect();
        ranks.sort_unstable_by(|a, b| b.cmp(a));
        return HandScore {
            category: HandCategory::HighCard,
            kickers: ranks,
            core: cards.to_vec(),
            spare: Vec::new(),
        };
    }

    let mut best: Option<HandScore> = None;
    for_each_five(cards, |five| {
        let (category, kickers, core) = evaluate_five(five);
        let candidate_wins = match &best {
            None => true,
            Some(b) => match category.cmp(&b.category) {
                Ordering::Equal => kickers > b.kickers,
                ord => ord.is_gt(),
            },
        };
        if candidate_wins {
            let spare: Vec<Card> = five
                .iter()
                .copied()
                .filter(|c| !core.contains(c))
                .collect();
            best = Some(HandScore {
                category,
                kickers,
                core,
                spare,
            });
        }
    });

    // len >= 5 guarantees at least one subset
    best.expect("at least one 5-card subset")
}

fn for_each_five<F: FnMut(&[Card; 5])>(cards: &[Card], mut f: F) {
    let n = cards.len();
    for a in 0..n - 4 {
        for b in a + 1..n - 3 {
            for c in b + 1..n - 2 {
                for d in c + 1..n - 1 {
                    for e in d + 1..n {
                        f(&[cards[a], cards[b], cards[c], cards[d], cards[e]]);
                    }
                }
            }
        }
    }
}

fn evaluate_five(cards: &[Card; 5]) -> (HandCategory, Vec<u8>, Vec<Card>) {
    let mut ranks: Vec<u8> = cards.iter().map(|c| c.rank as u8).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = cards.iter().all(|c| c.suit == cards[0].suit);

    let mut unique = ranks.clone();
    unique.dedup();

    // Straight over 5 distinct ranks; A-2-3-4-5 counts as the 5-high straight
    let mut straight_high = 0u8;
    if unique.len() == 5 {
        if unique[0] - unique[4] == 4 {
            straight_high = unique[0];
        } else if unique == [14, 5, 4, 3, 2] {
            straight_high = 5;
        }
    }
    let is_straight = straight_high != 0;

    if is_straight && is_flush {
        if straight_high == 14 {
            return (HandCategory::RoyalFlush, vec![], cards.to_vec());
        }
        return (
            HandCategory::StraightFlush,
            vec![straight_high],
            cards.to_vec(),
        );
    }

    let mut counts = [0u8; 15];
    for &r in &ranks {
        counts[r as usize] += 1;
    }
    let by_rank = |r: u8| -> Vec<Card> {
        cards
            .iter()
            .copied()
            .filter(|c| c.rank as u8 == r)
            .collect()
    };

    let mut quad = 0u8;
    let mut trips: Vec<u8> = Vec::new();
    let mut pairs: Vec<u8> = Vec::new();
    let mut singles: Vec<u8> = Vec::new();
    for r in (2..=14u8).rev() {
        match counts[r as usize] {
            4 => quad = r,
            3 => trips.push(r),
            2 => pairs.push(r),
            1 => singles.push(r),
            _ => {}
        }
    }

    if quad != 0 {
        let kicker = *singles.first().unwrap_or(&0);
        return (
            HandCategory::FourOfAKind,
            vec![quad, kicker],
            by_rank(quad),
        );
    }

    if let (Some(&t), Some(&p)) = (trips.first(), pairs.first()) {
        return (HandCategory::FullHouse, vec![t, p], cards.to_vec());
    }

    if is_flush {
        return (HandCategory::Flush, ranks, cards.to_vec());
    }

    if is_straight {
        return (HandCategory::Straight, vec![straight_high], cards.to_vec());
    }

    if let Some(&t) = trips.first() {
        let mut kicks = vec![t];
        kicks.extend(singles.iter().take(2));
        return (HandCategory::ThreeOfAKind, kicks, by_rank(t));
    }

    if pairs.len() >= 2 {
        let (hi, lo) = (pairs[0], pairs[1]);
        let mut core = by_rank(hi);
        core.extend(by_rank(lo));
        let kicks = vec![hi, lo, *singles.first().unwrap_or(&0)];
        return (HandCategory::TwoPair, kicks, core);
    }

    if let Some(&p) = pairs.first() {
        let mut kicks = vec![p];
        kicks.extend(singles.iter().take(3));
        return (HandCategory::Pair, kicks, by_rank(p));
    }

    (HandCategory::HighCard, ranks.clone(), by_rank(ranks[0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank as R, Suit as S};

    fn c(s: S, r: R) -> Card {
        Card { suit: s, rank: r }
    }

    #[test]
    fn short_hand_scores_as_high_card() {
        let score = evaluate_hand(&[c(S::Hearts, R::Ace), c(S::Clubs, R::Nine)]);
        assert_eq!(score.category, HandCategory::HighCard);
        assert_eq!(score.kickers, vec![14, 9]);
        assert_eq!(score.core.len(), 2);
    }

    #[test]
    fn two_pair_core_is_both_pairs() {
        let score = evaluate_hand(&[
            c(S::Hearts, R::King),
            c(S::Clubs, R::King),
            c(S::Hearts, R::Nine),
            c(S::Spades, R::Nine),
            c(S::Diamonds, R::Four),
            c(S::Clubs, R::Two),
            c(S::Spades, R::Three),
        ]);
        assert_eq!(score.category, HandCategory::TwoPair);
        assert_eq!(score.kickers, vec![13, 9, 4]);
        assert_eq!(score.core.len(), 4);
        assert_eq!(score.spare.len(), 1);
    }

    #[test]
    fn category_labels_are_human_readable() {
        assert_eq!(HandCategory::FullHouse.label(), "Full House");
        assert_eq!(HandCategory::RoyalFlush.label(), "Royal Flush");
    }
}
