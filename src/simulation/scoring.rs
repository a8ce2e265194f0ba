use crate::card::{Deck, Matchup, COMBO_LEN};
use std::fmt;

/// Which player a trick or card count went to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    One,
    Two,
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => write!(f, "Player 1"),
            Player::Two => write!(f, "Player 2"),
        }
    }
}

/// Result of scoring one deck against one matchup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameResult {
    pub p1_tricks: u32,
    pub p2_tricks: u32,
    pub p1_cards: u32,
    pub p2_cards: u32,
    /// Cards after the last completed trick, which nobody collects
    pub unclaimed_cards: u32,
}

impl GameResult {
    /// Equal trick counts, including 0-0
    pub fn trick_tie(&self) -> bool {
        self.p1_tricks == self.p2_tricks
    }

    /// Equal card counts, including 0-0
    pub fn card_tie(&self) -> bool {
        self.p1_cards == self.p2_cards
    }

    pub fn trick_winner(&self) -> Option<Player> {
        winner(self.p1_tricks, self.p2_tricks)
    }

    pub fn card_winner(&self) -> Option<Player> {
        winner(self.p1_cards, self.p2_cards)
    }
}

fn winner(p1: u32, p2: u32) -> Option<Player> {
    match p1.cmp(&p2) {
        std::cmp::Ordering::Greater => Some(Player::One),
        std::cmp::Ordering::Less => Some(Player::Two),
        std::cmp::Ordering::Equal => None,
    }
}

/// Play one game of Penney's Game.
///
/// A window of three cards slides over the deck. When it shows either
/// player's combo, that player takes a trick plus every card since the
/// previous trick, and the scan restarts just past the matched cards.
/// Otherwise the window moves on by one card. Cards left over when the deck
/// runs out belong to nobody.
pub fn score(deck: &Deck, matchup: Matchup) -> GameResult {
    let cards = deck.cards();
    let (p1, p2) = (matchup.p1(), matchup.p2());
    let mut result = GameResult::default();

    // Number of leading cards already handed to a player
    let mut claimed = 0usize;
    let mut pos = 0usize;

    while pos + COMBO_LEN <= cards.len() {
        let window = &cards[pos..pos + COMBO_LEN];
        let end = pos + COMBO_LEN;

        if p1.matches(window) {
            result.p1_tricks += 1;
            result.p1_cards += (end - claimed) as u32;
        } else if p2.matches(window) {
            result.p2_tricks += 1;
            result.p2_cards += (end - claimed) as u32;
        } else {
            pos += 1;
            continue;
        }

        claimed = end;
        pos = end;
    }

    result.unclaimed_cards = (cards.len() - claimed) as u32;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::generate::generate;

    fn matchup(p1: &str, p2: &str) -> Matchup {
        Matchup::new(p1.parse().unwrap(), p2.parse().unwrap()).unwrap()
    }

    #[test]
    fn test_runs_of_each_colour() {
        let deck: Deck = "RRRRRBBBBB".parse().unwrap();
        let result = score(&deck, matchup("RRR", "BBB"));

        assert_eq!(result.p1_tricks, 1);
        assert_eq!(result.p2_tricks, 1);
        assert_eq!(result.p1_cards, 3);
        assert_eq!(result.p2_cards, 5);
        assert_eq!(result.unclaimed_cards, 2);
        assert!(result.trick_tie());
        assert!(!result.card_tie());
        assert_eq!(result.card_winner(), Some(Player::Two));
    }

    #[test]
    fn test_matched_cards_are_consumed() {
        // RRRRRR holds four overlapping RRR windows but only two disjoint ones
        let deck: Deck = "RRRRRRBBBBBB".parse().unwrap();
        let result = score(&deck, matchup("RRR", "RBR"));
        assert_eq!(result.p1_tricks, 2);
        assert_eq!(result.p1_cards, 6);
        assert_eq!(result.p2_tricks, 0);
        assert_eq!(result.unclaimed_cards, 6);
    }

    #[test]
    fn test_uncommitted_cards_go_to_next_trick() {
        let deck: Deck = "BRBBBRRRRB".parse().unwrap();
        let result = score(&deck, matchup("RRR", "BBB"));
        // BBB at 2 collects the two unmatched cards before it
        assert_eq!(result.p2_tricks, 1);
        assert_eq!(result.p2_cards, 5);
        // RRR at 5 starts right after the previous trick
        assert_eq!(result.p1_tricks, 1);
        assert_eq!(result.p1_cards, 3);
        assert_eq!(result.unclaimed_cards, 2);
    }

    #[test]
    fn test_alternating_tricks() {
        let deck: Deck = "RBRBRB".parse().unwrap();
        let result = score(&deck, matchup("RBR", "BRB"));
        assert_eq!(result.p1_tricks, 1);
        assert_eq!(result.p2_tricks, 1);
        assert_eq!(result.p1_cards, 3);
        assert_eq!(result.p2_cards, 3);
        assert_eq!(result.unclaimed_cards, 0);
    }

    #[test]
    fn test_no_matches_leaves_everything_unclaimed() {
        let deck: Deck = "RBRBRBRB".parse().unwrap();
        let result = score(&deck, matchup("RRR", "BBB"));
        assert_eq!(result, GameResult {
            unclaimed_cards: 8,
            ..GameResult::default()
        });
        assert!(result.trick_tie());
        assert!(result.card_tie());
        assert_eq!(result.trick_winner(), None);
    }

    #[test]
    fn test_card_conservation_and_trick_bound() {
        let (decks, _) = generate(2024, 200, 26).unwrap();
        for deck in &decks {
            for m in Matchup::all() {
                let r = score(deck, m);
                let total = r.p1_cards + r.p2_cards + r.unclaimed_cards;
                assert_eq!(total as usize, deck.len(), "{} on {}", m, deck);
                assert!((r.p1_tricks + r.p2_tricks) as usize <= deck.len() / COMBO_LEN);
            }
        }
    }

    #[test]
    fn test_deck_ending_on_trick_is_fully_claimed() {
        let deck: Deck = "RRBBRB".parse().unwrap();
        let result = score(&deck, matchup("RRB", "BRB"));
        assert_eq!(result.p1_cards + result.p2_cards, 6);
        assert_eq!(result.unclaimed_cards, 0);
    }
}
