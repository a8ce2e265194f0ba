//! Sweeps the scorer over every matchup and deck, folding game results into
//! per-matchup running totals.
//!
//! Totals only ever grow by addition, so decks can be folded in any order,
//! split across threads, or spread over several runs and merged afterwards.

use crate::card::{Combo, Deck, Matchup, NUM_MATCHUPS};
use crate::error::PenneyError;
use crate::simulation::scoring::{score, GameResult, Player};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Accumulated counts for one matchup over every deck folded so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchupTotals {
    #[serde(flatten)]
    matchup: Matchup,
    #[serde(default)]
    pub decks: u64,
    #[serde(default)]
    pub p1_tricks: u64,
    #[serde(default)]
    pub p2_tricks: u64,
    #[serde(default)]
    pub p1_cards: u64,
    #[serde(default)]
    pub p2_cards: u64,
    #[serde(default)]
    pub trick_ties: u64,
    #[serde(default)]
    pub card_ties: u64,
    #[serde(default)]
    pub p1_trick_wins: u64,
    #[serde(default)]
    pub p2_trick_wins: u64,
    #[serde(default)]
    pub p1_card_wins: u64,
    #[serde(default)]
    pub p2_card_wins: u64,
}

impl MatchupTotals {
    pub fn new(matchup: Matchup) -> Self {
        MatchupTotals {
            matchup,
            decks: 0,
            p1_tricks: 0,
            p2_tricks: 0,
            p1_cards: 0,
            p2_cards: 0,
            trick_ties: 0,
            card_ties: 0,
            p1_trick_wins: 0,
            p2_trick_wins: 0,
            p1_card_wins: 0,
            p2_card_wins: 0,
        }
    }

    pub fn matchup(&self) -> Matchup {
        self.matchup
    }

    /// Fold one game into the running counts
    pub fn record(&mut self, result: &GameResult) {
        self.decks += 1;
        self.p1_tricks += u64::from(result.p1_tricks);
        self.p2_tricks += u64::from(result.p2_tricks);
        self.p1_cards += u64::from(result.p1_cards);
        self.p2_cards += u64::from(result.p2_cards);

        match result.trick_winner() {
            Some(Player::One) => self.p1_trick_wins += 1,
            Some(Player::Two) => self.p2_trick_wins += 1,
            None => self.trick_ties += 1,
        }
        match result.card_winner() {
            Some(Player::One) => self.p1_card_wins += 1,
            Some(Player::Two) => self.p2_card_wins += 1,
            None => self.card_ties += 1,
        }
    }

    /// Add another run's counts for the same matchup
    pub fn merge(&mut self, other: &MatchupTotals) -> Result<(), PenneyError> {
        if self.matchup != other.matchup {
            return Err(PenneyError::InvalidArgument(format!(
                "cannot merge totals for {} into {}",
                other.matchup, self.matchup
            )));
        }
        self.add_counts(other);
        Ok(())
    }

    /// Every deck ends in exactly one trick outcome and one card outcome
    fn check_outcomes(&self) -> Result<(), PenneyError> {
        let tricks = self.p1_trick_wins + self.p2_trick_wins + self.trick_ties;
        let cards = self.p1_card_wins + self.p2_card_wins + self.card_ties;
        if tricks != self.decks || cards != self.decks {
            return Err(PenneyError::InvalidArgument(format!(
                "totals for {} record {} trick and {} card outcomes over {} decks",
                self.matchup, tricks, cards, self.decks
            )));
        }
        Ok(())
    }

    fn add_counts(&mut self, other: &MatchupTotals) {
        self.decks += other.decks;
        self.p1_tricks += other.p1_tricks;
        self.p2_tricks += other.p2_tricks;
        self.p1_cards += other.p1_cards;
        self.p2_cards += other.p2_cards;
        self.trick_ties += other.trick_ties;
        self.card_ties += other.card_ties;
        self.p1_trick_wins += other.p1_trick_wins;
        self.p2_trick_wins += other.p2_trick_wins;
        self.p1_card_wins += other.p1_card_wins;
        self.p2_card_wins += other.p2_card_wins;
    }
}

/// Totals for all 56 matchups, in `Matchup::all()` order.
/// The diagonal (P1 and P2 on the same combo) has no entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<MatchupTotals>", into = "Vec<MatchupTotals>")]
pub struct MatchupTable {
    totals: Vec<MatchupTotals>,
}

impl MatchupTable {
    pub fn new() -> Self {
        MatchupTable {
            totals: Matchup::all().map(MatchupTotals::new).collect(),
        }
    }

    /// Score one deck against every matchup
    pub fn record_deck(&mut self, deck: &Deck) {
        for totals in &mut self.totals {
            let result = score(deck, totals.matchup);
            totals.record(&result);
        }
    }

    /// Totals for `(p1, p2)`, or `None` on the diagonal
    pub fn get(&self, p1: Combo, p2: Combo) -> Option<&MatchupTotals> {
        let matchup = Matchup::new(p1, p2).ok()?;
        self.totals.get(matchup.index())
    }

    pub fn totals(&self) -> &[MatchupTotals] {
        &self.totals
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchupTotals> {
        self.totals.iter()
    }

    /// Largest per-matchup deck count; equal to every count for a single run
    pub fn total_decks(&self) -> u64 {
        self.totals.iter().map(|t| t.decks).max().unwrap_or(0)
    }
}

impl Default for MatchupTable {
    fn default() -> Self {
        Self::new()
    }
}

impl AddAssign<&MatchupTable> for MatchupTable {
    fn add_assign(&mut self, other: &MatchupTable) {
        for (mine, theirs) in self.totals.iter_mut().zip(&other.totals) {
            mine.add_counts(theirs);
        }
    }
}

impl AddAssign for MatchupTable {
    fn add_assign(&mut self, other: MatchupTable) {
        *self += &other;
    }
}

impl TryFrom<Vec<MatchupTotals>> for MatchupTable {
    type Error = PenneyError;

    /// Place stored rows by matchup; rows absent from the input start empty
    fn try_from(rows: Vec<MatchupTotals>) -> Result<Self, Self::Error> {
        let mut table = MatchupTable::new();
        let mut seen = [false; NUM_MATCHUPS];
        for row in rows {
            row.check_outcomes()?;
            let idx = row.matchup.index();
            if seen[idx] {
                return Err(PenneyError::InvalidArgument(format!(
                    "duplicate totals for {}",
                    row.matchup
                )));
            }
            seen[idx] = true;
            table.totals[idx] = row;
        }
        Ok(table)
    }
}

impl From<MatchupTable> for Vec<MatchupTotals> {
    fn from(table: MatchupTable) -> Self {
        table.totals
    }
}

/// Score a batch of decks in parallel and return their combined totals
pub fn tally(decks: &[Deck]) -> MatchupTable {
    decks
        .par_iter()
        .fold(MatchupTable::new, |mut table, deck| {
            table.record_deck(deck);
            table
        })
        .reduce(MatchupTable::new, |mut a, b| {
            a += b;
            a
        })
}

/// Streaming accumulator: decks are folded chunk by chunk and then dropped,
/// so only the running totals stay in memory.
#[derive(Debug, Default)]
pub struct Aggregator {
    table: MatchupTable,
    decks_seen: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold_deck(&mut self, deck: &Deck) {
        self.table.record_deck(deck);
        self.decks_seen += 1;
    }

    pub fn fold_chunk(&mut self, decks: &[Deck]) {
        if decks.is_empty() {
            return;
        }
        self.table += tally(decks);
        self.decks_seen += decks.len() as u64;
        log::debug!("folded {} decks ({} total)", decks.len(), self.decks_seen);
    }

    pub fn decks_seen(&self) -> u64 {
        self.decks_seen
    }

    pub fn finish(self) -> Result<MatchupTable, PenneyError> {
        if self.decks_seen == 0 {
            return Err(PenneyError::EmptyDeckSet);
        }
        Ok(self.table)
    }
}

/// Aggregate every matchup over `decks` in one call
pub fn aggregate(decks: &[Deck]) -> Result<MatchupTable, PenneyError> {
    let mut aggregator = Aggregator::new();
    aggregator.fold_chunk(decks);
    aggregator.finish()
}
