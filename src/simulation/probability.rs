use crate::card::{Combo, NUM_COMBOS};
use crate::simulation::aggregate::MatchupTotals;
use serde::{Deserialize, Serialize};

/// 8x8 grid of percentages indexed by (P1 combo, P2 combo).
/// `None` marks the diagonal and matchups with no sampled decks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProbabilityMatrix {
    cells: [[Option<f64>; NUM_COMBOS]; NUM_COMBOS],
}

impl ProbabilityMatrix {
    pub fn get(&self, p1: Combo, p2: Combo) -> Option<f64> {
        self.cells[p1.index()][p2.index()]
    }

    fn set(&mut self, p1: Combo, p2: Combo, value: Option<f64>) {
        self.cells[p1.index()][p2.index()] = value;
    }
}

/// Win and tie percentages for every matchup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityReport {
    /// Row and column order of every matrix
    pub combos: [Combo; NUM_COMBOS],
    /// Deck count shown alongside the matrices
    pub decks: u64,
    pub p2_trick_win: ProbabilityMatrix,
    pub p2_card_win: ProbabilityMatrix,
    pub trick_tie: ProbabilityMatrix,
    pub card_tie: ProbabilityMatrix,
}

impl ProbabilityReport {
    /// P1's trick win percentage, `100 - P2 win - tie`
    pub fn p1_trick_win(&self, p1: Combo, p2: Combo) -> Option<f64> {
        p1_win(self.p2_trick_win.get(p1, p2), self.trick_tie.get(p1, p2))
    }

    /// P1's card win percentage, `100 - P2 win - tie`
    pub fn p1_card_win(&self, p1: Combo, p2: Combo) -> Option<f64> {
        p1_win(self.p2_card_win.get(p1, p2), self.card_tie.get(p1, p2))
    }
}

/// Recover the remaining player's win percentage from the other's win and tie
pub fn p1_win(p2_win: Option<f64>, tie: Option<f64>) -> Option<f64> {
    Some(100.0 - p2_win? - tie?)
}

fn percent(count: u64, decks: u64) -> Option<f64> {
    if decks == 0 {
        return None;
    }
    Some(100.0 * count as f64 / decks as f64)
}

/// Turn accumulated totals into percentage matrices.
///
/// Each cell divides by that matchup's own deck count, so tables merged from
/// runs of different sizes are still summarised correctly.
pub fn summarize(totals: &[MatchupTotals]) -> ProbabilityReport {
    let mut report = ProbabilityReport {
        combos: Combo::ALL,
        decks: 0,
        p2_trick_win: ProbabilityMatrix::default(),
        p2_card_win: ProbabilityMatrix::default(),
        trick_tie: ProbabilityMatrix::default(),
        card_tie: ProbabilityMatrix::default(),
    };

    for t in totals {
        let (p1, p2) = (t.matchup().p1(), t.matchup().p2());
        report.decks = report.decks.max(t.decks);
        report.p2_trick_win.set(p1, p2, percent(t.p2_trick_wins, t.decks));
        report.p2_card_win.set(p1, p2, percent(t.p2_card_wins, t.decks));
        report.trick_tie.set(p1, p2, percent(t.trick_ties, t.decks));
        report.card_tie.set(p1, p2, percent(t.card_ties, t.decks));
    }

    report
}
