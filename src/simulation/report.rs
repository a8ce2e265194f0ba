use crate::card::{Combo, NUM_COMBOS};
use crate::simulation::probability::{ProbabilityMatrix, ProbabilityReport};
use std::fmt::Write;

const CELL_WIDTH: usize = 9;

/// One cell as "win(tie)" in whole percent; blank when undefined
fn format_cell(win: Option<f64>, tie: Option<f64>) -> String {
    match (win, tie) {
        (Some(w), Some(t)) => format!("{:.0}({:.0})", w, t),
        _ => String::new(),
    }
}

/// Render a win matrix with tie percentages in parentheses.
/// Rows are P1's choice, columns P2's.
pub fn render_matrix(win: &ProbabilityMatrix, tie: &ProbabilityMatrix, title: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);
    let _ = write!(out, "{:>6} |", "P1\\P2");
    for combo in Combo::ALL {
        let _ = write!(out, "{:>w$}", combo.to_string(), w = CELL_WIDTH);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{:-<w$}", "", w = 8 + CELL_WIDTH * NUM_COMBOS);

    for p1 in Combo::ALL {
        let _ = write!(out, "{:>6} |", p1.to_string());
        for p2 in Combo::ALL {
            let cell = format_cell(win.get(p1, p2), tie.get(p1, p2));
            let _ = write!(out, "{:>w$}", cell, w = CELL_WIDTH);
        }
        let _ = writeln!(out);
    }
    out
}

/// Both P2 win(tie) tables, tricks then cards
pub fn render_report(report: &ProbabilityReport) -> String {
    let mut out = render_matrix(
        &report.p2_trick_win,
        &report.trick_tie,
        &format!("Player 2's Win(Draw) % on Tricks over {} decks", report.decks),
    );
    out.push('\n');
    out.push_str(&render_matrix(
        &report.p2_card_win,
        &report.card_tie,
        &format!("Player 2's Win(Draw) % on Cards over {} decks", report.decks),
    ));
    out
}
