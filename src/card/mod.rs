pub mod types;

pub use types::{Combo, Deck, Matchup, Symbol, COMBO_LEN, NUM_COMBOS, NUM_MATCHUPS};
