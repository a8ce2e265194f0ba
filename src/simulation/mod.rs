pub mod aggregate;
pub mod deck;
pub mod generate;
pub mod probability;
pub mod report;
pub mod scoring;
pub mod store;

pub use aggregate::{aggregate, Aggregator, MatchupTable, MatchupTotals};
pub use deck::{write_deck_file, DeckError, DeckReader};
pub use generate::{generate, DeckGenerator, SeededDeck};
pub use probability::{summarize, ProbabilityMatrix, ProbabilityReport};
pub use scoring::{score, GameResult, Player};
pub use store::{score_decks, simulate, ResultsFile, StoreError};
