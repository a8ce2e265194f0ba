use crate::error::PenneyError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("{0}")]
    Invalid(#[from] PenneyError),
}

/// Parameters for one simulation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for the deck shuffler; deck `i` is tagged `seed + i`
    pub seed: u64,
    pub n_decks: usize,
    /// Cards of each colour, 26 for a standard deck
    pub half_deck_size: usize,
    /// Decks scored per batch; bounds memory on long runs
    pub chunk_size: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            seed: 15,
            n_decks: 10_000,
            half_deck_size: 26,
            chunk_size: 10_000,
        }
    }
}

impl SimulationConfig {
    /// Load a config from a JSON file; missing fields take their defaults
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PenneyError> {
        if self.half_deck_size < 2 {
            return Err(PenneyError::InvalidArgument(format!(
                "half deck size must be at least 2, got {}",
                self.half_deck_size
            )));
        }
        if self.chunk_size == 0 {
            return Err(PenneyError::InvalidArgument(
                "chunk size must be positive".to_string(),
            ));
        }
        if self.seed.checked_add(self.n_decks as u64).is_none() {
            return Err(PenneyError::InvalidArgument(format!(
                "{} decks starting at seed {} overflow the seed range",
                self.n_decks, self.seed
            )));
        }
        Ok(())
    }

    /// First seed after this run's range
    pub fn next_seed(&self) -> u64 {
        self.seed + self.n_decks as u64
    }
}
