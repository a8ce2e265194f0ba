//! Saved simulation results.
//!
//! A results file keeps the running totals of every matchup together with
//! the seed range that produced them, so a later run can pick up at the next
//! unused seed and fold its decks into the same totals.

use crate::config::SimulationConfig;
use crate::error::PenneyError;
use crate::simulation::aggregate::{Aggregator, MatchupTable};
use crate::simulation::generate::{DeckGenerator, SeededDeck};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("{0}")]
    Simulation(#[from] PenneyError),
    #[error("Incompatible results: {0}")]
    Incompatible(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsFile {
    pub half_deck_size: usize,
    /// First seed covered by these totals
    pub seed_start: u64,
    /// First seed not yet used; where the next run continues
    pub next_seed: u64,
    pub decks: u64,
    /// RFC 3339 timestamp of the last update
    pub generated_at: String,
    pub totals: MatchupTable,
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn fold_seeded(aggregator: &mut Aggregator, chunk: &[SeededDeck]) {
    let decks: Vec<_> = chunk.iter().map(|s| s.deck.clone()).collect();
    aggregator.fold_chunk(&decks);
}

/// Generate and score the decks described by `config`, `chunk_size` at a time.
/// `on_chunk` sees each chunk after it has been folded (progress reporting,
/// saving the decks themselves).
pub fn simulate<F>(config: &SimulationConfig, mut on_chunk: F) -> Result<ResultsFile, PenneyError>
where
    F: FnMut(&[SeededDeck]),
{
    config.validate()?;
    log::info!(
        "simulating {} decks of {} cards from seed {}",
        config.n_decks,
        config.half_deck_size * 2,
        config.seed
    );

    let mut generator = DeckGenerator::new(config.seed, config.n_decks, config.half_deck_size)?;
    let mut aggregator = Aggregator::new();
    loop {
        let chunk = generator.next_chunk(config.chunk_size);
        if chunk.is_empty() {
            break;
        }
        fold_seeded(&mut aggregator, &chunk);
        on_chunk(&chunk);
    }

    let decks = aggregator.decks_seen();
    let totals = aggregator.finish()?;
    Ok(ResultsFile {
        half_deck_size: config.half_deck_size,
        seed_start: config.seed,
        next_seed: generator.next_seed(),
        decks,
        generated_at: now(),
        totals,
    })
}

/// Score a stream of decks read from elsewhere (a deck file), `chunk_size`
/// at a time. Only the current chunk is held in memory. The first error
/// from the stream stops scoring and is returned as is.
pub fn score_decks<I, E, F>(decks: I, chunk_size: usize, mut on_chunk: F) -> Result<ResultsFile, E>
where
    I: IntoIterator<Item = Result<SeededDeck, E>>,
    E: From<PenneyError>,
    F: FnMut(&[SeededDeck]),
{
    let chunk_size = chunk_size.max(1);
    let mut aggregator = Aggregator::new();
    let mut chunk = Vec::with_capacity(chunk_size);
    let mut half_deck_size = None;
    let mut seed_start = u64::MAX;
    let mut next_seed = 0u64;

    for item in decks {
        let seeded = item?;
        let half = seeded.deck.half_deck_size();
        match half_deck_size {
            None => half_deck_size = Some(half),
            Some(expected) if expected != half => {
                return Err(PenneyError::InvalidDeck(format!(
                    "deck {} has {} cards, expected {}",
                    seeded.seed,
                    seeded.deck.len(),
                    expected * 2
                ))
                .into());
            }
            Some(_) => {}
        }
        seed_start = seed_start.min(seeded.seed);
        next_seed = next_seed.max(seeded.seed.saturating_add(1));

        chunk.push(seeded);
        if chunk.len() == chunk_size {
            fold_seeded(&mut aggregator, &chunk);
            on_chunk(&chunk);
            chunk.clear();
        }
    }
    if !chunk.is_empty() {
        fold_seeded(&mut aggregator, &chunk);
        on_chunk(&chunk);
    }

    let count = aggregator.decks_seen();
    let totals = aggregator.finish()?;
    Ok(ResultsFile {
        half_deck_size: half_deck_size.unwrap_or(0),
        seed_start,
        next_seed,
        decks: count,
        generated_at: now(),
        totals,
    })
}

impl ResultsFile {
    pub fn load(path: &str) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a results file and check that its bookkeeping is consistent
    pub fn from_json(content: &str) -> Result<Self, StoreError> {
        let file: ResultsFile = serde_json::from_str(content)?;
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> Result<(), PenneyError> {
        if self.half_deck_size < 2 {
            return Err(PenneyError::InvalidArgument(format!(
                "half deck size must be at least 2, got {}",
                self.half_deck_size
            )));
        }
        if self.next_seed < self.seed_start {
            return Err(PenneyError::InvalidArgument(format!(
                "next seed {} is before the first seed {}",
                self.next_seed, self.seed_start
            )));
        }
        if self.decks < self.totals.total_decks() {
            return Err(PenneyError::InvalidArgument(format!(
                "{} decks recorded but a matchup holds {}",
                self.decks,
                self.totals.total_decks()
            )));
        }
        Ok(())
    }

    /// True when the two files cover at least one seed in common
    pub fn overlaps(&self, other: &ResultsFile) -> bool {
        self.seed_start < other.next_seed && other.seed_start < self.next_seed
    }

    pub fn save(&self, path: &str) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("saved {} decks of results to {}", self.decks, path);
        Ok(())
    }

    /// Config for a follow-up run of `n_decks` starting at the next unused seed
    pub fn continuation(&self, n_decks: usize, chunk_size: usize) -> SimulationConfig {
        SimulationConfig {
            seed: self.next_seed,
            n_decks,
            half_deck_size: self.half_deck_size,
            chunk_size,
        }
    }

    /// Simulate `n_decks` more decks and fold them into these totals
    pub fn extend<F>(&mut self, n_decks: usize, chunk_size: usize, on_chunk: F) -> Result<(), StoreError>
    where
        F: FnMut(&[SeededDeck]),
    {
        let config = self.continuation(n_decks, chunk_size);
        let more = simulate(&config, on_chunk)?;
        self.merge(&more)
    }

    /// Sum another file's totals into this one. The seed ranges must not
    /// intersect, or the shared decks would be counted twice.
    pub fn merge(&mut self, other: &ResultsFile) -> Result<(), StoreError> {
        if self.half_deck_size != other.half_deck_size {
            return Err(StoreError::Incompatible(format!(
                "half deck size {} vs {}",
                self.half_deck_size, other.half_deck_size
            )));
        }
        if self.overlaps(other) {
            return Err(StoreError::Incompatible(format!(
                "seeds {}..{} overlap {}..{}",
                self.seed_start, self.next_seed, other.seed_start, other.next_seed
            )));
        }
        self.totals += &other.totals;
        self.decks += other.decks;
        self.seed_start = self.seed_start.min(other.seed_start);
        self.next_seed = self.next_seed.max(other.next_seed);
        self.generated_at = now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::aggregate::aggregate;
    use crate::simulation::generate::generate;

    fn config(seed: u64, n_decks: usize) -> SimulationConfig {
        SimulationConfig {
            seed,
            n_decks,
            half_deck_size: 26,
            chunk_size: 16,
        }
    }

    #[test]
    fn test_simulate_matches_direct_aggregation() {
        let results = simulate(&config(5, 40), |_| {}).unwrap();
        let (decks, _) = generate(5, 40, 26).unwrap();
        assert_eq!(results.totals, aggregate(&decks).unwrap());
        assert_eq!(results.decks, 40);
        assert_eq!(results.seed_start, 5);
        assert_eq!(results.next_seed, 45);
    }

    #[test]
    fn test_simulate_reports_every_chunk() {
        let mut seen = Vec::new();
        simulate(&config(0, 40), |chunk| seen.push(chunk.len())).unwrap();
        assert_eq!(seen, vec![16, 16, 8]);
    }

    #[test]
    fn test_simulate_zero_decks_is_empty_deck_set() {
        assert_eq!(simulate(&config(0, 0), |_| {}).unwrap_err(), PenneyError::EmptyDeckSet);
    }

    #[test]
    fn test_extend_continues_seed_range() {
        let mut results = simulate(&config(10, 20), |_| {}).unwrap();
        let mut seeds = Vec::new();
        results
            .extend(15, 16, |chunk| seeds.extend(chunk.iter().map(|s| s.seed)))
            .unwrap();
        assert_eq!(seeds, (30..45).collect::<Vec<_>>());
        assert_eq!(results.decks, 35);
        assert_eq!(results.next_seed, 45);
        assert!(results.totals.iter().all(|t| t.decks == 35));
    }

    fn stream(decks: Vec<SeededDeck>) -> impl Iterator<Item = Result<SeededDeck, PenneyError>> {
        decks.into_iter().map(Ok)
    }

    #[test]
    fn test_score_decks_matches_simulate() {
        let decks: Vec<_> = DeckGenerator::new(60, 30, 26).unwrap().collect();
        let mut seen = Vec::new();
        let scored = score_decks(stream(decks), 7, |chunk| seen.push(chunk.len())).unwrap();
        assert_eq!(seen, vec![7, 7, 7, 7, 2]);
        let simulated = simulate(&config(60, 30), |_| {}).unwrap();
        assert_eq!(scored.totals, simulated.totals);
        assert_eq!(scored.seed_start, 60);
        assert_eq!(scored.next_seed, 90);
        assert_eq!(scored.half_deck_size, 26);
    }

    #[test]
    fn test_score_decks_rejects_empty_and_mixed_sizes() {
        assert_eq!(
            score_decks(stream(Vec::new()), 10, |_| {}).unwrap_err(),
            PenneyError::EmptyDeckSet
        );

        let mut decks: Vec<_> = DeckGenerator::new(0, 2, 26).unwrap().collect();
        decks.extend(DeckGenerator::new(2, 2, 5).unwrap());
        assert!(matches!(
            score_decks(stream(decks), 10, |_| {}),
            Err(PenneyError::InvalidDeck(_))
        ));
    }

    #[test]
    fn test_score_decks_stops_at_stream_error() {
        let decks = DeckGenerator::new(0, 3, 26)
            .unwrap()
            .map(Ok)
            .chain(std::iter::once(Err(PenneyError::InvalidDeck("bad line".to_string()))));
        let mut folded = 0;
        let err = score_decks(decks, 2, |chunk| folded += chunk.len()).unwrap_err();
        assert_eq!(err, PenneyError::InvalidDeck("bad line".to_string()));
        assert_eq!(folded, 2);
    }

    #[test]
    fn test_merge_rejects_overlapping_seed_ranges() {
        let mut a = simulate(&config(0, 10), |_| {}).unwrap();
        let copy = a.clone();
        assert!(matches!(a.merge(&copy), Err(StoreError::Incompatible(_))));
        assert_eq!(a.decks, 10);

        let straddling = simulate(&config(9, 5), |_| {}).unwrap();
        assert!(matches!(a.merge(&straddling), Err(StoreError::Incompatible(_))));

        let adjacent = simulate(&config(10, 5), |_| {}).unwrap();
        a.merge(&adjacent).unwrap();
        assert_eq!(a.decks, 15);
        assert_eq!((a.seed_start, a.next_seed), (0, 15));
        assert!(a.totals.iter().all(|t| t.decks == 15));
    }

    fn results_json(seed_start: u64, next_seed: u64, decks: u64) -> String {
        format!(
            r#"{{"half_deck_size":26,"seed_start":{},"next_seed":{},"decks":{},
                "generated_at":"2024-01-01T00:00:00+00:00",
                "totals":[{{"p1_combo":"RRR","p2_combo":"BBB","decks":3,
                    "trick_ties":3,"card_ties":3}}]}}"#,
            seed_start, next_seed, decks
        )
    }

    #[test]
    fn test_from_json_checks_bookkeeping() {
        assert!(ResultsFile::from_json(&results_json(0, 3, 3)).is_ok());
        assert!(matches!(
            ResultsFile::from_json(&results_json(50, 10, 3)),
            Err(StoreError::Simulation(PenneyError::InvalidArgument(_)))
        ));
        assert!(matches!(
            ResultsFile::from_json(&results_json(0, 3, 2)),
            Err(StoreError::Simulation(PenneyError::InvalidArgument(_)))
        ));
    }

    #[test]
    fn test_from_json_rejects_inconsistent_rows() {
        let json = r#"{"half_deck_size":26,"seed_start":0,"next_seed":2,"decks":2,
            "generated_at":"2024-01-01T00:00:00+00:00",
            "totals":[{"p1_combo":"RRR","p2_combo":"BBB","decks":2,
                "p2_trick_wins":5,"trick_ties":3}]}"#;
        assert!(matches!(ResultsFile::from_json(json), Err(StoreError::JsonError(_))));
    }

    #[test]
    fn test_merge_rejects_different_deck_sizes() {
        let mut a = simulate(&config(0, 4), |_| {}).unwrap();
        let b = simulate(
            &SimulationConfig {
                half_deck_size: 5,
                ..config(4, 4)
            },
            |_| {},
        )
        .unwrap();
        assert!(matches!(a.merge(&b), Err(StoreError::Incompatible(_))));
    }

    #[test]
    fn test_save_and_load() {
        let results = simulate(&config(1, 8), |_| {}).unwrap();
        let path = std::env::temp_dir().join(format!("penney-results-{}.json", std::process::id()));
        let path = path.to_string_lossy().to_string();
        results.save(&path).unwrap();
        let loaded = ResultsFile::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, results);
    }
}
