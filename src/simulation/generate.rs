use crate::card::{Deck, Symbol};
use crate::error::PenneyError;
use crate::rng::GameRng;

/// A generated deck together with its provenance seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededDeck {
    pub seed: u64,
    pub deck: Deck,
}

/// Streams reproducible shuffled decks from a single seeded RNG.
///
/// The RNG is initialised once from `seed` and shuffles every deck in turn,
/// so pulling decks one at a time, in chunks, or all at once yields the same
/// sequence. Deck `i` is tagged with provenance seed `seed + i`.
pub struct DeckGenerator {
    rng: GameRng,
    template: Vec<Symbol>,
    next_seed: u64,
    remaining: usize,
}

impl DeckGenerator {
    pub fn new(seed: u64, n_decks: usize, half_deck_size: usize) -> Result<Self, PenneyError> {
        if half_deck_size < 2 {
            return Err(PenneyError::InvalidArgument(format!(
                "half deck size must be at least 2, got {}",
                half_deck_size
            )));
        }
        if seed.checked_add(n_decks as u64).is_none() {
            return Err(PenneyError::InvalidArgument(format!(
                "{} decks starting at seed {} overflow the seed range",
                n_decks, seed
            )));
        }

        Ok(DeckGenerator {
            rng: GameRng::new(seed),
            template: Deck::canonical(half_deck_size).cards().to_vec(),
            next_seed: seed,
            remaining: n_decks,
        })
    }

    /// First seed not yet handed out; the start of any follow-up run
    pub fn next_seed(&self) -> u64 {
        self.next_seed
    }

    /// Pull up to `max` decks, keeping memory bounded for very large runs
    pub fn next_chunk(&mut self, max: usize) -> Vec<SeededDeck> {
        self.by_ref().take(max).collect()
    }
}

impl Iterator for DeckGenerator {
    type Item = SeededDeck;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let mut cards = self.template.clone();
        self.rng.shuffle(&mut cards);

        let seed = self.next_seed;
        self.next_seed += 1;
        self.remaining -= 1;

        Some(SeededDeck {
            seed,
            deck: Deck::from_permutation(cards),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for DeckGenerator {}

/// Generate `n_decks` shuffled decks of `2 * half_deck_size` cards.
/// Returns the decks and their provenance seeds `seed..seed + n_decks`.
pub fn generate(
    seed: u64,
    n_decks: usize,
    half_deck_size: usize,
) -> Result<(Vec<Deck>, Vec<u64>), PenneyError> {
    let generator = DeckGenerator::new(seed, n_decks, half_deck_size)?;
    let mut decks = Vec::with_capacity(n_decks);
    let mut seeds = Vec::with_capacity(n_decks);
    for SeededDeck { seed, deck } in generator {
        seeds.push(seed);
        decks.push(deck);
    }
    log::debug!("generated {} decks of {} cards", decks.len(), half_deck_size * 2);
    Ok((decks, seeds))
}
