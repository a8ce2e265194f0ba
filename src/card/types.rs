use crate::error::PenneyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of symbols in a combo
pub const COMBO_LEN: usize = 3;

/// Number of distinct combos (2^3)
pub const NUM_COMBOS: usize = 1 << COMBO_LEN;

/// Number of ordered matchups with distinct combos (8 * 7)
pub const NUM_MATCHUPS: usize = NUM_COMBOS * (NUM_COMBOS - 1);

/// Card colour in a two-symbol deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Red,
    Black,
}

impl Symbol {
    /// Convert to the single character representation
    pub fn to_char(self) -> char {
        match self {
            Symbol::Red => 'R',
            Symbol::Black => 'B',
        }
    }

    /// Numeric encoding: RED = 0, BLACK = 1
    pub fn bit(self) -> u8 {
        match self {
            Symbol::Red => 0,
            Symbol::Black => 1,
        }
    }

    /// Parse from `R`/`B` (any case) or the numeric `0`/`1` encoding
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'R' | 'r' | '0' => Some(Symbol::Red),
            'B' | 'b' | '1' => Some(Symbol::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A player's length-3 pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Combo([Symbol; COMBO_LEN]);

impl Combo {
    /// All 8 combos in binary order with RED = 0 (RRR, RRB, RBR, ... BBB).
    /// This ordering indexes the rows and columns of every probability matrix.
    pub const ALL: [Combo; NUM_COMBOS] = [
        Combo([Symbol::Red, Symbol::Red, Symbol::Red]),
        Combo([Symbol::Red, Symbol::Red, Symbol::Black]),
        Combo([Symbol::Red, Symbol::Black, Symbol::Red]),
        Combo([Symbol::Red, Symbol::Black, Symbol::Black]),
        Combo([Symbol::Black, Symbol::Red, Symbol::Red]),
        Combo([Symbol::Black, Symbol::Red, Symbol::Black]),
        Combo([Symbol::Black, Symbol::Black, Symbol::Red]),
        Combo([Symbol::Black, Symbol::Black, Symbol::Black]),
    ];

    /// Build a combo from a slice, which must hold exactly three symbols
    pub fn from_symbols(symbols: &[Symbol]) -> Result<Self, PenneyError> {
        let array: [Symbol; COMBO_LEN] = symbols.try_into().map_err(|_| {
            PenneyError::InvalidCombo(format!(
                "expected {} symbols, got {}",
                COMBO_LEN,
                symbols.len()
            ))
        })?;
        Ok(Combo(array))
    }

    /// Position of this combo in `Combo::ALL`
    pub fn index(&self) -> usize {
        self.0
            .iter()
            .fold(0, |acc, s| (acc << 1) | s.bit() as usize)
    }

    /// True when the combo occupies `window`
    #[inline]
    pub fn matches(&self, window: &[Symbol]) -> bool {
        window == self.0.as_slice()
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.0 {
            write!(f, "{}", s)?;
        }
        Ok(())
    }
}

impl FromStr for Combo {
    type Err = PenneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbols = s
            .trim()
            .chars()
            .map(|c| {
                Symbol::from_char(c)
                    .ok_or_else(|| PenneyError::InvalidCombo(format!("'{}' is not a symbol", c)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_symbols(&symbols)
    }
}

impl TryFrom<String> for Combo {
    type Error = PenneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Combo> for String {
    fn from(combo: Combo) -> Self {
        combo.to_string()
    }
}

/// An ordered pair of distinct combos: (P1's choice, P2's choice)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "MatchupRow", into = "MatchupRow")]
pub struct Matchup {
    p1: Combo,
    p2: Combo,
}

/// Stored shape of a matchup: one column per player's combo
#[derive(Serialize, Deserialize)]
struct MatchupRow {
    p1_combo: Combo,
    p2_combo: Combo,
}

impl TryFrom<MatchupRow> for Matchup {
    type Error = PenneyError;

    fn try_from(row: MatchupRow) -> Result<Self, Self::Error> {
        Matchup::new(row.p1_combo, row.p2_combo)
    }
}

impl From<Matchup> for MatchupRow {
    fn from(m: Matchup) -> Self {
        MatchupRow {
            p1_combo: m.p1,
            p2_combo: m.p2,
        }
    }
}

impl Matchup {
    /// Self-matchups are never scored, so equal combos are rejected here
    pub fn new(p1: Combo, p2: Combo) -> Result<Self, PenneyError> {
        if p1 == p2 {
            return Err(PenneyError::InvalidCombo(format!(
                "P1 and P2 both chose {}",
                p1
            )));
        }
        Ok(Matchup { p1, p2 })
    }

    pub fn p1(&self) -> Combo {
        self.p1
    }

    pub fn p2(&self) -> Combo {
        self.p2
    }

    /// Dense index in 0..56: P1 major, P2 minor, diagonal skipped
    pub fn index(&self) -> usize {
        let row = self.p1.index();
        let col = self.p2.index();
        let col = if col > row { col - 1 } else { col };
        row * (NUM_COMBOS - 1) + col
    }

    /// Every valid matchup in table order
    pub fn all() -> impl Iterator<Item = Matchup> {
        Combo::ALL.into_iter().flat_map(|p1| {
            Combo::ALL
                .into_iter()
                .filter(move |&p2| p2 != p1)
                .map(move |p2| Matchup { p1, p2 })
        })
    }
}

impl fmt::Display for Matchup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.p1, self.p2)
    }
}

/// A shuffled deck holding the same number of each symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Deck {
    cards: Vec<Symbol>,
}

impl Deck {
    /// Unshuffled deck: `half_deck_size` reds followed by as many blacks
    pub(crate) fn canonical(half_deck_size: usize) -> Self {
        let mut cards = vec![Symbol::Red; half_deck_size];
        cards.resize(half_deck_size * 2, Symbol::Black);
        Deck { cards }
    }

    /// Wrap symbols that are known to be a permutation of a canonical deck
    pub(crate) fn from_permutation(cards: Vec<Symbol>) -> Self {
        Deck { cards }
    }

    /// Validate an inbound deck: at least two of each symbol, equal counts
    pub fn from_symbols(cards: Vec<Symbol>) -> Result<Self, PenneyError> {
        let reds = cards.iter().filter(|&&s| s == Symbol::Red).count();
        let blacks = cards.len() - reds;
        if reds != blacks {
            return Err(PenneyError::InvalidDeck(format!(
                "{} red and {} black cards, counts must match",
                reds, blacks
            )));
        }
        if reds < 2 {
            return Err(PenneyError::InvalidDeck(format!(
                "deck of {} cards is too short to hold a combo",
                cards.len()
            )));
        }
        Ok(Deck { cards })
    }

    pub fn cards(&self) -> &[Symbol] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn half_deck_size(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn count(&self, symbol: Symbol) -> usize {
        self.cards.iter().filter(|&&s| s == symbol).count()
    }
}

impl fmt::Display for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.cards {
            write!(f, "{}", s)?;
        }
        Ok(())
    }
}

impl FromStr for Deck {
    type Err = PenneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cards = s
            .trim()
            .chars()
            .map(|c| {
                Symbol::from_char(c)
                    .ok_or_else(|| PenneyError::InvalidDeck(format!("'{}' is not a symbol", c)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_symbols(cards)
    }
}
