use crate::card::Deck;
use crate::error::PenneyError;
use crate::simulation::generate::SeededDeck;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid deck format at line {line}: {reason}")]
    InvalidFormat { line: usize, reason: String },
    #[error("{0}")]
    Deck(#[from] PenneyError),
}

/// Streams decks from text, one per line.
/// Format: "SEED SYMBOLS" or just "SYMBOLS" (`R`/`B` or `0`/`1`),
/// supports comments with # or //
pub struct DeckReader<R> {
    lines: Lines<R>,
    line_num: usize,
    next_seed: u64,
    deck_len: Option<usize>,
}

impl DeckReader<BufReader<File>> {
    /// Open a deck file written by `write_deck_file` (or by hand)
    pub fn open(path: &str) -> Result<Self, DeckError> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> DeckReader<R> {
    pub fn new(reader: R) -> Self {
        DeckReader {
            lines: reader.lines(),
            line_num: 0,
            next_seed: 0,
            deck_len: None,
        }
    }

    fn parse_line(&mut self, line: &str) -> Result<Option<SeededDeck>, DeckError> {
        let trimmed = line.trim();

        // Skip empty lines and comments
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
            return Ok(None);
        }

        let line_num = self.line_num;
        let invalid = |reason: String| DeckError::InvalidFormat {
            line: line_num,
            reason,
        };

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        let (seed, symbols) = match parts.as_slice() {
            [symbols] => (self.next_seed, *symbols),
            [seed, symbols] => {
                let seed: u64 = seed
                    .parse()
                    .map_err(|_| invalid(format!("'{}' is not a valid seed", seed)))?;
                (seed, *symbols)
            }
            _ => return Err(invalid("Expected format: '[SEED] SYMBOLS'".to_string())),
        };

        let deck: Deck = symbols
            .parse()
            .map_err(|e: PenneyError| invalid(e.to_string()))?;

        match self.deck_len {
            Some(len) if len != deck.len() => {
                return Err(invalid(format!(
                    "deck has {} cards, earlier decks have {}",
                    deck.len(),
                    len
                )));
            }
            Some(_) => {}
            None => self.deck_len = Some(deck.len()),
        }

        self.next_seed = seed.wrapping_add(1);
        Ok(Some(SeededDeck { seed, deck }))
    }
}

impl<R: BufRead> Iterator for DeckReader<R> {
    type Item = Result<SeededDeck, DeckError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_num += 1;
            match self.parse_line(&line) {
                Ok(Some(deck)) => return Some(Ok(deck)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Write decks as "SEED SYMBOLS" lines
pub fn write_decks<W: Write>(mut out: W, decks: &[SeededDeck]) -> Result<(), DeckError> {
    for SeededDeck { seed, deck } in decks {
        writeln!(out, "{} {}", seed, deck)?;
    }
    Ok(())
}

/// Append decks to a deck file, creating it if needed
pub fn write_deck_file(path: &str, decks: &[SeededDeck]) -> Result<(), DeckError> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let mut out = std::io::BufWriter::new(file);
    write_decks(&mut out, decks)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::generate::DeckGenerator;

    fn parse_decks(text: &str) -> Result<Vec<SeededDeck>, DeckError> {
        DeckReader::new(text.as_bytes()).collect()
    }

    #[test]
    fn test_parse_decks_with_seeds_and_comments() {
        let text = "# decks for H=2\n7 RBBR\n\n// numeric form\n8 0110\n";
        let decks = parse_decks(text).expect("valid decks");
        assert_eq!(decks.len(), 2);
        assert_eq!(decks[0].seed, 7);
        assert_eq!(decks[0].deck.to_string(), "RBBR");
        assert_eq!(decks[1].deck.to_string(), "RBBR");
    }

    #[test]
    fn test_seeds_default_to_line_order() {
        let decks = parse_decks("RRBB\nBBRR\n").unwrap();
        assert_eq!(decks[0].seed, 0);
        assert_eq!(decks[1].seed, 1);
    }

    #[test]
    fn test_invalid_symbol_reports_line() {
        let err = parse_decks("RRBB\nRRXB\n").unwrap_err();
        match err {
            DeckError::InvalidFormat { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_unbalanced_deck_is_rejected() {
        assert!(matches!(
            parse_decks("1 RRRB"),
            Err(DeckError::InvalidFormat { line: 1, .. })
        ));
    }

    #[test]
    fn test_mixed_lengths_are_rejected() {
        assert!(matches!(
            parse_decks("RRBB\nRRRBBB\n"),
            Err(DeckError::InvalidFormat { line: 2, .. })
        ));
    }

    #[test]
    fn test_bad_seed() {
        assert!(matches!(
            parse_decks("x RRBB"),
            Err(DeckError::InvalidFormat { line: 1, .. })
        ));
    }

    #[test]
    fn test_written_decks_parse_back() {
        let decks: Vec<_> = DeckGenerator::new(40, 5, 26).unwrap().collect();
        let mut buf = Vec::new();
        write_decks(&mut buf, &decks).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(parse_decks(&text).unwrap(), decks);
    }

    #[test]
    fn test_reader_yields_decks_before_a_bad_line() {
        let mut reader = DeckReader::new("3 RRBB\n4 BBRR\nRRXB\n5 RBRB\n".as_bytes());
        assert_eq!(reader.next().unwrap().unwrap().seed, 3);
        assert_eq!(reader.next().unwrap().unwrap().seed, 4);
        assert!(matches!(
            reader.next(),
            Some(Err(DeckError::InvalidFormat { line: 3, .. }))
        ));
    }

    #[test]
    fn test_deck_file_round_trip() {
        let decks: Vec<_> = DeckGenerator::new(7, 4, 5).unwrap().collect();
        let path = std::env::temp_dir().join(format!("penney-decks-{}.txt", std::process::id()));
        let path = path.to_string_lossy().to_string();
        std::fs::remove_file(&path).ok();
        write_deck_file(&path, &decks[..2]).unwrap();
        write_deck_file(&path, &decks[2..]).unwrap();
        let read: Result<Vec<_>, _> = DeckReader::open(&path).unwrap().collect();
        std::fs::remove_file(&path).ok();
        assert_eq!(read.unwrap(), decks);
    }
}
