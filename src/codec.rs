//! Morse ↔ Latin text codec
//!
//! The alphabet is loaded once from an embedded table,
//! [`latin.dat`](MorseTable::parse). Each line carries the Latin
//! glyph in its first column and the dot/dash code in the rest of
//! the line. The [`code_to_text()`] and [`text_to_code()`] free
//! functions use a process-wide table; callers which prefer to
//! inject the table as a value can parse and hold their own
//! [`MorseTable`].

use std::collections::HashMap;

use lazy_static::lazy_static;
use thiserror::Error;

/// The embedded Latin alphabet, one `<glyph><code>` entry per line
const LATIN: &str = include_str!("latin.dat");

lazy_static! {
    static ref TABLE: MorseTable =
        MorseTable::parse(LATIN).expect("embedded alphabet table is well-formed");
}

/// An invalid line in the alphabet table
///
/// Every line must hold at least two characters: the Latin glyph
/// and a one-symbol-or-longer Morse code. This error is only
/// reachable when parsing a caller-provided table; the embedded
/// table is checked at first use.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("malformed alphabet table: line {line} is shorter than two characters")]
pub struct MalformedTableErr {
    /// One-based line number of the offending entry
    pub line: usize,
}

/// Bidirectional Morse ↔ Latin character table
///
/// Holds the forward (glyph → code) and reverse (code → glyph)
/// maps. Both are populated once by [`parse()`](MorseTable::parse)
/// and immutable thereafter, so a table may be freely shared
/// between threads.
#[derive(Clone, Debug, Default)]
pub struct MorseTable {
    forward: HashMap<char, String>,
    reverse: HashMap<String, char>,
}

impl MorseTable {
    /// Parse a line-oriented alphabet table
    ///
    /// Each line: Latin glyph at column 0, Morse code (dots and
    /// dashes) from column 1 to end of line. Returns
    /// [`MalformedTableErr`] for any line shorter than two
    /// characters.
    pub fn parse(table: &str) -> Result<Self, MalformedTableErr> {
        let mut out = Self::default();
        for (index, entry) in table.lines().enumerate() {
            let mut glyphs = entry.chars();
            match (glyphs.next(), glyphs.as_str()) {
                (Some(glyph), code) if !code.is_empty() => {
                    out.forward.insert(glyph, code.to_owned());
                    out.reverse.insert(code.to_owned(), glyph);
                }
                _ => {
                    return Err(MalformedTableErr { line: index + 1 });
                }
            }
        }
        Ok(out)
    }

    /// Convert a Morse code string to Latin text
    ///
    /// The input is split on single spaces; each token is looked
    /// up in the reverse map, and tokens not present in the table
    /// become `?`. Token order is preserved with no separator.
    /// Note that a two-space word gap yields one empty token and
    /// therefore one `?` between the words.
    pub fn decode(&self, code: &str) -> String {
        if code.is_empty() {
            return String::new();
        }
        code.split(' ')
            .map(|token| self.reverse.get(token).copied().unwrap_or('?'))
            .collect()
    }

    /// Convert Latin text to a Morse code string
    ///
    /// Characters are mapped forward and the resulting tokens are
    /// joined with single spaces. Characters absent from the table
    /// contribute an empty token; the join still inserts its
    /// separator.
    pub fn encode(&self, text: &str) -> String {
        let codes: Vec<&str> = text
            .chars()
            .map(|glyph| self.forward.get(&glyph).map(String::as_str).unwrap_or(""))
            .collect();
        codes.join(" ")
    }

    /// Iterate over the Latin glyphs present in the table
    pub fn glyphs(&self) -> impl Iterator<Item = char> + '_ {
        self.forward.keys().copied()
    }
}

/// Convert a Morse code string to Latin text using the embedded table
///
/// See [`MorseTable::decode`].
pub fn code_to_text(code: &str) -> String {
    TABLE.decode(code)
}

/// Convert Latin text to a Morse code string using the embedded table
///
/// See [`MorseTable::encode`].
pub fn text_to_code(text: &str) -> String {
    TABLE.encode(text)
}
