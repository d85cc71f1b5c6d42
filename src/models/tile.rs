use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error::EngineError, utils::letters::get_letter_value};

/// A letter tile, always stored uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Letter(char);

impl Letter {
    pub fn new(c: char) -> Result<Self, EngineError> {
        let upper = c.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Ok(Self(upper))
        } else {
            Err(EngineError::InvalidLetter(c))
        }
    }

    pub fn as_char(self) -> char {
        self.0
    }

    /// Base point value of the tile
    pub fn value(self) -> u32 {
        u32::from(get_letter_value(self.0))
    }

    /// Parse every character of `word` as a letter tile
    pub fn parse_word(word: &str) -> Result<Vec<Letter>, EngineError> {
        word.chars().map(Letter::new).collect()
    }
}

impl TryFrom<char> for Letter {
    type Error = EngineError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Letter::new(c)
    }
}

impl From<Letter> for char {
    fn from(letter: Letter) -> Self {
        letter.0
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A board coordinate. `x` is the column, `y` is the row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// A letter placed at a coordinate. Identifies a tentative placement for both
/// committing and reverting it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub struct PlacedTile {
    pub letter: Letter,
    pub x: usize,
    pub y: usize,
}

impl PlacedTile {
    pub fn new(letter: Letter, x: usize, y: usize) -> Self {
        Self { letter, x, y }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Reading direction of a word entered in one piece.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Left to right along a row
    Across,
    /// Top to bottom along a column
    Down,
}

impl Direction {
    /// Position `offset` cells from `origin` in this direction
    pub fn step(self, origin: Position, offset: usize) -> Position {
        match self {
            Direction::Across => Position::new(origin.x + offset, origin.y),
            Direction::Down => Position::new(origin.x, origin.y + offset),
        }
    }
}
