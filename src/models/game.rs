use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Letter, PlacedTile};

/// Static bonus printed on a board cell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Multiplier {
    #[serde(rename = "DL")]
    DoubleLetter,
    #[serde(rename = "TL")]
    TripleLetter,
    #[serde(rename = "DW")]
    DoubleWord,
    #[serde(rename = "TW")]
    TripleWord,
}

impl Multiplier {
    /// Factor applied to the letter sitting on this cell
    pub fn letter_factor(self) -> u32 {
        match self {
            Multiplier::DoubleLetter => 2,
            Multiplier::TripleLetter => 3,
            Multiplier::DoubleWord | Multiplier::TripleWord => 1,
        }
    }

    /// Factor applied to a whole word crossing this cell
    pub fn word_factor(self) -> u32 {
        match self {
            Multiplier::DoubleWord => 2,
            Multiplier::TripleWord => 3,
            Multiplier::DoubleLetter | Multiplier::TripleLetter => 1,
        }
    }
}

/// One grid position. The multiplier is fixed when the board is laid out;
/// the occupant changes as tiles are placed and picked up.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cell {
    pub(crate) multiplier: Option<Multiplier>,
    pub(crate) occupant: Option<Letter>,
}

impl Cell {
    pub fn multiplier(&self) -> Option<Multiplier> {
        self.multiplier
    }

    pub fn occupant(&self) -> Option<Letter> {
        self.occupant
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

/// Unique identity of a participant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PlayerId(Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlayerKind {
    Human,
    Bot,
}

/// Lifecycle of a game
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    NotStarted,
    InProgress,
    Ended,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// A draw was attempted on an empty tile bag
    BagExhausted,
    /// The game was stopped explicitly
    Stopped,
}

/// How a turn finished
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TurnOutcome {
    Placed { score: u32 },
    WordPlayed { score: u32 },
    Redrew { count: usize },
    Passed,
    TimedOut,
}

/// Which tiles a redraw exchanges
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "from", content = "letters", rename_all = "snake_case")]
pub enum RedrawRequest {
    /// These letters, which must all be in hand
    Tiles(Vec<Letter>),
    /// Whatever the player staged with `select_for_redraw`
    Selection,
}

/// Read-only view of a player
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub kind: PlayerKind,
    pub score: u32,
    pub hand: Vec<Letter>,
    pub pending: Vec<PlacedTile>,
    pub redraw_selection: Vec<Letter>,
    pub taking_turn: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreInfo {
    pub player_id: PlayerId,
    pub name: String,
    pub score: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_factors() {
        assert_eq!(Multiplier::DoubleLetter.letter_factor(), 2);
        assert_eq!(Multiplier::TripleLetter.letter_factor(), 3);
        assert_eq!(Multiplier::DoubleLetter.word_factor(), 1);
        assert_eq!(Multiplier::DoubleWord.word_factor(), 2);
        assert_eq!(Multiplier::TripleWord.word_factor(), 3);
        assert_eq!(Multiplier::TripleWord.letter_factor(), 1);
    }

    #[test]
    fn test_multiplier_serde_codes() {
        assert_eq!(
            serde_json::to_string(&Multiplier::TripleWord).unwrap(),
            "\"TW\""
        );
        let parsed: Multiplier = serde_json::from_str("\"DL\"").unwrap();
        assert_eq!(parsed, Multiplier::DoubleLetter);
    }

    #[test]
    fn test_player_ids_are_unique() {
        assert_ne!(PlayerId::new(), PlayerId::new());
    }
}
