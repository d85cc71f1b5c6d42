use thiserror::Error;

use crate::models::{Letter, PlayerId};

/// Reasons a confirmed batch of tentative tiles is not a legal move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("no tiles were placed this turn")]
    NoTilesPlaced,
    #[error("placed tiles must share a single row or column")]
    NotInLine,
    #[error("placed tiles leave a gap in the line")]
    NotContiguous,
    #[error("the first word must cover the center cell")]
    MissingCenter,
    #[error("placed tiles must touch a tile already on the board")]
    NotConnected,
    #[error("'{0}' is not in the dictionary")]
    InvalidWord(String),
    #[error("placement does not form a word of two or more letters")]
    NoWordFormed,
}

/// A rejected engine operation. Returning `Err` never leaves partial state behind,
/// except for placement confirmation which reverts the tentative tiles first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("coordinates ({x}, {y}) are off the board")]
    OutOfBounds { x: usize, y: usize },
    #[error("cell ({x}, {y}) is already occupied")]
    CellOccupied { x: usize, y: usize },
    #[error("cell ({x}, {y}) is empty")]
    CellEmpty { x: usize, y: usize },
    #[error("expected tile '{expected}' but found '{found}'")]
    LetterMismatch { expected: Letter, found: Letter },
    #[error("hand index {index} is out of range for a hand of {len}")]
    HandIndexOutOfRange { index: usize, len: usize },
    #[error("no tile was placed at ({x}, {y}) this turn")]
    NotPending { x: usize, y: usize },
    #[error("player is not taking a turn")]
    NotTakingTurn,
    #[error("tile '{0}' is not in hand")]
    TileNotInHand(Letter),
    #[error("nothing selected to redraw")]
    EmptySelection,
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
    #[error("placement rejected: {0}")]
    Placement(#[from] PlacementError),
    #[error("'{0}' is not in the dictionary")]
    InvalidWord(String),
    #[error("word does not fit on the board")]
    WordOutOfBounds,
    #[error("'{0}' is not a letter tile")]
    InvalidLetter(char),
    #[error("game is not in progress")]
    GameNotInProgress,
}

/// Malformed construction options. These are fatal: no game is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board size {0} must be odd so a center cell exists")]
    EvenDimension(usize),
    #[error("board size {size} is below the minimum of {min}")]
    BoardTooSmall { size: usize, min: usize },
    #[error("a game needs at least one player")]
    NoPlayers,
    #[error("{players} players need {needed} tiles but the bag only holds {available}")]
    TooManyPlayers {
        players: usize,
        needed: usize,
        available: usize,
    },
    #[error("multiplier at ({x}, {y}) is off a {size}x{size} board")]
    MultiplierOutOfBounds { x: usize, y: usize, size: usize },
    #[error("letter distribution is empty")]
    EmptyDistribution,
    #[error("invalid value '{value}' for {key}")]
    Invalid { key: &'static str, value: String },
}
