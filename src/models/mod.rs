pub mod game;
pub mod tile;

pub use game::{
    Cell, EndReason, GameStatus, Multiplier, PlayerId, PlayerKind, PlayerSnapshot, RedrawRequest,
    ScoreInfo, TurnOutcome,
};
pub use tile::{Direction, Letter, PlacedTile, Position};
