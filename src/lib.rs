//! Turn-based tile-placement word game engine.

pub mod config;
pub mod dictionary;
pub mod error;
pub mod events;
pub mod game;
pub mod models;
pub mod utils;

pub use config::{Config, GameConfig};
pub use dictionary::{Dictionary, WordLookup};
pub use error::{ConfigError, EngineError, PlacementError};
pub use events::{EventBus, EventKind, GameCommand, GameEvent};
pub use game::{Game, PlayerHandle, Seat};
