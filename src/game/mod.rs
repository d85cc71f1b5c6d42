// Game engine modules

pub mod bag;
pub mod board;
pub mod bot;
pub mod engine;
pub mod placement;
pub mod player;
pub mod scorer;
pub mod table;
pub mod validator;

pub use bag::TileBag;
pub use board::Board;
pub use bot::{CandidateMove, GreedyBot, MoveStrategy, PassingBot};
pub use engine::{Game, PlayerHandle, Seat};
pub use placement::{PlacementRules, PlacementScore};
pub use player::{Controller, Player, HAND_SIZE};
pub use scorer::{ScoredWord, Scorer};
pub use table::{Table, WordPlan};
pub use validator::WordValidator;
