use serde::{Deserialize, Serialize};

use crate::{
    error::PlacementError,
    game::scorer::ScoredWord,
    models::{
        Direction, EndReason, Letter, PlacedTile, PlayerId, PlayerKind, Position, RedrawRequest,
        ScoreInfo,
    },
};

/// Notifications pushed to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    GameStarted {
        players: Vec<RosterEntry>,
    },
    GameReset,
    GameEnded {
        reason: EndReason,
        final_scores: Vec<ScoreInfo>,
    },
    RoundCompleted {
        round: u32,
    },
    TurnStarted {
        player_id: PlayerId,
        /// `None` for an untimed turn
        time_limit_ms: Option<u64>,
    },
    TurnEnded {
        player_id: PlayerId,
        score: u32,
    },
    TilePlaced {
        letter: Letter,
        x: usize,
        y: usize,
    },
    TileRemoved {
        letter: Letter,
        x: usize,
        y: usize,
    },
    HandUpdated {
        player_id: PlayerId,
    },
    WordPlayed {
        player_id: PlayerId,
        words: Vec<ScoredWord>,
        score: u32,
    },
    PlacementRejected {
        player_id: PlayerId,
        reason: String,
    },
    Redrew {
        player_id: PlayerId,
        count: usize,
    },
    Passed {
        player_id: PlayerId,
    },
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::GameStarted { .. } => EventKind::GameStarted,
            GameEvent::GameReset => EventKind::GameReset,
            GameEvent::GameEnded { .. } => EventKind::GameEnded,
            GameEvent::RoundCompleted { .. } => EventKind::RoundCompleted,
            GameEvent::TurnStarted { .. } => EventKind::TurnStarted,
            GameEvent::TurnEnded { .. } => EventKind::TurnEnded,
            GameEvent::TilePlaced { .. } => EventKind::TilePlaced,
            GameEvent::TileRemoved { .. } => EventKind::TileRemoved,
            GameEvent::HandUpdated { .. } => EventKind::HandUpdated,
            GameEvent::WordPlayed { .. } => EventKind::WordPlayed,
            GameEvent::PlacementRejected { .. } => EventKind::PlacementRejected,
            GameEvent::Redrew { .. } => EventKind::Redrew,
            GameEvent::Passed { .. } => EventKind::Passed,
        }
    }

    pub(crate) fn placement_rejected(player_id: PlayerId, reason: &PlacementError) -> Self {
        GameEvent::PlacementRejected {
            player_id,
            reason: reason.to_string(),
        }
    }
}

/// Payload-free tag of a `GameEvent`, for filtered subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    GameStarted,
    GameReset,
    GameEnded,
    RoundCompleted,
    TurnStarted,
    TurnEnded,
    TilePlaced,
    TileRemoved,
    HandUpdated,
    WordPlayed,
    PlacementRejected,
    Redrew,
    Passed,
}

/// Player commands submitted as messages rather than direct calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameCommand {
    PlaceTile {
        player_id: PlayerId,
        tile: PlacedTile,
        hand_index: usize,
    },
    PickUpTile {
        player_id: PlayerId,
        tile: PlacedTile,
    },
    ConfirmPlacement {
        player_id: PlayerId,
    },
    SelectForRedraw {
        player_id: PlayerId,
        hand_index: usize,
    },
    DeselectRedraw {
        player_id: PlayerId,
        selection_index: usize,
    },
    Redraw {
        player_id: PlayerId,
        request: RedrawRequest,
    },
    Pass {
        player_id: PlayerId,
    },
    SwapTiles {
        player_id: PlayerId,
        first: usize,
        second: usize,
    },
    PlayWord {
        player_id: PlayerId,
        word: String,
        origin: Position,
        direction: Direction,
    },
}

impl GameCommand {
    pub fn player_id(&self) -> PlayerId {
        match self {
            GameCommand::PlaceTile { player_id, .. }
            | GameCommand::PickUpTile { player_id, .. }
            | GameCommand::ConfirmPlacement { player_id }
            | GameCommand::SelectForRedraw { player_id, .. }
            | GameCommand::DeselectRedraw { player_id, .. }
            | GameCommand::Redraw { player_id, .. }
            | GameCommand::Pass { player_id }
            | GameCommand::SwapTiles { player_id, .. }
            | GameCommand::PlayWord { player_id, .. } => *player_id,
        }
    }
}

/// One seat in turn order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub player_id: PlayerId,
    pub name: String,
    pub kind: PlayerKind,
}
