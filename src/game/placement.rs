//! Legality and scoring of a batch of tentatively placed tiles.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    error::PlacementError,
    game::{
        board::Board,
        scorer::{ScoredWord, Scorer},
        validator::WordValidator,
    },
    models::{PlacedTile, Position},
};

/// Every word a legal placement formed, and their total
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementScore {
    pub words: Vec<ScoredWord>,
    pub total: u32,
}

/// Placement rules. The only state is whether the game's first word has been
/// placed, which changes the anchoring requirement.
#[derive(Debug, Clone, Default)]
pub struct PlacementRules {
    first_word_placed: bool,
}

impl PlacementRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_word_placed(&self) -> bool {
        self.first_word_placed
    }

    /// Record that a word is on the board. Never cleared except by `reset`.
    pub fn mark_first_word_placed(&mut self) {
        self.first_word_placed = true;
    }

    pub fn reset(&mut self) {
        self.first_word_placed = false;
    }

    /// Check `placed` (already on `board`) and flip the first-word flag on success.
    pub fn validate(
        &mut self,
        board: &Board,
        placed: &[PlacedTile],
        validator: &WordValidator,
    ) -> Result<PlacementScore, PlacementError> {
        let score = self.evaluate(board, placed, validator)?;
        self.first_word_placed = true;
        Ok(score)
    }

    /// Check `placed` without changing any state
    pub fn evaluate(
        &self,
        board: &Board,
        placed: &[PlacedTile],
        validator: &WordValidator,
    ) -> Result<PlacementScore, PlacementError> {
        if placed.is_empty() {
            return Err(PlacementError::NoTilesPlaced);
        }

        check_line(board, placed)?;
        self.check_anchor(board, placed)?;

        let mut seen: HashSet<(Position, Position)> = HashSet::new();
        let mut words = Vec::new();

        for tile in placed {
            for horizontal in [true, false] {
                let (start, end) = run_through(board, tile.position(), horizontal);
                if start == end || !seen.insert((start, end)) {
                    continue;
                }

                let word = Scorer::word_at(board, start, end).unwrap_or_default();
                if !validator.is_valid_word(&word) {
                    tracing::debug!("Placement formed invalid word {}", word);
                    return Err(PlacementError::InvalidWord(word));
                }

                let score = Scorer::score_span(board, start, end);
                words.push(ScoredWord {
                    word,
                    start,
                    end,
                    score,
                });
            }
        }

        if words.is_empty() {
            return Err(PlacementError::NoWordFormed);
        }

        let total = words.iter().map(|w| w.score).sum();
        Ok(PlacementScore { words, total })
    }

    /// First move must cover the center; later moves must touch an existing tile
    fn check_anchor(&self, board: &Board, placed: &[PlacedTile]) -> Result<(), PlacementError> {
        if !self.first_word_placed {
            let center = board.center();
            if placed.iter().any(|tile| tile.position() == center) {
                return Ok(());
            }
            return Err(PlacementError::MissingCenter);
        }

        let new_cells: HashSet<Position> = placed.iter().map(PlacedTile::position).collect();
        let touches_existing = placed.iter().any(|tile| {
            neighbors(board, tile.position())
                .any(|pos| board.is_occupied(pos.x, pos.y) && !new_cells.contains(&pos))
        });

        if touches_existing {
            Ok(())
        } else {
            Err(PlacementError::NotConnected)
        }
    }
}

/// All tiles share one row or one column, with no empty cell between them
fn check_line(board: &Board, placed: &[PlacedTile]) -> Result<(), PlacementError> {
    if placed.len() < 2 {
        return Ok(());
    }

    let first = placed[0];
    let same_row = placed.iter().all(|t| t.y == first.y);
    let same_col = placed.iter().all(|t| t.x == first.x);

    let (lo, hi) = match (same_row, same_col) {
        (true, false) => {
            let xs = placed.iter().map(|t| t.x);
            (xs.clone().min(), xs.max())
        }
        (false, true) => {
            let ys = placed.iter().map(|t| t.y);
            (ys.clone().min(), ys.max())
        }
        _ => return Err(PlacementError::NotInLine),
    };
    let (Some(lo), Some(hi)) = (lo, hi) else {
        return Err(PlacementError::NoTilesPlaced);
    };

    let gap = (lo..=hi).any(|i| {
        let (x, y) = if same_row { (i, first.y) } else { (first.x, i) };
        !board.is_occupied(x, y)
    });
    if gap {
        return Err(PlacementError::NotContiguous);
    }
    Ok(())
}

/// Maximal run of occupied cells through `pos` along one axis
fn run_through(board: &Board, pos: Position, horizontal: bool) -> (Position, Position) {
    let mut start = pos;
    let mut end = pos;

    if horizontal {
        while start.x > 0 && board.is_occupied(start.x - 1, start.y) {
            start.x -= 1;
        }
        while board.is_occupied(end.x + 1, end.y) {
            end.x += 1;
        }
    } else {
        while start.y > 0 && board.is_occupied(start.x, start.y - 1) {
            start.y -= 1;
        }
        while board.is_occupied(end.x, end.y + 1) {
            end.y += 1;
        }
    }

    (start, end)
}

fn neighbors(board: &Board, pos: Position) -> impl Iterator<Item = Position> + '_ {
    let candidates = [
        pos.x.checked_sub(1).map(|x| Position::new(x, pos.y)),
        Some(Position::new(pos.x + 1, pos.y)),
        pos.y.checked_sub(1).map(|y| Position::new(pos.x, y)),
        Some(Position::new(pos.x, pos.y + 1)),
    ];
    candidates
        .into_iter()
        .flatten()
        .filter(move |p| board.in_bounds(p.x, p.y))
}
