//! Automated move selection for bot players.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;

use crate::{
    game::{board::Board, table::Table},
    models::{Direction, Letter, PlacedTile, Position},
};

/// A legal placement found by a strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateMove {
    pub word: String,
    pub origin: Position,
    pub direction: Direction,
    /// Tiles to put down from the hand
    pub tiles: Vec<PlacedTile>,
    pub score: u32,
}

/// Decides a bot's move. `think` runs without holding the game, then
/// `choose_move` sees the table as it is at that moment.
#[async_trait]
pub trait MoveStrategy: Send + Sync {
    /// Simulated deliberation before the move is chosen
    async fn think(&self);

    /// The move to play, or `None` to pass
    fn choose_move(&self, table: &Table, hand: &[Letter]) -> Option<CandidateMove>;
}

/// Never plays a tile.
#[derive(Debug, Clone)]
pub struct PassingBot {
    thinking_delay: Duration,
}

impl PassingBot {
    pub fn new(thinking_delay: Duration) -> Self {
        Self { thinking_delay }
    }
}

#[async_trait]
impl MoveStrategy for PassingBot {
    async fn think(&self) {
        tokio::time::sleep(self.thinking_delay).await;
    }

    fn choose_move(&self, _table: &Table, _hand: &[Letter]) -> Option<CandidateMove> {
        None
    }
}

/// Plays the highest scoring dictionary word it can build.
///
/// Every word that can be spelled from the hand plus letters on the board is
/// tried at each position in both directions, and each attempt is checked
/// with the placement rules on a scratch copy of the board. Ties go to the
/// alphabetically first word, then the earliest origin.
#[derive(Debug, Clone)]
pub struct GreedyBot {
    thinking_delay: Duration,
}

impl GreedyBot {
    pub fn new(thinking_delay: Duration) -> Self {
        Self { thinking_delay }
    }
}

#[async_trait]
impl MoveStrategy for GreedyBot {
    async fn think(&self) {
        tokio::time::sleep(self.thinking_delay).await;
    }

    fn choose_move(&self, table: &Table, hand: &[Letter]) -> Option<CandidateMove> {
        let board = table.board();
        let size = board.size();

        let hand_counts = counts(hand.iter().copied());
        let mut pool = counts(board.rows().iter().flatten().filter_map(|cell| cell.occupant()));
        for (letter, n) in &hand_counts {
            *pool.entry(*letter).or_default() += n;
        }

        let mut scratch = board.clone();
        let mut best: Option<CandidateMove> = None;

        for word in table.validator().candidate_words() {
            if word.len() < 2 || word.len() > size {
                continue;
            }
            let Ok(letters) = Letter::parse_word(word) else {
                continue;
            };
            if !fits(&counts(letters.iter().copied()), &pool) {
                continue;
            }

            for direction in [Direction::Across, Direction::Down] {
                for y in 0..size {
                    for x in 0..size {
                        let origin = Position::new(x, y);
                        let Some(tiles) = tiles_needed(board, &letters, origin, direction) else {
                            continue;
                        };
                        let needed = counts(tiles.iter().map(|t| t.letter));
                        if tiles.is_empty() || !fits(&needed, &hand_counts) {
                            continue;
                        }

                        for tile in &tiles {
                            let _ = scratch.place_tile(tile.letter, tile.x, tile.y);
                        }
                        let result = table.rules().evaluate(&scratch, &tiles, table.validator());
                        for tile in &tiles {
                            let _ = scratch.remove_tile(tile.letter, tile.x, tile.y);
                        }

                        let Ok(placement) = result else {
                            continue;
                        };
                        let candidate = CandidateMove {
                            word: word.to_string(),
                            origin,
                            direction,
                            tiles,
                            score: placement.total,
                        };
                        if best.as_ref().map_or(true, |current| outranks(&candidate, current)) {
                            best = Some(candidate);
                        }
                    }
                }
            }
        }

        match &best {
            Some(candidate) => tracing::debug!(
                "Bot found {} at ({}, {}) for {} points",
                candidate.word,
                candidate.origin.x,
                candidate.origin.y,
                candidate.score
            ),
            None => tracing::debug!("Bot found no legal move"),
        }
        best
    }
}

/// Empty cells `letters` would fill starting at `origin`, or `None` if the
/// word runs off the board, clashes with a tile, or touches a tile at either end.
fn tiles_needed(
    board: &Board,
    letters: &[Letter],
    origin: Position,
    direction: Direction,
) -> Option<Vec<PlacedTile>> {
    let end = direction.step(origin, letters.len() - 1);
    if !board.in_bounds(end.x, end.y) {
        return None;
    }

    let before = match direction {
        Direction::Across => origin.x.checked_sub(1).map(|x| Position::new(x, origin.y)),
        Direction::Down => origin.y.checked_sub(1).map(|y| Position::new(origin.x, y)),
    };
    let after = direction.step(origin, letters.len());
    if before.is_some_and(|p| board.is_occupied(p.x, p.y)) || board.is_occupied(after.x, after.y) {
        return None;
    }

    let mut tiles = Vec::new();
    for (offset, &letter) in letters.iter().enumerate() {
        let pos = direction.step(origin, offset);
        match board.occupant(pos.x, pos.y) {
            Some(found) if found != letter => return None,
            Some(_) => {}
            None => tiles.push(PlacedTile::new(letter, pos.x, pos.y)),
        }
    }
    Some(tiles)
}

fn counts(letters: impl Iterator<Item = Letter>) -> HashMap<Letter, usize> {
    let mut map = HashMap::new();
    for letter in letters {
        *map.entry(letter).or_default() += 1;
    }
    map
}

fn fits(needed: &HashMap<Letter, usize>, available: &HashMap<Letter, usize>) -> bool {
    needed
        .iter()
        .all(|(letter, n)| available.get(letter).copied().unwrap_or(0) >= *n)
}

fn outranks(candidate: &CandidateMove, current: &CandidateMove) -> bool {
    let key = |m: &CandidateMove| {
        (
            std::cmp::Reverse(m.score),
            m.word.clone(),
            m.origin,
            m.direction == Direction::Down,
        )
    };
    key(candidate) < key(current)
}
