use std::sync::Arc;

use tokio::{sync::oneshot, task::AbortHandle};

use crate::{
    error::EngineError,
    events::GameEvent,
    game::{
        bot::{CandidateMove, MoveStrategy},
        placement::PlacementScore,
        table::Table,
    },
    models::{
        Direction, Letter, PlacedTile, PlayerId, PlayerKind, PlayerSnapshot, Position,
        RedrawRequest, TurnOutcome,
    },
};

/// Tiles a hand is refilled to at the end of every turn
pub const HAND_SIZE: usize = 7;

/// Who decides a player's moves
#[derive(Clone)]
pub enum Controller {
    /// Moves arrive as commands from outside the engine
    Human,
    /// Moves are searched for by a strategy
    Bot(Arc<dyn MoveStrategy>),
}

impl Controller {
    pub fn kind(&self) -> PlayerKind {
        match self {
            Controller::Human => PlayerKind::Human,
            Controller::Bot(_) => PlayerKind::Bot,
        }
    }
}

/// Bookkeeping for the turn in progress
struct ActiveTurn {
    seq: u64,
    done: Option<oneshot::Sender<TurnOutcome>>,
    timer: Option<AbortHandle>,
}

/// One participant: hand, score, tentative placements and turn state.
///
/// Every turn action fails with `NotTakingTurn` outside the player's turn and
/// leaves no trace when it returns `Err`, except `confirm_placement` which
/// reverts the tentative tiles first.
pub struct Player {
    id: PlayerId,
    name: String,
    controller: Controller,
    score: u32,
    hand: Vec<Letter>,
    pending: Vec<PlacedTile>,
    redraw_selection: Vec<Letter>,
    turn: Option<ActiveTurn>,
}

impl Player {
    pub fn new(name: impl Into<String>, controller: Controller) -> Self {
        Self {
            id: PlayerId::new(),
            name: name.into(),
            controller,
            score: 0,
            hand: Vec::with_capacity(HAND_SIZE),
            pending: Vec::new(),
            redraw_selection: Vec::new(),
            turn: None,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PlayerKind {
        self.controller.kind()
    }

    pub fn strategy(&self) -> Option<Arc<dyn MoveStrategy>> {
        match &self.controller {
            Controller::Human => None,
            Controller::Bot(strategy) => Some(strategy.clone()),
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn hand(&self) -> &[Letter] {
        &self.hand
    }

    pub fn pending(&self) -> &[PlacedTile] {
        &self.pending
    }

    pub fn is_taking_turn(&self) -> bool {
        self.turn.is_some()
    }

    pub(crate) fn turn_seq(&self) -> Option<u64> {
        self.turn.as_ref().map(|turn| turn.seq)
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind(),
            score: self.score,
            hand: self.hand.clone(),
            pending: self.pending.clone(),
            redraw_selection: self.redraw_selection.clone(),
            taking_turn: self.is_taking_turn(),
        }
    }

    /// Fill an empty hand at construction or reset
    pub(crate) fn deal(&mut self, table: &mut Table) {
        for _ in 0..HAND_SIZE {
            match table.draw_piece() {
                Some(letter) => self.hand.push(letter),
                None => break,
            }
        }
    }

    /// Back to a fresh seat with a new hand
    pub(crate) fn reset(&mut self, table: &mut Table) {
        self.cancel_turn();
        self.score = 0;
        self.hand.clear();
        self.pending.clear();
        self.redraw_selection.clear();
        self.deal(table);
    }

    /// Enter the turn. Returns `None` if a turn is already running.
    pub(crate) fn begin_turn(&mut self, seq: u64) -> Option<oneshot::Receiver<TurnOutcome>> {
        if self.turn.is_some() {
            return None;
        }
        let (tx, rx) = oneshot::channel();
        self.turn = Some(ActiveTurn {
            seq,
            done: Some(tx),
            timer: None,
        });
        tracing::info!("{}'s turn started", self.name);
        Some(rx)
    }

    pub(crate) fn set_timer(&mut self, timer: AbortHandle) {
        match self.turn.as_mut() {
            Some(turn) => turn.timer = Some(timer),
            None => timer.abort(),
        }
    }

    /// Drop the turn without resolving it. The turn's receiver sees a closed channel.
    pub(crate) fn cancel_turn(&mut self) {
        if let Some(turn) = self.turn.take() {
            if let Some(timer) = turn.timer {
                timer.abort();
            }
            self.hand.append(&mut self.redraw_selection);
            tracing::debug!("{}'s turn cancelled", self.name);
        }
    }

    /// Time ran out: take back tentative tiles and end the turn
    pub(crate) fn expire(&mut self, table: &mut Table) {
        if self.turn.is_none() {
            return;
        }
        tracing::warn!("{}'s turn timed out", self.name);
        self.revert_pending(table);
        self.end_turn(table, TurnOutcome::TimedOut);
    }

    pub fn place_tile(
        &mut self,
        table: &mut Table,
        tile: PlacedTile,
        hand_index: usize,
    ) -> Result<(), EngineError> {
        self.ensure_turn()?;
        let found = *self
            .hand
            .get(hand_index)
            .ok_or(EngineError::HandIndexOutOfRange {
                index: hand_index,
                len: self.hand.len(),
            })?;
        if found != tile.letter {
            return Err(EngineError::LetterMismatch {
                expected: tile.letter,
                found,
            });
        }

        table.place_tile(tile.letter, tile.x, tile.y)?;
        self.hand.remove(hand_index);
        self.pending.push(tile);
        table.emit(GameEvent::HandUpdated { player_id: self.id });
        Ok(())
    }

    /// Take back a tile placed this turn
    pub fn pick_up_tile(&mut self, table: &mut Table, tile: PlacedTile) -> Result<(), EngineError> {
        self.ensure_turn()?;
        let index = self
            .pending
            .iter()
            .position(|p| *p == tile)
            .ok_or(EngineError::NotPending { x: tile.x, y: tile.y })?;

        let letter = table.remove_tile(tile.letter, tile.x, tile.y)?;
        self.pending.remove(index);
        self.hand.push(letter);
        table.emit(GameEvent::HandUpdated { player_id: self.id });
        Ok(())
    }

    /// Score the tentative tiles and end the turn, or put them back in hand
    /// and keep the turn open.
    pub fn confirm_placement(&mut self, table: &mut Table) -> Result<PlacementScore, EngineError> {
        self.ensure_turn()?;

        let result = table
            .rules
            .validate(&table.board, &self.pending, &table.validator);

        match result {
            Ok(placement) => {
                self.score += placement.total;
                self.pending.clear();
                tracing::info!("{} scored {} points", self.name, placement.total);
                table.emit(GameEvent::WordPlayed {
                    player_id: self.id,
                    words: placement.words.clone(),
                    score: placement.total,
                });
                self.end_turn(
                    table,
                    TurnOutcome::Placed {
                        score: placement.total,
                    },
                );
                Ok(placement)
            }
            Err(reason) => {
                tracing::debug!("{} placement rejected: {}", self.name, reason);
                self.revert_pending(table);
                table.emit(GameEvent::placement_rejected(self.id, &reason));
                Err(reason.into())
            }
        }
    }

    /// Stage a hand tile for redrawing
    pub fn select_for_redraw(&mut self, table: &mut Table, hand_index: usize) -> Result<(), EngineError> {
        self.ensure_turn()?;
        if hand_index >= self.hand.len() {
            return Err(EngineError::HandIndexOutOfRange {
                index: hand_index,
                len: self.hand.len(),
            });
        }
        let letter = self.hand.remove(hand_index);
        self.redraw_selection.push(letter);
        table.emit(GameEvent::HandUpdated { player_id: self.id });
        Ok(())
    }

    /// Move a staged tile back into the hand
    pub fn deselect_redraw(
        &mut self,
        table: &mut Table,
        selection_index: usize,
    ) -> Result<(), EngineError> {
        self.ensure_turn()?;
        if selection_index >= self.redraw_selection.len() {
            return Err(EngineError::HandIndexOutOfRange {
                index: selection_index,
                len: self.redraw_selection.len(),
            });
        }
        let letter = self.redraw_selection.remove(selection_index);
        self.hand.push(letter);
        table.emit(GameEvent::HandUpdated { player_id: self.id });
        Ok(())
    }

    /// Discard tiles, draw as many replacements from the reshuffled bag and
    /// end the turn. Returns the number of tiles exchanged.
    pub fn redraw(&mut self, table: &mut Table, request: RedrawRequest) -> Result<usize, EngineError> {
        self.ensure_turn()?;

        let count = match request {
            RedrawRequest::Tiles(letters) => {
                if letters.is_empty() {
                    return Err(EngineError::EmptySelection);
                }
                // Locate every tile before removing any
                let mut indices = locate(&self.hand, &letters)?;
                indices.sort_unstable_by(|a, b| b.cmp(a));
                for index in indices {
                    self.hand.remove(index);
                }
                letters.len()
            }
            RedrawRequest::Selection => {
                if self.redraw_selection.is_empty() {
                    return Err(EngineError::EmptySelection);
                }
                let count = self.redraw_selection.len();
                self.redraw_selection.clear();
                count
            }
        };

        table.bag.shuffle();
        for _ in 0..count {
            match table.draw_piece() {
                Some(letter) => self.hand.push(letter),
                None => break,
            }
        }

        tracing::info!("{} redrew {} tiles", self.name, count);
        table.emit(GameEvent::Redrew {
            player_id: self.id,
            count,
        });
        self.end_turn(table, TurnOutcome::Redrew { count });
        Ok(count)
    }

    pub fn pass_turn(&mut self, table: &mut Table) -> Result<(), EngineError> {
        self.ensure_turn()?;
        tracing::info!("{} passed", self.name);
        table.emit(GameEvent::Passed { player_id: self.id });
        self.end_turn(table, TurnOutcome::Passed);
        Ok(())
    }

    /// Reorder two hand slots. The turn continues.
    pub fn swap_tiles(&mut self, table: &mut Table, first: usize, second: usize) -> Result<(), EngineError> {
        self.ensure_turn()?;
        let len = self.hand.len();
        for index in [first, second] {
            if index >= len {
                return Err(EngineError::HandIndexOutOfRange { index, len });
            }
        }
        self.hand.swap(first, second);
        table.emit(GameEvent::HandUpdated { player_id: self.id });
        Ok(())
    }

    /// Enter a whole word in one step using tiles from hand, then end the turn
    pub fn play_word(
        &mut self,
        table: &mut Table,
        word: &str,
        origin: Position,
        direction: Direction,
    ) -> Result<u32, EngineError> {
        self.ensure_turn()?;

        // Plan against the board as it was before this turn's tentative tiles
        let mut board = table.board.clone();
        let mut available = self.hand.clone();
        for tile in &self.pending {
            board.remove_tile(tile.letter, tile.x, tile.y)?;
            available.push(tile.letter);
        }
        let plan = Table::plan_word_on(&board, &table.validator, word, origin, direction)?;
        let needed: Vec<Letter> = plan.missing.iter().map(|tile| tile.letter).collect();
        locate(&available, &needed)?;

        self.revert_pending(table);
        let mut indices = locate(&self.hand, &needed)?;
        indices.sort_unstable_by(|a, b| b.cmp(a));
        for index in indices {
            self.hand.remove(index);
        }

        let scored = match table.commit_word(&plan) {
            Ok(scored) => scored,
            Err(e) => {
                self.hand.extend(needed);
                return Err(e);
            }
        };

        self.score += scored.score;
        tracing::info!("{} played {} for {} points", self.name, scored.word, scored.score);
        let score = scored.score;
        table.emit(GameEvent::WordPlayed {
            player_id: self.id,
            words: vec![scored],
            score,
        });
        self.end_turn(table, TurnOutcome::WordPlayed { score });
        Ok(score)
    }

    /// Put down a move found by a strategy and confirm it
    pub(crate) fn play_candidate(
        &mut self,
        table: &mut Table,
        candidate: &CandidateMove,
    ) -> Result<PlacementScore, EngineError> {
        for tile in &candidate.tiles {
            let placed = self
                .hand
                .iter()
                .position(|&letter| letter == tile.letter)
                .ok_or(EngineError::TileNotInHand(tile.letter))
                .and_then(|index| self.place_tile(table, *tile, index));
            if let Err(e) = placed {
                self.revert_pending(table);
                return Err(e);
            }
        }
        self.confirm_placement(table)
    }

    fn ensure_turn(&self) -> Result<(), EngineError> {
        if self.turn.is_some() {
            Ok(())
        } else {
            Err(EngineError::NotTakingTurn)
        }
    }

    fn revert_pending(&mut self, table: &mut Table) {
        if self.pending.is_empty() {
            return;
        }
        for tile in std::mem::take(&mut self.pending) {
            match table.remove_tile(tile.letter, tile.x, tile.y) {
                Ok(letter) => self.hand.push(letter),
                Err(e) => tracing::warn!(
                    "Could not take back {} at ({}, {}): {}",
                    tile.letter,
                    tile.x,
                    tile.y,
                    e
                ),
            }
        }
        table.emit(GameEvent::HandUpdated { player_id: self.id });
    }

    fn draw_to_full(&mut self, table: &mut Table) {
        while self.hand.len() < HAND_SIZE && !table.bag.is_empty() {
            match table.draw_piece() {
                Some(letter) => self.hand.push(letter),
                None => break,
            }
        }
    }

    /// Stop the timer, refill the hand and resolve the turn
    fn end_turn(&mut self, table: &mut Table, outcome: TurnOutcome) {
        let Some(turn) = self.turn.take() else {
            return;
        };
        if let Some(timer) = turn.timer {
            timer.abort();
        }

        self.hand.append(&mut self.redraw_selection);
        self.draw_to_full(table);
        table.emit(GameEvent::HandUpdated { player_id: self.id });

        if let Some(done) = turn.done {
            let _ = done.send(outcome);
        }
        tracing::info!("{}'s turn ended", self.name);
    }

    #[cfg(test)]
    pub(crate) fn set_hand(&mut self, letters: Vec<Letter>) {
        self.hand = letters;
    }
}

/// Indices of `wanted` in `hand`, each hand slot used at most once
fn locate(hand: &[Letter], wanted: &[Letter]) -> Result<Vec<usize>, EngineError> {
    let mut used = vec![false; hand.len()];
    wanted
        .iter()
        .map(|&letter| {
            let index = hand
                .iter()
                .enumerate()
                .position(|(i, &held)| held == letter && !used[i])
                .ok_or(EngineError::TileNotInHand(letter))?;
            used[index] = true;
            Ok(index)
        })
        .collect()
}
