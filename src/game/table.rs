use crate::{
    error::{EngineError, PlacementError},
    events::GameEvent,
    game::{
        bag::TileBag,
        board::Board,
        placement::PlacementRules,
        scorer::{ScoredWord, Scorer},
        validator::WordValidator,
    },
    models::{Direction, Letter, PlacedTile, Position},
};

/// Shared play surface: board, bag, rules and the events produced while
/// mutating them. Players act on it during their turn.
pub struct Table {
    pub(crate) board: Board,
    pub(crate) bag: TileBag,
    pub(crate) rules: PlacementRules,
    pub(crate) validator: WordValidator,
    outbox: Vec<GameEvent>,
    bag_exhausted: bool,
}

/// A word entry checked against the board but not yet applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPlan {
    pub word: String,
    pub start: Position,
    pub end: Position,
    /// Letters that still have to be put down, in reading order
    pub missing: Vec<PlacedTile>,
}

impl Table {
    pub fn new(board: Board, bag: TileBag, validator: WordValidator) -> Self {
        Self {
            board,
            bag,
            rules: PlacementRules::new(),
            validator,
            outbox: Vec::new(),
            bag_exhausted: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn bag(&self) -> &TileBag {
        &self.bag
    }

    pub fn rules(&self) -> &PlacementRules {
        &self.rules
    }

    pub fn validator(&self) -> &WordValidator {
        &self.validator
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.outbox.push(event);
    }

    pub(crate) fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Draw the front tile. An empty bag marks the game for ending.
    pub fn draw_piece(&mut self) -> Option<Letter> {
        let piece = self.bag.draw();
        if piece.is_none() {
            tracing::info!("Tile bag exhausted");
            self.bag_exhausted = true;
        }
        piece
    }

    /// Whether a draw hit an empty bag since the last call
    pub(crate) fn take_exhausted(&mut self) -> bool {
        std::mem::take(&mut self.bag_exhausted)
    }

    pub fn place_tile(&mut self, letter: Letter, x: usize, y: usize) -> Result<(), EngineError> {
        self.board.place_tile(letter, x, y)?;
        tracing::debug!("Placed {} at ({}, {})", letter, x, y);
        self.emit(GameEvent::TilePlaced { letter, x, y });
        Ok(())
    }

    pub fn remove_tile(&mut self, expected: Letter, x: usize, y: usize) -> Result<Letter, EngineError> {
        let letter = self.board.remove_tile(expected, x, y)?;
        tracing::debug!("Removed {} from ({}, {})", letter, x, y);
        self.emit(GameEvent::TileRemoved { letter, x, y });
        Ok(letter)
    }

    pub fn plan_word(
        &self,
        word: &str,
        origin: Position,
        direction: Direction,
    ) -> Result<WordPlan, EngineError> {
        Self::plan_word_on(&self.board, &self.validator, word, origin, direction)
    }

    /// Check a whole-word entry: it must fit the board, agree with every
    /// letter already on its path, and be in the dictionary.
    pub fn plan_word_on(
        board: &Board,
        validator: &WordValidator,
        word: &str,
        origin: Position,
        direction: Direction,
    ) -> Result<WordPlan, EngineError> {
        let letters = Letter::parse_word(word)?;
        let Some(last) = letters.len().checked_sub(1) else {
            return Err(EngineError::InvalidWord(String::new()));
        };

        let end = direction.step(origin, last);
        if !board.in_bounds(origin.x, origin.y) || !board.in_bounds(end.x, end.y) {
            return Err(EngineError::WordOutOfBounds);
        }

        let mut missing = Vec::new();
        for (offset, &letter) in letters.iter().enumerate() {
            let pos = direction.step(origin, offset);
            match board.occupant(pos.x, pos.y) {
                Some(found) if found != letter => {
                    return Err(EngineError::LetterMismatch {
                        expected: letter,
                        found,
                    });
                }
                Some(_) => {}
                None => missing.push(PlacedTile::new(letter, pos.x, pos.y)),
            }
        }

        let word: String = letters.iter().map(|l| l.as_char()).collect();
        if !validator.is_valid_word(&word) {
            return Err(EngineError::InvalidWord(word));
        }
        if missing.is_empty() {
            return Err(PlacementError::NoTilesPlaced.into());
        }

        Ok(WordPlan {
            word,
            start: origin,
            end,
            missing,
        })
    }

    /// Put down the missing letters of a checked plan and score the word
    pub fn commit_word(&mut self, plan: &WordPlan) -> Result<ScoredWord, EngineError> {
        for (done, tile) in plan.missing.iter().enumerate() {
            if let Err(e) = self.place_tile(tile.letter, tile.x, tile.y) {
                for placed in &plan.missing[..done] {
                    let _ = self.remove_tile(placed.letter, placed.x, placed.y);
                }
                return Err(e);
            }
        }

        let score = Scorer::score_span(&self.board, plan.start, plan.end);
        self.rules.mark_first_word_placed();

        Ok(ScoredWord {
            word: plan.word.clone(),
            start: plan.start,
            end: plan.end,
            score,
        })
    }

    /// Empty board, full reshuffled bag, first move pending again
    pub(crate) fn reset(&mut self) {
        self.board.reset();
        self.bag.refill();
        self.bag.shuffle();
        self.rules.reset();
        self.bag_exhausted = false;
    }
}
