use serde::{Deserialize, Serialize};

use crate::{game::board::Board, models::Position};

/// A word found on the board and what it scored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredWord {
    pub word: String,
    pub start: Position,
    pub end: Position,
    pub score: u32,
}

pub struct Scorer;

impl Scorer {
    /// Calculate the score for the word running from `start` to `end`
    /// (inclusive, same row or column).
    ///
    /// Scoring rules:
    /// - Each letter has a base value
    /// - DL / TL multiply that letter's value by 2 / 3
    /// - DW / TW multiply the ENTIRE word; only the largest word multiplier
    ///   on the word applies, and a later cell wins a tie
    /// - Empty cells contribute nothing
    pub fn score_span(board: &Board, start: Position, end: Position) -> u32 {
        let mut letter_total = 0;
        let mut word_factor = 1;

        for pos in span(start, end) {
            let Some(cell) = board.cell(pos.x, pos.y) else {
                continue;
            };
            let Some(letter) = cell.occupant() else {
                continue;
            };

            let (letter_factor, cell_word_factor) = cell
                .multiplier()
                .map_or((1, 1), |m| (m.letter_factor(), m.word_factor()));
            letter_total += letter.value() * letter_factor;

            if cell_word_factor >= word_factor {
                word_factor = cell_word_factor;
            }
        }

        letter_total * word_factor
    }

    /// Text of the word spanning `start..=end`, or `None` if a cell is empty
    pub fn word_at(board: &Board, start: Position, end: Position) -> Option<String> {
        span(start, end)
            .map(|pos| board.occupant(pos.x, pos.y).map(char::from))
            .collect()
    }
}

/// Positions from `start` to `end` inclusive along one row or column
pub fn span(start: Position, end: Position) -> impl Iterator<Item = Position> {
    let horizontal = start.y == end.y;
    let len = if horizontal {
        end.x.saturating_sub(start.x)
    } else {
        end.y.saturating_sub(start.y)
    };
    (0..=len).map(move |i| {
        if horizontal {
            Position::new(start.x + i, start.y)
        } else {
            Position::new(start.x, start.y + i)
        }
    })
}
