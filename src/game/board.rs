use serde::{Deserialize, Serialize};

use crate::{
    config::{MIN_BOARD_SIZE, STANDARD_BOARD_SIZE},
    error::{ConfigError, EngineError},
    models::{Cell, Letter, Multiplier, Position},
};

use Multiplier::{
    DoubleLetter as DL, DoubleWord as DW, TripleLetter as TL, TripleWord as TW,
};

/// Multiplier layout of the standard 15x15 board as `((x, y), multiplier)`
pub const DEFAULT_MULTIPLIERS: &[((usize, usize), Multiplier)] = &[
    ((0, 0), TW),
    ((7, 0), TW),
    ((14, 0), TW),
    ((0, 7), TW),
    ((14, 7), TW),
    ((0, 14), TW),
    ((7, 14), TW),
    ((14, 14), TW),
    ((1, 1), DW),
    ((2, 2), DW),
    ((3, 3), DW),
    ((4, 4), DW),
    ((1, 13), DW),
    ((2, 12), DW),
    ((3, 11), DW),
    ((4, 10), DW),
    ((10, 10), DW),
    ((11, 11), DW),
    ((12, 12), DW),
    ((13, 13), DW),
    ((13, 1), DW),
    ((12, 2), DW),
    ((11, 3), DW),
    ((10, 4), DW),
    ((7, 7), DW),
    ((5, 1), TL),
    ((9, 1), TL),
    ((1, 5), TL),
    ((5, 5), TL),
    ((9, 5), TL),
    ((13, 5), TL),
    ((1, 9), TL),
    ((5, 9), TL),
    ((9, 9), TL),
    ((13, 9), TL),
    ((5, 13), TL),
    ((9, 13), TL),
    ((3, 0), DL),
    ((11, 0), DL),
    ((6, 2), DL),
    ((8, 2), DL),
    ((7, 3), DL),
    ((0, 3), DL),
    ((14, 3), DL),
    ((2, 6), DL),
    ((2, 8), DL),
    ((3, 7), DL),
    ((6, 6), DL),
    ((6, 8), DL),
    ((8, 6), DL),
    ((8, 8), DL),
    ((11, 7), DL),
    ((12, 6), DL),
    ((12, 8), DL),
    ((0, 11), DL),
    ((14, 11), DL),
    ((7, 11), DL),
    ((6, 12), DL),
    ((8, 12), DL),
    ((3, 14), DL),
    ((11, 14), DL),
];

/// Square grid of cells indexed `[row][col]`. The side length is odd and
/// never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    cells: Vec<Vec<Cell>>,
    layout: Vec<(Position, Multiplier)>,
}

impl Board {
    /// Build an empty board and lay out its multipliers
    pub fn new(size: usize, layout: Vec<(Position, Multiplier)>) -> Result<Self, ConfigError> {
        if size < MIN_BOARD_SIZE {
            return Err(ConfigError::BoardTooSmall {
                size,
                min: MIN_BOARD_SIZE,
            });
        }
        if size % 2 == 0 {
            return Err(ConfigError::EvenDimension(size));
        }
        if let Some((pos, _)) = layout.iter().find(|(pos, _)| pos.x >= size || pos.y >= size) {
            return Err(ConfigError::MultiplierOutOfBounds {
                x: pos.x,
                y: pos.y,
                size,
            });
        }

        let mut board = Self {
            size,
            cells: vec![vec![Cell::default(); size]; size],
            layout,
        };
        board.reset();
        Ok(board)
    }

    /// The standard 15x15 board
    pub fn standard() -> Self {
        let layout = DEFAULT_MULTIPLIERS
            .iter()
            .map(|&((x, y), multiplier)| (Position::new(x, y), multiplier))
            .collect();
        Self {
            size: STANDARD_BOARD_SIZE,
            cells: vec![vec![Cell::default(); STANDARD_BOARD_SIZE]; STANDARD_BOARD_SIZE],
            layout,
        }
        .with_reset()
    }

    fn with_reset(mut self) -> Self {
        self.reset();
        self
    }

    /// Clear every occupant and re-apply the multiplier layout
    pub fn reset(&mut self) {
        for cell in self.cells.iter_mut().flatten() {
            cell.occupant = None;
            cell.multiplier = None;
        }
        for &(pos, multiplier) in &self.layout {
            self.cells[pos.y][pos.x].multiplier = Some(multiplier);
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn center(&self) -> Position {
        Position::new(self.size / 2, self.size / 2)
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        self.cells.get(y).and_then(|row| row.get(x))
    }

    pub fn occupant(&self, x: usize, y: usize) -> Option<Letter> {
        self.cell(x, y).and_then(Cell::occupant)
    }

    pub fn multiplier(&self, x: usize, y: usize) -> Option<Multiplier> {
        self.cell(x, y).and_then(Cell::multiplier)
    }

    /// Off-board coordinates count as unoccupied
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        self.occupant(x, y).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(|cell| !cell.is_occupied())
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    /// Put a letter on an empty cell. No word or adjacency rules are checked here.
    pub fn place_tile(&mut self, letter: Letter, x: usize, y: usize) -> Result<(), EngineError> {
        let cell = self.cell_mut(x, y)?;
        if cell.is_occupied() {
            return Err(EngineError::CellOccupied { x, y });
        }
        cell.occupant = Some(letter);
        Ok(())
    }

    /// Take a letter back off the board. The occupant must match `expected`.
    pub fn remove_tile(
        &mut self,
        expected: Letter,
        x: usize,
        y: usize,
    ) -> Result<Letter, EngineError> {
        let cell = self.cell_mut(x, y)?;
        match cell.occupant {
            None => Err(EngineError::CellEmpty { x, y }),
            Some(found) if found != expected => {
                Err(EngineError::LetterMismatch { expected, found })
            }
            Some(found) => {
                cell.occupant = None;
                Ok(found)
            }
        }
    }

    fn cell_mut(&mut self, x: usize, y: usize) -> Result<&mut Cell, EngineError> {
        self.cells
            .get_mut(y)
            .and_then(|row| row.get_mut(x))
            .ok_or(EngineError::OutOfBounds { x, y })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter(c: char) -> Letter {
        Letter::new(c).unwrap()
    }

    #[test]
    fn test_standard_board_layout() {
        let board = Board::standard();
        assert_eq!(board.size(), 15);
        assert_eq!(board.rows().len(), 15);
        assert!(board.rows().iter().all(|row| row.len() == 15));
        assert_eq!(board.center(), Position::new(7, 7));
        assert_eq!(board.multiplier(7, 7), Some(Multiplier::DoubleWord));
        assert_eq!(board.multiplier(0, 0), Some(Multiplier::TripleWord));
        assert_eq!(board.multiplier(3, 0), Some(Multiplier::DoubleLetter));
        assert_eq!(board.multiplier(5, 5), Some(Multiplier::TripleLetter));
        assert_eq!(board.multiplier(7, 8), None);
        assert!(board.is_empty());
    }

    #[test]
    fn test_layout_counts() {
        let board = Board::standard();
        let count = |m: Multiplier| {
            board
                .rows()
                .iter()
                .flatten()
                .filter(|cell| cell.multiplier() == Some(m))
                .count()
        };
        assert_eq!(count(Multiplier::TripleWord), 8);
        assert_eq!(count(Multiplier::DoubleWord), 17);
        assert_eq!(count(Multiplier::TripleLetter), 12);
        assert_eq!(count(Multiplier::DoubleLetter), 24);
    }

    #[test]
    fn test_even_and_tiny_boards_rejected() {
        assert_eq!(Board::new(10, vec![]), Err(ConfigError::EvenDimension(10)));
        assert!(matches!(
            Board::new(1, vec![]),
            Err(ConfigError::BoardTooSmall { .. })
        ));
    }

    #[test]
    fn test_place_tile() {
        let mut board = Board::standard();
        assert_eq!(board.place_tile(letter('a'), 7, 7), Ok(()));
        assert_eq!(board.occupant(7, 7), Some(letter('A')));
        // Multiplier survives placement
        assert_eq!(board.multiplier(7, 7), Some(Multiplier::DoubleWord));
    }

    #[test]
    fn test_place_tile_rejections_do_not_mutate() {
        let mut board = Board::standard();
        board.place_tile(letter('A'), 7, 7).unwrap();
        let before = board.clone();

        assert_eq!(
            board.place_tile(letter('B'), 7, 7),
            Err(EngineError::CellOccupied { x: 7, y: 7 })
        );
        assert_eq!(
            board.place_tile(letter('B'), 15, 0),
            Err(EngineError::OutOfBounds { x: 15, y: 0 })
        );
        assert_eq!(board, before);
    }

    #[test]
    fn test_remove_tile() {
        let mut board = Board::standard();
        board.place_tile(letter('C'), 2, 3).unwrap();

        assert_eq!(
            board.remove_tile(letter('D'), 2, 3),
            Err(EngineError::LetterMismatch {
                expected: letter('D'),
                found: letter('C'),
            })
        );
        assert_eq!(board.occupant(2, 3), Some(letter('C')), "Mismatch must not clear the cell");

        assert_eq!(board.remove_tile(letter('C'), 2, 3), Ok(letter('C')));
        assert!(!board.is_occupied(2, 3));
        assert_eq!(
            board.remove_tile(letter('C'), 2, 3),
            Err(EngineError::CellEmpty { x: 2, y: 3 })
        );
        assert_eq!(
            board.remove_tile(letter('C'), 20, 3),
            Err(EngineError::OutOfBounds { x: 20, y: 3 })
        );
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut board = Board::standard();
        board.place_tile(letter('X'), 0, 0).unwrap();
        board.place_tile(letter('Y'), 7, 7).unwrap();

        board.reset();
        let once = board.clone();
        board.reset();

        assert_eq!(board, once);
        assert!(board.is_empty());
        assert_eq!(board, Board::standard());
    }

    #[test]
    fn test_custom_layout() {
        let board = Board::new(5, vec![(Position::new(0, 4), Multiplier::TripleLetter)]).unwrap();
        assert_eq!(board.center(), Position::new(2, 2));
        assert_eq!(board.multiplier(0, 4), Some(Multiplier::TripleLetter));
        assert_eq!(board.multiplier(4, 0), None);
    }
}
