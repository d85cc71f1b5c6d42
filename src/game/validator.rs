use std::sync::Arc;

use crate::{
    dictionary::WordLookup,
    game::{board::Board, scorer::Scorer},
    models::Position,
};

/// Dictionary membership checks for words read off the board.
#[derive(Clone)]
pub struct WordValidator {
    lookup: Arc<dyn WordLookup>,
}

impl WordValidator {
    pub fn new(lookup: Arc<dyn WordLookup>) -> Self {
        Self { lookup }
    }

    /// Check if word exists in dictionary
    pub fn is_valid_word(&self, word: &str) -> bool {
        self.lookup.is_valid_word(&word.to_uppercase())
    }

    /// Extract the word spanning `start..=end` from the board
    pub fn extract_word(&self, board: &Board, start: Position, end: Position) -> Option<String> {
        Scorer::word_at(board, start, end)
    }

    /// Words a move generator may try
    pub fn candidate_words(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        self.lookup.words()
    }
}

impl std::fmt::Debug for WordValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordValidator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dictionary::Dictionary, models::Letter};

    struct OnlyCat;

    impl WordLookup for OnlyCat {
        fn is_valid_word(&self, word: &str) -> bool {
            word == "CAT"
        }
    }

    #[test]
    fn test_words_are_uppercased_before_lookup() {
        let validator = WordValidator::new(Arc::new(OnlyCat));
        assert!(validator.is_valid_word("cat"));
        assert!(!validator.is_valid_word("cats"));
    }

    #[test]
    fn test_non_enumerable_lookup_has_no_candidates() {
        let validator = WordValidator::new(Arc::new(OnlyCat));
        assert_eq!(validator.candidate_words().count(), 0);

        let validator = WordValidator::new(Arc::new(Dictionary::from_words(["cat", "dog"])));
        assert_eq!(validator.candidate_words().count(), 2);
    }

    #[test]
    fn test_extract_word() {
        let validator = WordValidator::new(Arc::new(OnlyCat));
        let mut board = Board::standard();
        for (i, ch) in "CAT".chars().enumerate() {
            board.place_tile(Letter::new(ch).unwrap(), 6 + i, 7).unwrap();
        }
        assert_eq!(
            validator.extract_word(&board, Position::new(6, 7), Position::new(8, 7)),
            Some("CAT".to_string())
        );
    }
}
