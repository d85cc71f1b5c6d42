use std::collections::HashMap;
use once_cell::sync::Lazy;

/// Standard board-game letter values
pub static LETTER_VALUES: Lazy<HashMap<char, u8>> = Lazy::new(|| {
    let mut map = HashMap::new();

    // 1 point letters
    for ch in ['A', 'E', 'I', 'O', 'U', 'L', 'N', 'R', 'S', 'T'] {
        map.insert(ch, 1);
    }

    // 2 points
    for ch in ['D', 'G'] {
        map.insert(ch, 2);
    }

    // 3 points
    for ch in ['B', 'C', 'M', 'P'] {
        map.insert(ch, 3);
    }

    // 4 points
    for ch in ['F', 'H', 'V', 'W', 'Y'] {
        map.insert(ch, 4);
    }

    // 5 points
    map.insert('K', 5);

    // 8 points
    for ch in ['J', 'X'] {
        map.insert(ch, 8);
    }

    // 10 points
    for ch in ['Q', 'Z'] {
        map.insert(ch, 10);
    }

    map
});

/// Tile counts in a full bag. Blanks are not part of this rule set.
pub const LETTER_DISTRIBUTION: [(char, usize); 26] = [
    ('A', 9),
    ('B', 2),
    ('C', 2),
    ('D', 4),
    ('E', 12),
    ('F', 2),
    ('G', 3),
    ('H', 2),
    ('I', 9),
    ('J', 1),
    ('K', 1),
    ('L', 4),
    ('M', 2),
    ('N', 6),
    ('O', 8),
    ('P', 2),
    ('Q', 1),
    ('R', 6),
    ('S', 4),
    ('T', 6),
    ('U', 4),
    ('V', 2),
    ('W', 2),
    ('X', 1),
    ('Y', 2),
    ('Z', 1),
];

/// Get the point value for a letter
pub fn get_letter_value(letter: char) -> u8 {
    let upper = letter.to_ascii_uppercase();
    *LETTER_VALUES.get(&upper).unwrap_or(&0)
}

/// Number of tiles a distribution puts in the bag
pub fn total_tiles(distribution: &[(char, usize)]) -> usize {
    distribution.iter().map(|(_, count)| count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_values() {
        assert_eq!(get_letter_value('E'), 1);
        assert_eq!(get_letter_value('c'), 3);
        assert_eq!(get_letter_value('Q'), 10);
        assert_eq!(get_letter_value('X'), 8);
        assert_eq!(get_letter_value('D'), 2);
    }

    #[test]
    fn test_non_letters_are_worth_nothing() {
        assert_eq!(get_letter_value('?'), 0);
    }

    #[test]
    fn test_standard_distribution() {
        assert_eq!(total_tiles(&LETTER_DISTRIBUTION), 98);
        // Every letter in the bag has a value
        assert!(LETTER_DISTRIBUTION
            .iter()
            .all(|(ch, _)| LETTER_VALUES.contains_key(ch)));
    }
}
