use std::collections::VecDeque;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{error::ConfigError, models::Letter};

/// Unbiased in-place shuffle: walk from the last index down to 1 and swap each
/// element with a uniformly chosen index at or before it.
pub fn fisher_yates<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// The reserve of tiles not yet drawn into any hand.
#[derive(Debug, Clone)]
pub struct TileBag {
    tiles: VecDeque<Letter>,
    full: Vec<Letter>,
    rng: StdRng,
}

impl TileBag {
    /// Fill a bag from `(letter, count)` pairs, in distribution order
    pub fn new(distribution: &[(char, usize)], seed: Option<u64>) -> Result<Self, ConfigError> {
        let mut full = Vec::new();
        for &(ch, count) in distribution {
            let letter = Letter::new(ch).map_err(|_| ConfigError::Invalid {
                key: "distribution",
                value: ch.to_string(),
            })?;
            full.extend(std::iter::repeat(letter).take(count));
        }
        if full.is_empty() {
            return Err(ConfigError::EmptyDistribution);
        }

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self::from_tiles(full, rng))
    }

    /// Bag holding exactly `tiles`, front first
    pub fn from_tiles(tiles: Vec<Letter>, rng: StdRng) -> Self {
        Self {
            tiles: tiles.iter().copied().collect(),
            full: tiles,
            rng,
        }
    }

    /// Put every tile back, in distribution order
    pub fn refill(&mut self) {
        self.tiles = self.full.iter().copied().collect();
    }

    /// Randomize the order of the remaining tiles
    pub fn shuffle(&mut self) {
        fisher_yates(self.tiles.make_contiguous(), &mut self.rng);
    }

    /// Remove and return the front tile. `None` means the bag is exhausted.
    pub fn draw(&mut self) -> Option<Letter> {
        self.tiles.pop_front()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of tiles in a full bag
    pub fn capacity(&self) -> usize {
        self.full.len()
    }

    pub fn remaining(&self) -> impl Iterator<Item = Letter> + '_ {
        self.tiles.iter().copied()
    }

    /// Random source shared with the rest of the game
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}
