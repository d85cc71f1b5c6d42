use anyhow::{Context, Result};
use serde::Deserialize;
use std::{env, str::FromStr, time::Duration};

use crate::{
    error::ConfigError,
    game::board::DEFAULT_MULTIPLIERS,
    game::player::HAND_SIZE,
    models::{Multiplier, Position},
    utils::letters::{total_tiles, LETTER_DISTRIBUTION},
};

/// Smallest board side length accepted
pub const MIN_BOARD_SIZE: usize = 5;
/// Side length of the standard board and its multiplier layout
pub const STANDARD_BOARD_SIZE: usize = 15;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub game: GameConfig,
    pub dictionary_path: String,
    /// Stop the demo game after this many rounds
    pub max_rounds: Option<u32>,
}

/// Options a game is constructed from
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_size: usize,
    pub player_count: usize,
    /// Display names for the human players; missing names are generated
    pub player_names: Vec<String>,
    pub bot_count: usize,
    /// Time allowed for a human turn; `None` waits forever
    pub turn_time_limit: Option<Duration>,
    pub bot_thinking_delay: Duration,
    /// Replaces the standard multiplier layout
    pub multipliers: Option<Vec<(Position, Multiplier)>>,
    /// Replaces the standard letter distribution
    pub distribution: Option<Vec<(char, usize)>>,
    /// Fixed seed for reproducible shuffles
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: STANDARD_BOARD_SIZE,
            player_count: 2,
            player_names: Vec::new(),
            bot_count: 0,
            turn_time_limit: Some(Duration::from_secs(60)),
            bot_thinking_delay: Duration::from_millis(2000),
            multipliers: None,
            distribution: None,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Reject options that cannot produce a playable game
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size < MIN_BOARD_SIZE {
            return Err(ConfigError::BoardTooSmall {
                size: self.board_size,
                min: MIN_BOARD_SIZE,
            });
        }
        if self.board_size % 2 == 0 {
            return Err(ConfigError::EvenDimension(self.board_size));
        }

        let players = self.player_count + self.bot_count;
        if players == 0 {
            return Err(ConfigError::NoPlayers);
        }

        if let Some(layout) = &self.multipliers {
            if let Some((pos, _)) = layout
                .iter()
                .find(|(pos, _)| pos.x >= self.board_size || pos.y >= self.board_size)
            {
                return Err(ConfigError::MultiplierOutOfBounds {
                    x: pos.x,
                    y: pos.y,
                    size: self.board_size,
                });
            }
        }

        let distribution = self.distribution();
        let available = total_tiles(&distribution);
        if available == 0 {
            return Err(ConfigError::EmptyDistribution);
        }
        if let Some((ch, _)) = distribution.iter().find(|(ch, _)| !ch.is_ascii_alphabetic()) {
            return Err(ConfigError::Invalid {
                key: "distribution",
                value: ch.to_string(),
            });
        }
        let needed = players * HAND_SIZE;
        if needed > available {
            return Err(ConfigError::TooManyPlayers {
                players,
                needed,
                available,
            });
        }

        Ok(())
    }

    /// Multiplier layout to apply on every board reset. Boards other than the
    /// standard size only get a double word on the center cell by default.
    pub fn multiplier_layout(&self) -> Vec<(Position, Multiplier)> {
        match &self.multipliers {
            Some(layout) => layout.clone(),
            None if self.board_size == STANDARD_BOARD_SIZE => DEFAULT_MULTIPLIERS
                .iter()
                .map(|&((x, y), multiplier)| (Position::new(x, y), multiplier))
                .collect(),
            None => {
                let center = self.board_size / 2;
                vec![(Position::new(center, center), Multiplier::DoubleWord)]
            }
        }
    }

    pub fn distribution(&self) -> Vec<(char, usize)> {
        self.distribution
            .clone()
            .unwrap_or_else(|| LETTER_DISTRIBUTION.to_vec())
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let turn_secs: u64 = parse_var("TURN_TIME_LIMIT", 60)?;
        let seed = match env::var("RNG_SEED") {
            Ok(value) => Some(value.parse().context("RNG_SEED must be a number")?),
            Err(_) => None,
        };

        let game = GameConfig {
            board_size: parse_var("BOARD_SIZE", STANDARD_BOARD_SIZE)?,
            player_count: parse_var("PLAYER_COUNT", 2)?,
            player_names: env::var("PLAYER_NAMES")
                .map(|names| {
                    names
                        .split(',')
                        .map(|name| name.trim().to_string())
                        .filter(|name| !name.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            bot_count: parse_var("BOT_COUNT", 0)?,
            turn_time_limit: (turn_secs > 0).then(|| Duration::from_secs(turn_secs)),
            bot_thinking_delay: Duration::from_millis(parse_var("BOT_THINKING_DELAY_MS", 2000)?),
            multipliers: None,
            distribution: None,
            seed,
        };
        game.validate().context("Invalid game configuration")?;

        let max_rounds = match env::var("MAX_ROUNDS") {
            Ok(value) => Some(value.parse().context("MAX_ROUNDS must be a number")?),
            Err(_) => None,
        };

        Ok(Config {
            game,
            dictionary_path: env::var("DICTIONARY_PATH")
                .unwrap_or_else(|_| "./dictionary.txt".to_string()),
            max_rounds,
        })
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number", key)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_even_board_rejected() {
        let config = GameConfig {
            board_size: 14,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EvenDimension(14)));
    }

    #[test]
    fn test_tiny_board_rejected() {
        let config = GameConfig {
            board_size: 3,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BoardTooSmall { size: 3, .. })
        ));
    }

    #[test]
    fn test_no_players_rejected() {
        let config = GameConfig {
            player_count: 0,
            bot_count: 0,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoPlayers));
    }

    #[test]
    fn test_bag_must_cover_opening_hands() {
        let config = GameConfig {
            distribution: Some(vec![('A', 10)]),
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooManyPlayers { needed: 14, available: 10, .. })
        ));
    }

    #[test]
    fn test_custom_multiplier_out_of_bounds_rejected() {
        let config = GameConfig {
            board_size: 7,
            multipliers: Some(vec![(Position::new(7, 0), Multiplier::DoubleWord)]),
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MultiplierOutOfBounds { x: 7, y: 0, size: 7 })
        ));
    }

    #[test]
    fn test_default_layout_per_board_size() {
        let standard = GameConfig::default().multiplier_layout();
        assert_eq!(standard.len(), DEFAULT_MULTIPLIERS.len());

        let small = GameConfig {
            board_size: 9,
            ..GameConfig::default()
        }
        .multiplier_layout();
        assert_eq!(small, vec![(Position::new(4, 4), Multiplier::DoubleWord)]);
    }
}
