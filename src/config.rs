use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Tunables for rolling accuracy and adaptive selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasteryConfig {
    /// Accuracy at or above which a fact counts as mastered.
    pub threshold: f64,
    /// Attempts kept per fact.
    pub rolling_window: usize,
    /// Probability mass routed to weak facts.
    pub weak_share: f64,
    /// Probability mass routed to untested facts, after the weak share.
    pub untested_share: f64,
    /// Smallest pool drawn from the weak list.
    pub neediest_floor: usize,
    /// The weak pool is `len / neediest_fraction`, rounded up.
    pub neediest_fraction: usize,
}

impl Default for MasteryConfig {
    fn default() -> Self {
        Self {
            threshold: 0.85,
            rolling_window: 20,
            weak_share: 0.6,
            untested_share: 0.2,
            neediest_floor: 3,
            neediest_fraction: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub answer_count: usize,
    pub correct_delay_ms: i64,
    pub wrong_delay_ms: i64,
    pub base_score: u32,
    pub streak_bonus: u32,
    pub streak_milestone: u32,
    pub session_break_ms: i64,
    pub response_fast_ms: u64,
    pub history_limit: usize,
    pub min_max_number: u32,
    pub max_max_number: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            answer_count: 4,
            correct_delay_ms: 1000,
            wrong_delay_ms: 2200,
            base_score: 10,
            streak_bonus: 2,
            streak_milestone: 5,
            session_break_ms: 10 * 60 * 1000,
            response_fast_ms: 3000,
            history_limit: 50,
            min_max_number: 2,
            max_max_number: 20,
        }
    }
}

impl GameConfig {
    /// Rejects level sizes the distractor search cannot serve.
    pub fn validate_max_number(&self, max_number: u32) -> Result<u32> {
        if max_number < self.min_max_number || max_number > self.max_max_number {
            return Err(GameError::InvalidMaxNumber {
                value: max_number,
                min: self.min_max_number,
                max: self.max_max_number,
            });
        }
        // Choices are distinct products in 1..=max_number²
        let max_product = max_number * max_number;
        if self.answer_count > max_product as usize {
            return Err(GameError::TooManyChoices {
                answer_count: self.answer_count,
                max_number,
                max_product,
            });
        }
        Ok(max_number)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mastery: MasteryConfig,
    pub game: GameConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"mastery": {"neediest_floor": 5}}"#).unwrap();
        assert_eq!(config.mastery.neediest_floor, 5);
        assert_eq!(config.mastery.rolling_window, 20);
        assert_eq!(config.game, GameConfig::default());
    }

    #[test]
    fn max_number_bounds() {
        let game = GameConfig::default();
        assert!(game.validate_max_number(1).is_err());
        assert!(game.validate_max_number(0).is_err());
        assert_eq!(game.validate_max_number(12), Ok(12));
        assert!(matches!(
            game.validate_max_number(500),
            Err(GameError::InvalidMaxNumber { value: 500, .. })
        ));
    }

    #[test]
    fn answer_count_must_fit_the_product_range() {
        let game = GameConfig {
            answer_count: 30,
            ..GameConfig::default()
        };
        assert_eq!(
            game.validate_max_number(5),
            Err(GameError::TooManyChoices {
                answer_count: 30,
                max_number: 5,
                max_product: 25,
            })
        );
        assert_eq!(game.validate_max_number(6), Ok(6));

        let exact = GameConfig {
            answer_count: 4,
            ..GameConfig::default()
        };
        assert_eq!(exact.validate_max_number(2), Ok(2));
    }
}
