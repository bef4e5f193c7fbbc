use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::fact::Fact;
use crate::random::RandomSource;

const FAST_MESSAGES: [&str; 4] = ["Fast and sure!", "Quick thinking!", "Automatic!", "Sharp!"];
const NORMAL_MESSAGES: [&str; 4] = ["Yes!", "Got it!", "Correct!", "Right!"];

/// Scoring state for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub score: u32,
    pub streak: u32,
    pub max_number: u32,
    pub correct: u32,
    pub total: u32,
    pub is_active: bool,
    pub session_start: Option<i64>,
    pub break_suggested: bool,
    pub question_start: Option<i64>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            score: 0,
            streak: 0,
            max_number: 10,
            correct: 0,
            total: 0,
            is_active: false,
            session_start: None,
            break_suggested: false,
            question_start: None,
        }
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self, max_number: u32, now_ms: i64) {
        *self = Self {
            max_number,
            is_active: true,
            session_start: Some(now_ms),
            ..Self::default()
        };
    }

    pub fn start_question_timer(&mut self, now_ms: i64) {
        self.question_start = Some(now_ms);
    }

    /// Milliseconds since the current question was posed.
    pub fn response_time(&self, now_ms: i64) -> u64 {
        match self.question_start {
            Some(start) => (now_ms - start).max(0) as u64,
            None => 0,
        }
    }

    pub fn should_suggest_break(&self, now_ms: i64, config: &GameConfig) -> bool {
        if self.break_suggested {
            return false;
        }
        match self.session_start {
            Some(start) => now_ms - start > config.session_break_ms,
            None => false,
        }
    }

    pub fn mark_break_suggested(&mut self) {
        self.break_suggested = true;
    }

    pub fn record_correct_answer(&mut self, config: &GameConfig) {
        self.streak += 1;
        self.correct += 1;
        self.total += 1;
        self.score += config.base_score + (self.streak - 1) * config.streak_bonus;
    }

    pub fn record_wrong_answer(&mut self) {
        self.streak = 0;
        self.total += 1;
    }

    pub fn end(&mut self) {
        self.is_active = false;
    }

    /// Rounded percentage, 0 before any answer.
    pub fn accuracy(&self) -> u32 {
        percent(self.correct, self.total)
    }
}

pub(crate) fn percent(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u32
}

/// The question on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionState {
    pub num1: u32,
    pub num2: u32,
    pub answer: u32,
}

impl QuestionState {
    pub fn set(&mut self, fact: Fact) {
        self.num1 = fact.a;
        self.num2 = fact.b;
        self.answer = fact.answer();
    }

    pub fn fact(&self) -> Fact {
        Fact::new(self.num1, self.num2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackCategory {
    Streak(u32),
    Fast,
    Normal,
}

pub fn is_fast_response(response_time_ms: u64, config: &GameConfig) -> bool {
    response_time_ms < config.response_fast_ms
}

/// Streak milestones take precedence over speed.
pub fn feedback_category(streak: u32, is_fast: bool, config: &GameConfig) -> FeedbackCategory {
    if streak >= config.streak_milestone {
        FeedbackCategory::Streak(streak)
    } else if is_fast {
        FeedbackCategory::Fast
    } else {
        FeedbackCategory::Normal
    }
}

pub fn feedback_message(category: FeedbackCategory, rng: &mut impl RandomSource) -> String {
    let messages = match category {
        FeedbackCategory::Streak(streak) => return format!("{streak} in a row!"),
        FeedbackCategory::Fast => &FAST_MESSAGES,
        FeedbackCategory::Normal => &NORMAL_MESSAGES,
    };
    let index = rng.int_inclusive(0, messages.len() as u32 - 1) as usize;
    messages[index.min(messages.len() - 1)].to_string()
}

pub fn level_name(max_number: u32) -> String {
    match max_number {
        5 => "Beginner".to_string(),
        10 => "Explorer".to_string(),
        12 => "Champion".to_string(),
        n => format!("Up to {n}"),
    }
}

pub fn result_title(accuracy: u32, total: u32) -> &'static str {
    if accuracy == 100 && total >= 5 {
        "Perfect Score!"
    } else if accuracy >= 80 {
        "Great Job!"
    } else if accuracy >= 60 {
        "Good Effort!"
    } else {
        "Quiz Complete"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;

    #[test]
    fn five_in_a_row_scores_seventy() {
        let config = GameConfig::default();
        let mut game = GameState::new();
        game.reset(10, 0);
        let mut scores = Vec::new();
        for _ in 0..5 {
            game.record_correct_answer(&config);
            scores.push(game.score);
        }
        assert_eq!(scores, vec![10, 22, 36, 52, 70]);
        assert_eq!(game.streak, 5);
        assert_eq!((game.correct, game.total), (5, 5));
    }

    #[test]
    fn wrong_answer_resets_streak_only() {
        let config = GameConfig::default();
        let mut game = GameState::new();
        game.reset(5, 0);
        game.record_correct_answer(&config);
        game.record_correct_answer(&config);
        game.record_wrong_answer();
        assert_eq!(game.streak, 0);
        assert_eq!(game.score, 22);
        assert_eq!((game.correct, game.total), (2, 3));
        assert_eq!(game.accuracy(), 67);

        game.record_correct_answer(&config);
        assert_eq!(game.score, 32);
    }

    #[test]
    fn break_suggested_once() {
        let config = GameConfig::default();
        let mut game = GameState::new();
        game.reset(10, 1_000);

        assert!(!game.should_suggest_break(1_000 + config.session_break_ms, &config));
        let mut fired = 0;
        for minute in 10..30 {
            let now = 1_000 + minute * 60_000 + 1;
            if game.should_suggest_break(now, &config) {
                game.mark_break_suggested();
                fired += 1;
            }
        }
        assert_eq!(fired, 1);

        game.reset(10, 5_000_000);
        assert!(!game.break_suggested);
    }

    #[test]
    fn reset_and_end() {
        let config = GameConfig::default();
        let mut game = GameState::new();
        assert_eq!(game.accuracy(), 0);
        game.reset(12, 100);
        game.record_correct_answer(&config);
        game.end();
        game.end();
        assert!(!game.is_active);
        assert_eq!((game.score, game.streak, game.total), (10, 1, 1));

        game.reset(5, 200);
        assert!(game.is_active);
        assert_eq!((game.score, game.streak, game.max_number), (0, 0, 5));
        assert_eq!(game.session_start, Some(200));
    }

    #[test]
    fn response_time_from_timer() {
        let mut game = GameState::new();
        game.start_question_timer(10_000);
        assert_eq!(game.response_time(12_500), 2_500);
        assert_eq!(game.response_time(9_000), 0);
    }

    #[test]
    fn feedback_categories() {
        let config = GameConfig::default();
        assert!(is_fast_response(2_999, &config));
        assert!(!is_fast_response(3_000, &config));
        assert_eq!(feedback_category(5, true, &config), FeedbackCategory::Streak(5));
        assert_eq!(feedback_category(4, true, &config), FeedbackCategory::Fast);
        assert_eq!(feedback_category(4, false, &config), FeedbackCategory::Normal);

        let mut rng = ScriptedRandom::new(0).with_ints([2, 3]);
        assert_eq!(feedback_message(FeedbackCategory::Streak(7), &mut rng), "7 in a row!");
        assert_eq!(feedback_message(FeedbackCategory::Fast, &mut rng), "Automatic!");
        assert_eq!(feedback_message(FeedbackCategory::Normal, &mut rng), "Right!");
    }

    #[test]
    fn levels_and_titles() {
        assert_eq!(level_name(5), "Beginner");
        assert_eq!(level_name(12), "Champion");
        assert_eq!(level_name(7), "Up to 7");
        assert_eq!(result_title(100, 5), "Perfect Score!");
        assert_eq!(result_title(100, 4), "Great Job!");
        assert_eq!(result_title(60, 10), "Good Effort!");
        assert_eq!(result_title(0, 0), "Quiz Complete");
    }
}
