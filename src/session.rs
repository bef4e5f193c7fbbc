use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};

use crate::choices::generate_choices;
use crate::config::Config;
use crate::error::Result;
use crate::game::{
    feedback_category, feedback_message, is_fast_response, level_name, result_title,
    GameState, QuestionState,
};
use crate::history::{append_history, SessionSummary};
use crate::mastery::MasteryMap;
use crate::random::{Clock, RandomSource, SystemClock};
use crate::selector::select_next_fact;
use crate::storage::Storage;
use crate::strategies::{MultiplicationStrategies, StrategyHints};

pub const BREAK_MESSAGE: &str = "You've been practicing for a while. Time for a short break?";

/// What the UI asks the orchestrator to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Start { max_number: u32 },
    AnswerSelected(u32),
    EndSession,
    /// Lets deferred work (the next question) run once it is due.
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Correct,
    Wrong,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResults {
    pub level: u32,
    pub level_name: String,
    pub correct: u32,
    pub total: u32,
    pub accuracy: u32,
    pub score: u32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCommand {
    ShowQuestion { num1: u32, num2: u32 },
    ShowChoices(Vec<u32>),
    ShowFeedback { text: String, kind: FeedbackKind },
    RevealAnswer { chosen: u32, correct: u32 },
    ShowScore { score: u32, streak: u32 },
    ShowResults(SessionResults),
}

pub trait UiPort {
    fn render(&mut self, command: RenderCommand);
}

/// Records commands for headless runs.
impl UiPort for Vec<RenderCommand> {
    fn render(&mut self, command: RenderCommand) {
        self.push(command);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub tables: BTreeMap<u32, u32>,
    pub mastered: usize,
    pub fact_count: usize,
    pub history: Vec<SessionSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingQuestion {
    due_at_ms: i64,
}

/// Runs practice sessions for one profile.
///
/// Mastery data is loaded once and written back at the end of a session, only when
/// something changed.
pub struct SessionOrchestrator<S, U, R, C = SystemClock> {
    user_id: String,
    config: Config,
    storage: S,
    ui: U,
    rng: R,
    clock: C,
    hints: Box<dyn StrategyHints>,
    mastery: MasteryMap,
    mastery_dirty: bool,
    game: GameState,
    question: QuestionState,
    awaiting_answer: bool,
    pending: Option<PendingQuestion>,
}

impl<S, U, R, C> SessionOrchestrator<S, U, R, C>
where
    S: Storage,
    U: UiPort,
    R: RandomSource,
    C: Clock,
{
    pub fn new(user_id: impl Into<String>, storage: S, ui: U, rng: R, clock: C) -> Self {
        let user_id = user_id.into();
        let mastery = storage.load_mastery(&user_id);
        debug!("Loaded {} mastery records for {user_id}", mastery.len());
        Self {
            user_id,
            config: Config::default(),
            storage,
            ui,
            rng,
            clock,
            hints: Box::new(MultiplicationStrategies),
            mastery,
            mastery_dirty: false,
            game: GameState::new(),
            question: QuestionState::default(),
            awaiting_answer: false,
            pending: None,
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn with_hints(mut self, hints: impl StrategyHints + 'static) -> Self {
        self.hints = Box::new(hints);
        self
    }

    pub fn handle(&mut self, intent: Intent) -> Result<()> {
        match intent {
            Intent::Start { max_number } => self.start(max_number),
            Intent::AnswerSelected(choice) => {
                self.answer(choice);
                Ok(())
            }
            Intent::EndSession => {
                self.end_session();
                Ok(())
            }
            Intent::Tick => self.tick(),
        }
    }

    pub fn start(&mut self, max_number: u32) -> Result<()> {
        let max_number = self.config.game.validate_max_number(max_number)?;
        if self.game.is_active {
            warn!("Abandoning active session for {}", self.user_id);
        }

        self.pending = None;
        self.awaiting_answer = false;
        self.game.reset(max_number, self.clock.now_ms());
        info!("Session started for {} at level {max_number}", self.user_id);

        self.ui.render(RenderCommand::ShowScore {
            score: 0,
            streak: 0,
        });
        self.pose_or_end()
    }

    /// A question that cannot be posed ends the session instead of leaving it stuck.
    fn pose_or_end(&mut self) -> Result<()> {
        if let Err(e) = self.next_question() {
            error!("Could not pose the next question for {}: {e}", self.user_id);
            self.end_session();
            return Err(e);
        }
        Ok(())
    }

    fn next_question(&mut self) -> Result<()> {
        if !self.game.is_active {
            return Ok(());
        }
        let now = self.clock.now_ms();

        let fact = select_next_fact(
            &self.mastery,
            self.game.max_number,
            &self.config.mastery,
            &mut self.rng,
        );
        self.question.set(fact);
        let choices = generate_choices(
            self.question.answer,
            self.game.max_number,
            self.config.game.answer_count,
            &mut self.rng,
        )?;
        self.game.start_question_timer(now);
        self.awaiting_answer = true;

        self.ui.render(RenderCommand::ShowQuestion {
            num1: self.question.num1,
            num2: self.question.num2,
        });
        self.ui.render(RenderCommand::ShowChoices(choices));

        if self.game.should_suggest_break(now, &self.config.game) {
            self.game.mark_break_suggested();
            self.ui.render(RenderCommand::ShowFeedback {
                text: BREAK_MESSAGE.to_string(),
                kind: FeedbackKind::Neutral,
            });
        }
        Ok(())
    }

    pub fn answer(&mut self, choice: u32) {
        if !self.game.is_active || !self.awaiting_answer {
            debug!("Ignoring answer {choice}: no open question");
            return;
        }
        self.awaiting_answer = false;

        let now = self.clock.now_ms();
        let response_time = self.game.response_time(now);
        let question = self.question;
        let correct = choice == question.answer;

        self.mastery.record_attempt(
            question.num1,
            question.num2,
            correct,
            response_time,
            now,
            &self.config.mastery,
        );
        self.mastery_dirty = true;

        self.ui.render(RenderCommand::RevealAnswer {
            chosen: choice,
            correct: question.answer,
        });

        let game_config = &self.config.game;
        let delay = if correct {
            self.game.record_correct_answer(game_config);
            let category = feedback_category(
                self.game.streak,
                is_fast_response(response_time, game_config),
                game_config,
            );
            let text = feedback_message(category, &mut self.rng);
            self.ui.render(RenderCommand::ShowFeedback {
                text,
                kind: FeedbackKind::Correct,
            });
            game_config.correct_delay_ms
        } else {
            self.game.record_wrong_answer();
            let mut text = format!(
                "{} × {} = {}",
                question.num1, question.num2, question.answer
            );
            if let Some(hint) = self.hints.explain(question.num1, question.num2) {
                text.push('\n');
                text.push_str(&hint);
            }
            self.ui.render(RenderCommand::ShowFeedback {
                text,
                kind: FeedbackKind::Wrong,
            });
            game_config.wrong_delay_ms
        };
        debug!(
            "{}x{} answered {} in {response_time}ms",
            question.num1,
            question.num2,
            if correct { "right" } else { "wrong" }
        );

        self.ui.render(RenderCommand::ShowScore {
            score: self.game.score,
            streak: self.game.streak,
        });
        self.pending = Some(PendingQuestion {
            due_at_ms: now + delay,
        });
    }

    pub fn tick(&mut self) -> Result<()> {
        let Some(pending) = self.pending else {
            return Ok(());
        };
        if self.clock.now_ms() < pending.due_at_ms {
            return Ok(());
        }
        self.pending = None;
        self.pose_or_end()
    }

    pub fn end_session(&mut self) {
        if !self.game.is_active {
            debug!("End requested with no active session");
            return;
        }
        self.game.end();
        self.pending = None;
        self.awaiting_answer = false;

        self.flush_mastery();
        if self.game.total > 0 {
            let mut history = self.storage.load_history(&self.user_id);
            let entry = SessionSummary {
                date: DateTime::from_timestamp_millis(self.clock.now_ms())
                    .unwrap_or_else(Utc::now),
                level: self.game.max_number,
                score: self.game.score,
                correct: self.game.correct,
                total: self.game.total,
            };
            append_history(&mut history, entry, self.config.game.history_limit);
            self.storage.save_history(&self.user_id, &history);
        }

        let accuracy = self.game.accuracy();
        info!(
            "Session ended for {}: {}/{} correct, score {}",
            self.user_id, self.game.correct, self.game.total, self.game.score
        );
        self.ui.render(RenderCommand::ShowResults(SessionResults {
            level: self.game.max_number,
            level_name: level_name(self.game.max_number),
            correct: self.game.correct,
            total: self.game.total,
            accuracy,
            score: self.game.score,
            title: result_title(accuracy, self.game.total).to_string(),
        }));
    }

    /// Writes mastery back if it changed since the last write.
    pub fn flush_mastery(&mut self) {
        if !self.mastery_dirty {
            return;
        }
        self.storage.save_mastery(&self.user_id, &self.mastery);
        self.mastery_dirty = false;
    }

    pub fn reset_mastery(&mut self) {
        self.mastery = MasteryMap::new();
        self.storage.save_mastery(&self.user_id, &self.mastery);
        self.mastery_dirty = false;
        info!("Mastery data reset for {}", self.user_id);
    }

    pub fn progress(&self, max_number: u32) -> Progress {
        Progress {
            tables: self.mastery.table_mastery(max_number),
            mastered: self.mastery.mastered_count(max_number, &self.config.mastery),
            fact_count: (max_number * (max_number + 1) / 2) as usize,
            history: self.storage.load_history(&self.user_id),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn question(&self) -> &QuestionState {
        &self.question
    }

    pub fn mastery(&self) -> &MasteryMap {
        &self.mastery
    }

    pub fn is_mastery_dirty(&self) -> bool {
        self.mastery_dirty
    }

    pub fn is_awaiting_answer(&self) -> bool {
        self.awaiting_answer
    }

    /// When the deferred next question becomes due, if one is scheduled.
    pub fn next_question_due(&self) -> Option<i64> {
        self.pending.map(|p| p.due_at_ms)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }
}
