//! Adaptive multiplication-fact practice.
//!
//! Tracks rolling accuracy per fact, steers practice toward weak and untested facts,
//! builds multiple-choice questions and scores sessions. Rendering and persistence are
//! supplied by the caller through [`UiPort`] and [`Storage`].

pub mod choices;
pub mod config;
pub mod error;
pub mod fact;
pub mod game;
pub mod history;
pub mod mastery;
pub mod random;
pub mod selector;
pub mod session;
pub mod storage;
pub mod strategies;

pub use config::{Config, GameConfig, MasteryConfig};
pub use error::{GameError, Result};
pub use fact::{fact_key, Fact};
pub use game::{GameState, QuestionState};
pub use history::SessionSummary;
pub use mastery::{MasteryMap, PracticeNeeds};
pub use random::{Clock, RandRandom, RandomSource, SystemClock};
pub use session::{
    FeedbackKind, Intent, RenderCommand, SessionOrchestrator, SessionResults, UiPort,
};
pub use storage::{JsonFileStorage, MemoryStorage, Storage};
pub use strategies::{MultiplicationStrategies, StrategyHints};
