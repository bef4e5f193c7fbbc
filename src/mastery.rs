use std::collections::{BTreeMap, HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::config::MasteryConfig;
use crate::fact::{canonical_facts, fact_key, Fact};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub correct: bool,
    #[serde(rename = "time")]
    pub response_time_ms: u64,
    #[serde(rename = "date")]
    pub timestamp: i64,
}

/// Sliding window of the most recent attempts on one fact.
///
/// Counters are rebuilt from `attempts` when loaded, so stored counts that disagree with
/// the attempt list never reach the window arithmetic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredFactRecord")]
pub struct FactRecord {
    pub attempts: VecDeque<Attempt>,
    #[serde(rename = "correct")]
    pub correct_in_window: u32,
    #[serde(rename = "total")]
    pub total_in_window: u32,
}

/// On-disk shape; counters are ignored in favour of the attempts.
#[derive(Deserialize)]
struct StoredFactRecord {
    #[serde(default)]
    attempts: VecDeque<Attempt>,
}

impl From<StoredFactRecord> for FactRecord {
    fn from(stored: StoredFactRecord) -> Self {
        let mut attempts = stored.attempts;
        let window = MasteryConfig::default().rolling_window;
        while attempts.len() > window {
            attempts.pop_front();
        }
        let correct = attempts.iter().filter(|a| a.correct).count();
        Self {
            correct_in_window: correct as u32,
            total_in_window: attempts.len() as u32,
            attempts,
        }
    }
}

impl FactRecord {
    fn push(&mut self, attempt: Attempt, window: usize) {
        self.total_in_window += 1;
        if attempt.correct {
            self.correct_in_window += 1;
        }
        self.attempts.push_back(attempt);

        while self.attempts.len() > window.max(1) {
            let Some(evicted) = self.attempts.pop_front() else {
                break;
            };
            self.total_in_window = self.total_in_window.saturating_sub(1);
            if evicted.correct {
                self.correct_in_window = self.correct_in_window.saturating_sub(1);
            }
        }
    }

    pub fn accuracy(&self) -> Option<f64> {
        if self.total_in_window == 0 {
            return None;
        }
        Some(self.correct_in_window as f64 / self.total_in_window as f64)
    }
}

/// Per-profile mastery data keyed by `fact_key`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MasteryMap {
    facts: HashMap<String, FactRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PracticeNeeds {
    /// Neediest first.
    pub weak: Vec<Fact>,
    pub untested: Vec<Fact>,
}

impl MasteryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn record(&self, a: u32, b: u32) -> Option<&FactRecord> {
        self.facts.get(&fact_key(a, b))
    }

    pub fn record_attempt(
        &mut self,
        a: u32,
        b: u32,
        correct: bool,
        response_time_ms: u64,
        timestamp: i64,
        config: &MasteryConfig,
    ) -> &mut Self {
        let attempt = Attempt {
            correct,
            response_time_ms,
            timestamp,
        };
        self.facts
            .entry(fact_key(a, b))
            .or_default()
            .push(attempt, config.rolling_window);
        self
    }

    /// `None` when the fact has never been answered.
    pub fn accuracy(&self, a: u32, b: u32) -> Option<f64> {
        self.record(a, b).and_then(FactRecord::accuracy)
    }

    pub fn facts_needing_practice(&self, max_number: u32, config: &MasteryConfig) -> PracticeNeeds {
        let mut weak = Vec::new();
        let mut untested = Vec::new();

        for fact in canonical_facts(max_number) {
            match self.accuracy(fact.a, fact.b) {
                None => untested.push(fact),
                Some(accuracy) if accuracy < config.threshold => weak.push((fact, accuracy)),
                Some(_) => {}
            }
        }

        // Stable sort keeps enumeration order among equal accuracies
        weak.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        PracticeNeeds {
            weak: weak.into_iter().map(|(fact, _)| fact).collect(),
            untested,
        }
    }

    pub fn mastered_count(&self, max_number: u32, config: &MasteryConfig) -> usize {
        canonical_facts(max_number)
            .iter()
            .filter(|f| {
                self.accuracy(f.a, f.b)
                    .is_some_and(|accuracy| accuracy >= config.threshold)
            })
            .count()
    }

    /// Rounded mean accuracy (percent) per times table `2..=max_number`.
    ///
    /// Tables without any answered fact are left out.
    pub fn table_mastery(&self, max_number: u32) -> BTreeMap<u32, u32> {
        let mut tables = BTreeMap::new();
        for table in 2..=max_number {
            let accuracies: Vec<f64> = (1..=max_number)
                .filter_map(|other| self.accuracy(table, other))
                .collect();
            if accuracies.is_empty() {
                continue;
            }
            let mean = accuracies.iter().sum::<f64>() / accuracies.len() as f64;
            tables.insert(table, (mean * 100.0).round() as u32);
        }
        tables
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasteryBand {
    Mastered,
    Learning,
    Struggling,
}

impl MasteryBand {
    pub fn from_percent(percent: u32) -> Self {
        if percent >= 85 {
            MasteryBand::Mastered
        } else if percent >= 60 {
            MasteryBand::Learning
        } else {
            MasteryBand::Struggling
        }
    }
}
