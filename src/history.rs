use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::percent;

/// One finished session, as kept in a profile's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub date: DateTime<Utc>,
    pub level: u32,
    pub score: u32,
    pub correct: u32,
    pub total: u32,
}

impl SessionSummary {
    pub fn accuracy(&self) -> u32 {
        percent(self.correct, self.total)
    }
}

/// Prepends `entry`, keeping at most `limit` entries (most recent first).
pub fn append_history(history: &mut Vec<SessionSummary>, entry: SessionSummary, limit: usize) {
    history.insert(0, entry);
    history.truncate(limit);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: u32) -> SessionSummary {
        SessionSummary {
            date: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            level: 10,
            score,
            correct: 3,
            total: 4,
        }
    }

    #[test]
    fn newest_first_and_bounded() {
        let mut history = Vec::new();
        for score in 0..60 {
            append_history(&mut history, entry(score), 50);
        }
        assert_eq!(history.len(), 50);
        assert_eq!(history[0].score, 59);
        assert_eq!(history[49].score, 10);
    }

    #[test]
    fn date_serializes_as_iso_string() {
        let json = serde_json::to_value(entry(5)).unwrap();
        assert!(json["date"].as_str().unwrap().starts_with("2023-11-14T22:13:20"));
        assert_eq!(entry(5).accuracy(), 75);

        let empty = SessionSummary { correct: 0, total: 0, ..entry(0) };
        assert_eq!(empty.accuracy(), 0);
    }
}
