//! Local leaderboard
//!
//! Best ten finished runs, highest first. The host persists the table as
//! JSON; the core only reads and writes the string.

use serde::{Deserialize, Serialize};

use crate::sim::WorldTheme;

/// Table length
pub const MAX_HIGH_SCORES: usize = 10;

/// One finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// World the run was played in
    pub theme: WorldTheme,
    /// Daily seed of the run
    pub seed: u32,
    /// When the run ended (Unix ms)
    pub timestamp: f64,
}

/// Sorted table, highest score first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero never makes the table; otherwise it must beat the last entry once full
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        self.entries.len() < MAX_HIGH_SCORES || self.entries.last().is_none_or(|e| score > e.score)
    }

    /// 1-based position the score would take
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let ahead = self.entries.iter().take_while(|e| e.score >= score).count();
        Some(ahead + 1)
    }

    /// Insert a finished run, returning its 1-based rank if it made the table
    pub fn add_score(&mut self, score: u64, theme: WorldTheme, seed: u32, timestamp: f64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score,
                theme,
                seed,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        log::info!("New high score {score} at rank {rank}");
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        // Stored tables may come from older builds or hand edits
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        Ok(scores)
    }

    /// Parse a stored table, starting fresh on any error
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(scores) => {
                log::info!("High score table: {} entries", scores.entries.len());
                scores
            }
            Err(e) => {
                log::info!("No usable high scores ({e}), starting fresh");
                Self::new()
            }
        }
    }
}

/// Human-readable age of an entry relative to `now` (both Unix ms)
pub fn format_age(now: f64, timestamp: f64) -> String {
    const UNITS: [(f64, &str); 3] = [(86_400_000.0, "day"), (3_600_000.0, "hour"), (60_000.0, "min")];

    let elapsed = (now - timestamp).max(0.0);
    for (unit_ms, name) in UNITS {
        let count = (elapsed / unit_ms).floor() as u64;
        match (count, name) {
            (0, _) => continue,
            (1, "day") => return "Yesterday".to_string(),
            (1, _) => return format!("1 {name} ago"),
            (n, _) => return format!("{n} {name}s ago"),
        }
    }
    "Just now".to_string()
}
