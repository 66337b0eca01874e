use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::ChapterKey;
use crate::model::summary::ScoreSummary;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown quiz mode: {0}")]
pub struct QuizModeError(pub String);

/// The two ways a chapter can be practiced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuizMode {
    /// Pick the English term among four options.
    #[serde(rename = "4choice")]
    Choice,
    /// Type the English term against a per-question timer.
    #[serde(rename = "input")]
    Input,
}

impl QuizMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuizMode::Choice => "4choice",
            QuizMode::Input => "input",
        }
    }

    /// Only typed-input sessions feed the mastery ledger.
    #[must_use]
    pub fn tracks_mastery(self) -> bool {
        matches!(self, QuizMode::Input)
    }
}

impl FromStr for QuizMode {
    type Err = QuizModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "4choice" | "choice" => Ok(Self::Choice),
            "input" => Ok(Self::Input),
            other => Err(QuizModeError(other.to_owned())),
        }
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies the last recorded score for a chapter in a given mode.
///
/// Renders as `<chapter>_<mode>`, e.g. `3_input`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgressKey {
    pub chapter: ChapterKey,
    pub mode: QuizMode,
}

impl ProgressKey {
    #[must_use]
    pub fn new(chapter: ChapterKey, mode: QuizMode) -> Self {
        Self { chapter, mode }
    }
}

impl fmt::Display for ProgressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.chapter, self.mode)
    }
}

/// Aggregate score stored for the most recent attempt of a chapter/mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub correct: u32,
    pub total: u32,
    pub percentage: u32,
    pub last_played: DateTime<Utc>,
}

impl ProgressRecord {
    #[must_use]
    pub fn from_summary(summary: &ScoreSummary, played_at: DateTime<Utc>) -> Self {
        Self {
            correct: summary.correct(),
            total: summary.total(),
            percentage: summary.percentage(),
            last_played: played_at,
        }
    }
}
