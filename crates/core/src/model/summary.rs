use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::mastery::WordStatus;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoreError {
    #[error("score summary needs at least one question")]
    EmptyTotal,

    #[error("correct answers ({correct}) exceed total questions ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },

    #[error("too many questions for a single session: {len}")]
    TooManyQuestions { len: usize },
}

/// Result recorded for one word during a typed-input session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordOutcome {
    /// English term of the word.
    pub word: String,
    pub status: WordStatus,
}

impl WordOutcome {
    #[must_use]
    pub fn new(word: impl Into<String>, status: WordStatus) -> Self {
        Self {
            word: word.into(),
            status,
        }
    }
}

/// Terminal report of a completed or interrupted quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    correct: u32,
    total: u32,
    percentage: u32,
    outcomes: Vec<WordOutcome>,
}

impl ScoreSummary {
    /// Builds a summary and derives its percentage.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::EmptyTotal` when `total` is zero and
    /// `ScoreError::CorrectExceedsTotal` when the counts are inconsistent.
    pub fn new(correct: u32, total: u32, outcomes: Vec<WordOutcome>) -> Result<Self, ScoreError> {
        let percentage = percentage(correct, total)?;
        Ok(Self {
            correct,
            total,
            percentage,
            outcomes,
        })
    }

    /// Builds a summary from a question count held as `usize`.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::TooManyQuestions` if the count does not fit in `u32`,
    /// plus everything `ScoreSummary::new` can return.
    pub fn from_counts(
        correct: u32,
        total: usize,
        outcomes: Vec<WordOutcome>,
    ) -> Result<Self, ScoreError> {
        let total =
            u32::try_from(total).map_err(|_| ScoreError::TooManyQuestions { len: total })?;
        Self::new(correct, total, outcomes)
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        self.percentage
    }

    /// Per-word outcomes in answer order. Empty for multiple-choice sessions.
    #[must_use]
    pub fn outcomes(&self) -> &[WordOutcome] {
        &self.outcomes
    }
}

/// `round(100 * correct / total)` with halves rounded up, in integer arithmetic.
///
/// # Errors
///
/// Same conditions as `ScoreSummary::new`.
pub fn percentage(correct: u32, total: u32) -> Result<u32, ScoreError> {
    if total == 0 {
        return Err(ScoreError::EmptyTotal);
    }
    if correct > total {
        return Err(ScoreError::CorrectExceedsTotal { correct, total });
    }
    let (correct, total) = (u64::from(correct), u64::from(total));
    let rounded = (200 * correct + total) / (2 * total);
    // bounded by 100 because correct <= total
    Ok(u32::try_from(rounded).unwrap_or(100))
}
