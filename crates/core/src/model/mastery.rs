use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::ChapterKey;
use crate::model::summary::WordOutcome;

//
// ─── WORD STATUS ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid word status: {0}")]
pub struct WordStatusError(pub String);

/// Outcome of a single typed-input answer, as tracked in the mastery ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    /// Typed the right answer.
    Correct,
    /// Typed a wrong answer or ran out of time.
    Wrong,
    /// Gave up and asked for the answer.
    Passed,
}

impl WordStatus {
    /// Stable code used by storage adapters.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            WordStatus::Correct => "correct",
            WordStatus::Wrong => "wrong",
            WordStatus::Passed => "passed",
        }
    }
}

impl FromStr for WordStatus {
    type Err = WordStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "correct" => Ok(Self::Correct),
            "wrong" => Ok(Self::Wrong),
            "passed" => Ok(Self::Passed),
            other => Err(WordStatusError(other.to_owned())),
        }
    }
}

//
// ─── CHAPTER MASTERY ───────────────────────────────────────────────────────────
//

/// Per-word status for one chapter, keyed by the English term.
///
/// Mastery only ratchets upward: once a word is `Correct`, later `Wrong` or
/// `Passed` results leave it `Correct`. Every other transition overwrites the
/// previous status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterMastery {
    words: HashMap<String, WordStatus>,
}

impl ChapterMastery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self, english: &str) -> Option<WordStatus> {
        self.words.get(english).copied()
    }

    #[must_use]
    pub fn is_mastered(&self, english: &str) -> bool {
        self.status(english) == Some(WordStatus::Correct)
    }

    #[must_use]
    pub fn mastered_count(&self) -> usize {
        self.words
            .values()
            .filter(|status| **status == WordStatus::Correct)
            .count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Records a status for a word and returns the status that was kept.
    pub fn record(&mut self, english: impl Into<String>, status: WordStatus) -> WordStatus {
        let slot = self.words.entry(english.into()).or_insert(status);
        if *slot != WordStatus::Correct {
            *slot = status;
        }
        *slot
    }

    /// Merges session outcomes in answer order.
    pub fn merge(&mut self, outcomes: &[WordOutcome]) {
        for outcome in outcomes {
            self.record(outcome.word.clone(), outcome.status);
        }
    }
}

//
// ─── LEDGER ────────────────────────────────────────────────────────────────────
//

/// Mastery for every chapter that has seen at least one typed-input session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasteryLedger {
    chapters: BTreeMap<ChapterKey, ChapterMastery>,
}

impl MasteryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn chapter(&self, key: &ChapterKey) -> Option<&ChapterMastery> {
        self.chapters.get(key)
    }

    pub fn merge(&mut self, key: &ChapterKey, outcomes: &[WordOutcome]) {
        if outcomes.is_empty() {
            return;
        }
        self.chapters.entry(key.clone()).or_default().merge(outcomes);
    }

    /// Forgets every status for a chapter, including mastered words.
    pub fn clear_chapter(&mut self, key: &ChapterKey) -> Option<ChapterMastery> {
        self.chapters.remove(key)
    }
}
