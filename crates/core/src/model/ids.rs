use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::model::word::WordError;

/// Identifier of a chapter in the word bank.
///
/// Chapters are usually numbered ("1", "2", ... "14"), so ordering compares
/// numerically when both keys are integers. Numeric keys come before
/// non-numeric ones; anything else falls back to string order.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChapterKey(String);

impl ChapterKey {
    /// Creates a key from raw text, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `WordError::EmptyChapterKey` if nothing is left after trimming.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, WordError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(WordError::EmptyChapterKey);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn from_number(number: u32) -> Self {
        Self(number.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl Ord for ChapterKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_number = match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_number.then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for ChapterKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl TryFrom<String> for ChapterKey {
    type Error = WordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChapterKey> for String {
    fn from(key: ChapterKey) -> Self {
        key.0
    }
}

impl fmt::Debug for ChapterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChapterKey({})", self.0)
    }
}

impl fmt::Display for ChapterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
