use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::ids::ChapterKey;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WordError {
    #[error("english term cannot be empty")]
    EmptyEnglish,

    #[error("japanese term cannot be empty")]
    EmptyJapanese,

    #[error("chapter key cannot be empty")]
    EmptyChapterKey,
}

//
// ─── WORD PAIR ─────────────────────────────────────────────────────────────────
//

/// One vocabulary item: an English term and its Japanese counterpart.
///
/// The English side doubles as the word's identity in the mastery ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordPair {
    english: String,
    japanese: String,
}

impl WordPair {
    /// Creates a word pair from trimmed, non-empty terms.
    ///
    /// # Errors
    ///
    /// Returns `WordError::EmptyEnglish` or `WordError::EmptyJapanese` when a
    /// side is blank.
    pub fn new(english: impl AsRef<str>, japanese: impl AsRef<str>) -> Result<Self, WordError> {
        let english = english.as_ref().trim();
        let japanese = japanese.as_ref().trim();
        if english.is_empty() {
            return Err(WordError::EmptyEnglish);
        }
        if japanese.is_empty() {
            return Err(WordError::EmptyJapanese);
        }
        Ok(Self {
            english: english.to_owned(),
            japanese: japanese.to_owned(),
        })
    }

    #[must_use]
    pub fn english(&self) -> &str {
        &self.english
    }

    #[must_use]
    pub fn japanese(&self) -> &str {
        &self.japanese
    }
}

//
// ─── WORD BANK ─────────────────────────────────────────────────────────────────
//

/// All loaded chapters, keyed and ordered by `ChapterKey`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordBank {
    chapters: BTreeMap<ChapterKey, Vec<WordPair>>,
}

impl WordBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a word to a chapter, creating the chapter on first use.
    pub fn push_word(&mut self, chapter: ChapterKey, word: WordPair) {
        self.chapters.entry(chapter).or_default().push(word);
    }

    pub fn insert_chapter(&mut self, chapter: ChapterKey, words: Vec<WordPair>) {
        self.chapters.insert(chapter, words);
    }

    /// Replaces a chapter wholesale with override data.
    ///
    /// An empty override leaves the existing chapter in place. Returns whether
    /// the chapter was replaced.
    pub fn replace_chapter(&mut self, chapter: ChapterKey, words: Vec<WordPair>) -> bool {
        if words.is_empty() {
            return false;
        }
        self.chapters.insert(chapter, words);
        true
    }

    /// Chapter keys in display order.
    pub fn chapters(&self) -> impl Iterator<Item = &ChapterKey> {
        self.chapters.keys()
    }

    #[must_use]
    pub fn chapter(&self, key: &ChapterKey) -> Option<&[WordPair]> {
        self.chapters.get(key).map(Vec::as_slice)
    }

    #[must_use]
    pub fn word_count(&self, key: &ChapterKey) -> usize {
        self.chapters.get(key).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}
