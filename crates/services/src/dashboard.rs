use std::collections::HashSet;
use std::sync::Arc;

use storage::repository::ProgressStore;
use vocab_core::model::{
    ChapterKey, ChapterMastery, ProgressKey, ProgressRecord, QuizMode, WordBank, WordPair,
};

use crate::error::SessionError;

/// One row of the chapter overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterOverview {
    pub chapter: ChapterKey,
    pub word_count: usize,
    /// Latest multiple-choice result.
    pub choice: Option<ProgressRecord>,
    /// Latest typed-input result.
    pub input: Option<ProgressRecord>,
    pub mastered: usize,
}

/// Read-only views over the word bank and stored progress.
#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn ProgressStore>,
    bank: Arc<WordBank>,
}

impl DashboardService {
    #[must_use]
    pub fn new(store: Arc<dyn ProgressStore>, bank: Arc<WordBank>) -> Self {
        Self { store, bank }
    }

    /// Every chapter in display order with its latest scores.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if progress cannot be loaded.
    pub async fn overview(&self) -> Result<Vec<ChapterOverview>, SessionError> {
        let mut progress = self.store.load_progress().await?;
        let mastery = self.store.load_mastery().await?;

        let rows = self
            .bank
            .chapters()
            .map(|chapter| {
                let mut take = |mode| progress.remove(&ProgressKey::new(chapter.clone(), mode));
                let choice = take(QuizMode::Choice);
                let input = take(QuizMode::Input);
                ChapterOverview {
                    chapter: chapter.clone(),
                    word_count: self.bank.word_count(chapter),
                    choice,
                    input,
                    mastered: mastery
                        .chapter(chapter)
                        .map_or(0, |m| mastered_in_chapter(m, self.bank.chapter(chapter))),
                }
            })
            .collect();
        Ok(rows)
    }

    /// Word list of one chapter.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownChapter` if the chapter is absent.
    pub fn words(&self, chapter: &ChapterKey) -> Result<&[WordPair], SessionError> {
        self.bank
            .chapter(chapter)
            .ok_or_else(|| SessionError::UnknownChapter(chapter.clone()))
    }
}

/// Mastered words still present in the chapter, counting each English term once.
fn mastered_in_chapter(mastery: &ChapterMastery, words: Option<&[WordPair]>) -> usize {
    words
        .unwrap_or_default()
        .iter()
        .map(WordPair::english)
        .filter(|english| mastery.is_mastered(english))
        .collect::<HashSet<_>>()
        .len()
}
