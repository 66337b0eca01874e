use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use vocab_core::model::{
    ChapterKey, ChapterMastery, MasteryLedger, ProgressKey, ProgressRecord, QuizMode, ScoreSummary,
    User,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Last recorded score per chapter and mode.
pub type ProgressBook = BTreeMap<ProgressKey, ProgressRecord>;

/// Local persistence for the learner, their scores and per-word mastery.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Load the registered user, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn load_user(&self) -> Result<Option<User>, StorageError>;

    /// Persist the user, replacing any previous registration.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the user cannot be stored.
    async fn save_user(&self, user: &User) -> Result<(), StorageError>;

    /// Load every stored score keyed by `<chapter>_<mode>`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or a row is corrupt.
    async fn load_progress(&self) -> Result<ProgressBook, StorageError>;

    /// Load the full mastery ledger.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or a row is corrupt.
    async fn load_mastery(&self) -> Result<MasteryLedger, StorageError>;

    /// Load mastery for one chapter. Missing chapters yield an empty map.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or a row is corrupt.
    async fn load_chapter_mastery(
        &self,
        chapter: &ChapterKey,
    ) -> Result<ChapterMastery, StorageError>;

    /// Store the aggregate score for a chapter/mode and, for typed-input
    /// sessions, merge the per-word outcomes into the ledger.
    ///
    /// A word already marked correct stays correct.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails; nothing is partially applied.
    async fn save_progress(
        &self,
        chapter: &ChapterKey,
        mode: QuizMode,
        summary: &ScoreSummary,
        played_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Forget all mastery for a chapter.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn clear_mastery_for_chapter(&self, chapter: &ChapterKey) -> Result<(), StorageError>;

    /// Drop the user, all scores and all mastery.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn clear_all(&self) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
struct InMemoryState {
    user: Option<User>,
    progress: ProgressBook,
    mastery: MasteryLedger,
}

/// Simple in-memory store for tests and throwaway sessions.
#[derive(Clone, Default)]
pub struct InMemoryProgressStore {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryProgressStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, InMemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn load_user(&self) -> Result<Option<User>, StorageError> {
        Ok(self.lock()?.user.clone())
    }

    async fn save_user(&self, user: &User) -> Result<(), StorageError> {
        self.lock()?.user = Some(user.clone());
        Ok(())
    }

    async fn load_progress(&self) -> Result<ProgressBook, StorageError> {
        Ok(self.lock()?.progress.clone())
    }

    async fn load_mastery(&self) -> Result<MasteryLedger, StorageError> {
        Ok(self.lock()?.mastery.clone())
    }

    async fn load_chapter_mastery(
        &self,
        chapter: &ChapterKey,
    ) -> Result<ChapterMastery, StorageError> {
        Ok(self
            .lock()?
            .mastery
            .chapter(chapter)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_progress(
        &self,
        chapter: &ChapterKey,
        mode: QuizMode,
        summary: &ScoreSummary,
        played_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.progress.insert(
            ProgressKey::new(chapter.clone(), mode),
            ProgressRecord::from_summary(summary, played_at),
        );
        if mode.tracks_mastery() {
            guard.mastery.merge(chapter, summary.outcomes());
        }
        Ok(())
    }

    async fn clear_mastery_for_chapter(&self, chapter: &ChapterKey) -> Result<(), StorageError> {
        self.lock()?.mastery.clear_chapter(chapter);
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), StorageError> {
        *self.lock()? = InMemoryState::default();
        Ok(())
    }
}

/// Holds the active store behind a trait object so backends can be swapped.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            progress: Arc::new(InMemoryProgressStore::new()),
        }
    }
}
