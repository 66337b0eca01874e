use std::sync::Arc;

use rand::Rng;
use storage::repository::ProgressStore;
use vocab_core::Clock;
use vocab_core::model::{
    ChapterKey, ProgressKey, ProgressRecord, QuizMode, ScoreSummary, WordBank, WordPair,
};

use crate::error::SessionError;
use crate::generator::SessionGenerator;
use crate::sessions::{ChoiceSession, InputSession};
use crate::timer::TickScheduler;

/// Launches quiz sessions for a chapter and persists their results.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    store: Arc<dyn ProgressStore>,
    bank: Arc<WordBank>,
    generator: SessionGenerator,
}

impl QuizService {
    #[must_use]
    pub fn new(clock: Clock, store: Arc<dyn ProgressStore>, bank: Arc<WordBank>) -> Self {
        Self {
            clock,
            store,
            bank,
            generator: SessionGenerator::new(),
        }
    }

    #[must_use]
    pub fn with_generator(mut self, generator: SessionGenerator) -> Self {
        self.generator = generator;
        self
    }

    #[must_use]
    pub fn bank(&self) -> &WordBank {
        &self.bank
    }

    /// Words of a chapter.
    ///
    /// # Errors
    ///
    /// `UnknownChapter` if the chapter is absent, `Empty` if it has no words.
    pub fn chapter_words(&self, chapter: &ChapterKey) -> Result<&[WordPair], SessionError> {
        let words = self
            .bank
            .chapter(chapter)
            .ok_or_else(|| SessionError::UnknownChapter(chapter.clone()))?;
        if words.is_empty() {
            return Err(SessionError::Empty);
        }
        Ok(words)
    }

    /// Start a multiple-choice session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the chapter is unknown or empty.
    pub fn start_choice<R: Rng + ?Sized>(
        &self,
        chapter: &ChapterKey,
        rng: &mut R,
    ) -> Result<ChoiceSession, SessionError> {
        let words = self.chapter_words(chapter)?;
        let questions = self.generator.choice_questions(words, rng);
        tracing::info!(%chapter, questions = questions.len(), "starting choice session");
        ChoiceSession::new(questions)
    }

    /// Start a typed-input session, skipping words already mastered.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the chapter is unknown or empty, or mastery
    /// cannot be loaded.
    pub async fn start_input<T, R>(
        &self,
        chapter: &ChapterKey,
        ticker: T,
        rng: &mut R,
    ) -> Result<InputSession<T>, SessionError>
    where
        T: TickScheduler,
        R: Rng + ?Sized,
    {
        let words = self.chapter_words(chapter)?;
        let mastery = self.store.load_chapter_mastery(chapter).await?;
        let questions = self.generator.input_questions(words, Some(&mastery), rng);
        tracing::info!(
            %chapter,
            questions = questions.len(),
            mastered = mastery.mastered_count(),
            "starting input session"
        );
        InputSession::with_ticker(questions, ticker)
    }

    /// Persist a finished or interrupted session's summary.
    ///
    /// On failure nothing is written and the caller still holds the summary,
    /// so saving can be retried.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the store rejects the write.
    pub async fn save_summary(
        &self,
        chapter: &ChapterKey,
        mode: QuizMode,
        summary: &ScoreSummary,
    ) -> Result<ProgressRecord, SessionError> {
        let played_at = self.clock.now();
        let key = ProgressKey::new(chapter.clone(), mode);
        if let Err(err) = self
            .store
            .save_progress(chapter, mode, summary, played_at)
            .await
        {
            tracing::warn!(%key, error = %err, "failed to save quiz result");
            return Err(err.into());
        }

        tracing::info!(
            %key,
            correct = summary.correct(),
            total = summary.total(),
            percentage = summary.percentage(),
            "saved quiz result"
        );
        Ok(ProgressRecord::from_summary(summary, played_at))
    }

    /// Forget a chapter's mastery so the next input session covers every word.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the store rejects the delete.
    pub async fn reset_mastery(&self, chapter: &ChapterKey) -> Result<(), SessionError> {
        self.store.clear_mastery_for_chapter(chapter).await?;
        tracing::info!(%chapter, "cleared chapter mastery");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use storage::repository::InMemoryProgressStore;
    use vocab_core::model::{WordOutcome, WordStatus};
    use vocab_core::time::fixed_now;

    use crate::timer::ManualTicker;

    fn bank() -> WordBank {
        let mut bank = WordBank::new();
        let one = ChapterKey::from_number(1);
        for (en, ja) in [("cat", "猫"), ("dog", "犬"), ("bird", "鳥"), ("fish", "魚")] {
            bank.push_word(one.clone(), WordPair::new(en, ja).unwrap());
        }
        bank.insert_chapter(ChapterKey::from_number(2), Vec::new());
        bank
    }

    fn service() -> (QuizService, Arc<InMemoryProgressStore>) {
        let store = Arc::new(InMemoryProgressStore::new());
        let service = QuizService::new(Clock::fixed(fixed_now()), store.clone(), Arc::new(bank()));
        (service, store)
    }

    #[test]
    fn unknown_and_empty_chapters_are_rejected() {
        let (service, _) = service();
        let mut rng = StdRng::seed_from_u64(1);

        let err = service
            .start_choice(&ChapterKey::from_number(9), &mut rng)
            .unwrap_err();
        assert!(matches!(err, SessionError::UnknownChapter(_)));

        let err = service
            .start_choice(&ChapterKey::from_number(2), &mut rng)
            .unwrap_err();
        assert!(matches!(err, SessionError::Empty));
    }

    #[test]
    fn choice_session_covers_small_chapter() {
        let (service, _) = service();
        let mut rng = StdRng::seed_from_u64(2);
        let session = service
            .start_choice(&ChapterKey::from_number(1), &mut rng)
            .unwrap();
        assert_eq!(session.progress().total, 4);
    }

    #[tokio::test]
    async fn input_session_skips_mastered_words() {
        let (service, store) = service();
        let chapter = ChapterKey::from_number(1);
        let summary = ScoreSummary::new(
            2,
            2,
            vec![
                WordOutcome::new("cat", WordStatus::Correct),
                WordOutcome::new("dog", WordStatus::Correct),
            ],
        )
        .unwrap();
        store
            .save_progress(&chapter, QuizMode::Input, &summary, fixed_now())
            .await
            .unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        let session = service
            .start_input(&chapter, ManualTicker, &mut rng)
            .await
            .unwrap();
        let mut remaining: Vec<_> = session
            .questions()
            .iter()
            .map(|q| q.correct_answer.as_str())
            .collect();
        remaining.sort_unstable();
        assert_eq!(remaining, vec!["bird", "fish"]);

        service.reset_mastery(&chapter).await.unwrap();
        let session = service
            .start_input(&chapter, ManualTicker, &mut rng)
            .await
            .unwrap();
        assert_eq!(session.questions().len(), 4);
    }

    #[tokio::test]
    async fn save_summary_stamps_clock_time() {
        let (service, store) = service();
        let chapter = ChapterKey::from_number(1);
        let summary = ScoreSummary::new(1, 4, Vec::new()).unwrap();

        let record = service
            .save_summary(&chapter, QuizMode::Choice, &summary)
            .await
            .unwrap();
        assert_eq!(record.last_played, fixed_now());
        assert_eq!(record.percentage, 25);

        let book = store.load_progress().await.unwrap();
        let key = ProgressKey::new(chapter, QuizMode::Choice);
        assert_eq!(book.get(&key), Some(&record));
    }
}
