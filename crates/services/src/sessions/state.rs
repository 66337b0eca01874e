use vocab_core::model::{ScoreSummary, WordOutcome};

use super::progress::{QuizPhase, SessionProgress};
use crate::error::SessionError;

/// Result of moving past an answered question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Another question is now awaiting an answer.
    Next,
    /// The last question was answered; the session is over.
    Completed(ScoreSummary),
}

//
// ─── QUIZ STATE ────────────────────────────────────────────────────────────────
//

/// Question cursor, score and outcomes shared by both quiz modes.
///
/// Score and outcomes are updated the moment an answer is recorded and are
/// read back as-is when the session ends.
#[derive(Debug, Clone)]
pub(crate) struct QuizState<Q> {
    questions: Vec<Q>,
    current: usize,
    score: u32,
    outcomes: Vec<WordOutcome>,
    phase: QuizPhase,
}

impl<Q> QuizState<Q> {
    pub(crate) fn new(questions: Vec<Q>) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        Ok(Self {
            questions,
            current: 0,
            score: 0,
            outcomes: Vec::new(),
            phase: QuizPhase::Awaiting,
        })
    }

    pub(crate) fn current(&self) -> Option<&Q> {
        if self.phase.is_finished() {
            return None;
        }
        self.questions.get(self.current)
    }

    pub(crate) fn current_index(&self) -> usize {
        self.current
    }

    pub(crate) fn questions(&self) -> &[Q] {
        &self.questions
    }

    pub(crate) fn score(&self) -> u32 {
        self.score
    }

    pub(crate) fn outcomes(&self) -> &[WordOutcome] {
        &self.outcomes
    }

    pub(crate) fn phase(&self) -> QuizPhase {
        self.phase
    }

    /// Number of questions with a recorded answer.
    pub(crate) fn answered(&self) -> usize {
        match self.phase {
            QuizPhase::Awaiting => self.current,
            QuizPhase::Feedback => self.current + 1,
            QuizPhase::Completed | QuizPhase::Interrupted => self.questions.len(),
        }
    }

    pub(crate) fn ensure_open(&self) -> Result<(), SessionError> {
        if self.phase.is_finished() {
            return Err(SessionError::Finished);
        }
        Ok(())
    }

    /// Records the answer to the current question and moves to `Feedback`.
    ///
    /// Callers check `phase()` first; recording outside `Awaiting` is ignored.
    pub(crate) fn record(&mut self, is_correct: bool, outcome: Option<WordOutcome>) {
        if self.phase != QuizPhase::Awaiting {
            return;
        }
        if is_correct {
            self.score += 1;
        }
        if let Some(outcome) = outcome {
            self.outcomes.push(outcome);
        }
        self.phase = QuizPhase::Feedback;
    }

    pub(crate) fn advance(&mut self) -> Result<Advance, SessionError> {
        match self.phase {
            QuizPhase::Awaiting => Err(SessionError::NotAnswered),
            QuizPhase::Completed | QuizPhase::Interrupted => Err(SessionError::Finished),
            QuizPhase::Feedback => {
                if self.current + 1 >= self.questions.len() {
                    self.phase = QuizPhase::Completed;
                    let summary = self.summary(self.questions.len())?;
                    Ok(Advance::Completed(summary))
                } else {
                    self.current += 1;
                    self.phase = QuizPhase::Awaiting;
                    Ok(Advance::Next)
                }
            }
        }
    }

    /// Ends the session early, keeping only the answered questions.
    ///
    /// Returns `None` when nothing was answered or the session already ended.
    pub(crate) fn interrupt(&mut self) -> Result<Option<ScoreSummary>, SessionError> {
        if self.phase.is_finished() {
            return Ok(None);
        }

        let answered = self.answered();
        self.questions.truncate(answered);
        self.phase = QuizPhase::Interrupted;
        if answered == 0 {
            return Ok(None);
        }
        self.summary(answered).map(Some)
    }

    pub(crate) fn progress(&self) -> SessionProgress {
        let total = self.questions.len();
        let answered = self.answered();
        SessionProgress {
            total,
            answered,
            remaining: total.saturating_sub(answered),
            phase: self.phase,
        }
    }

    fn summary(&self, total: usize) -> Result<ScoreSummary, SessionError> {
        Ok(ScoreSummary::from_counts(
            self.score,
            total,
            self.outcomes.clone(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_core::model::WordStatus;

    fn state(len: usize) -> QuizState<usize> {
        QuizState::new((0..len).collect()).unwrap()
    }

    #[test]
    fn empty_question_set_is_rejected() {
        let err = QuizState::<usize>::new(Vec::new()).unwrap_err();
        assert!(matches!(err, SessionError::Empty));
    }

    #[test]
    fn advance_requires_an_answer() {
        let mut quiz = state(2);
        assert!(matches!(quiz.advance(), Err(SessionError::NotAnswered)));

        quiz.record(true, None);
        assert_eq!(quiz.advance().unwrap(), Advance::Next);
        assert_eq!(quiz.current_index(), 1);
        assert_eq!(quiz.phase(), QuizPhase::Awaiting);
    }

    #[test]
    fn completion_reports_recorded_score() {
        let mut quiz = state(3);
        for correct in [true, false, true] {
            quiz.record(correct, None);
            let step = quiz.advance().unwrap();
            if quiz.phase() == QuizPhase::Completed {
                let Advance::Completed(summary) = step else {
                    panic!("expected completion");
                };
                assert_eq!(summary.correct(), 2);
                assert_eq!(summary.total(), 3);
                assert_eq!(summary.percentage(), 67);
            }
        }
        assert_eq!(quiz.phase(), QuizPhase::Completed);
        assert!(quiz.current().is_none());
        assert!(matches!(quiz.advance(), Err(SessionError::Finished)));
        assert!(matches!(quiz.ensure_open(), Err(SessionError::Finished)));
    }

    #[test]
    fn repeated_record_is_ignored() {
        let mut quiz = state(1);
        quiz.record(true, Some(WordOutcome::new("cat", WordStatus::Correct)));
        quiz.record(true, Some(WordOutcome::new("cat", WordStatus::Correct)));
        assert_eq!(quiz.score(), 1);
        assert_eq!(quiz.outcomes().len(), 1);
    }

    #[test]
    fn interrupt_truncates_to_answered_questions() {
        let mut quiz = state(30);
        for _ in 0..4 {
            quiz.record(true, None);
            quiz.advance().unwrap();
        }
        quiz.record(false, None);

        let summary = quiz.interrupt().unwrap().unwrap();
        assert_eq!(summary.total(), 5);
        assert_eq!(summary.correct(), 4);
        assert_eq!(summary.percentage(), 80);
        assert_eq!(quiz.questions().len(), 5);
        assert_eq!(quiz.phase(), QuizPhase::Interrupted);
    }

    #[test]
    fn interrupt_while_awaiting_excludes_current_question() {
        let mut quiz = state(10);
        quiz.record(true, None);
        quiz.advance().unwrap();

        let summary = quiz.interrupt().unwrap().unwrap();
        assert_eq!(summary.total(), 1);
        assert_eq!(summary.percentage(), 100);
    }

    #[test]
    fn interrupt_without_answers_yields_nothing() {
        let mut quiz = state(10);
        assert!(quiz.interrupt().unwrap().is_none());
        assert_eq!(quiz.phase(), QuizPhase::Interrupted);
        assert!(quiz.interrupt().unwrap().is_none());
    }

    #[test]
    fn progress_tracks_phase() {
        let mut quiz = state(3);
        assert_eq!(
            quiz.progress(),
            SessionProgress {
                total: 3,
                answered: 0,
                remaining: 3,
                phase: QuizPhase::Awaiting,
            }
        );

        quiz.record(false, None);
        let progress = quiz.progress();
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.remaining, 2);
        assert_eq!(progress.phase, QuizPhase::Feedback);
    }
}
