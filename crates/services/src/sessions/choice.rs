use vocab_core::model::{ChoiceQuestion, ScoreSummary};

use super::progress::{QuizPhase, SessionProgress};
use super::state::{Advance, QuizState};
use crate::error::SessionError;

/// Feedback shown after an option was picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceFeedback {
    pub selected: usize,
    pub is_correct: bool,
    /// Position of the correct option, for highlighting.
    pub correct_index: Option<usize>,
    pub correct_answer: String,
}

/// Multiple-choice quiz over one chapter.
///
/// Only the aggregate score is kept; per-word outcomes are not recorded in
/// this mode.
#[derive(Debug, Clone)]
pub struct ChoiceSession {
    state: QuizState<ChoiceQuestion>,
    selected: Option<usize>,
}

impl ChoiceSession {
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided.
    pub fn new(questions: Vec<ChoiceQuestion>) -> Result<Self, SessionError> {
        Ok(Self {
            state: QuizState::new(questions)?,
            selected: None,
        })
    }

    /// Answers the current question with the option at `index`.
    ///
    /// Returns `Ok(None)` if the question was already answered.
    ///
    /// # Errors
    ///
    /// `Finished` once the session ended, `OptionOutOfRange` for a bad index.
    pub fn select_option(&mut self, index: usize) -> Result<Option<ChoiceFeedback>, SessionError> {
        self.state.ensure_open()?;
        if self.state.phase() != QuizPhase::Awaiting {
            return Ok(None);
        }
        let Some(question) = self.state.current() else {
            return Err(SessionError::Finished);
        };
        if index >= question.options.len() {
            return Err(SessionError::OptionOutOfRange {
                index,
                len: question.options.len(),
            });
        }

        let is_correct = question.is_correct_option(index);
        let feedback = ChoiceFeedback {
            selected: index,
            is_correct,
            correct_index: question.correct_index(),
            correct_answer: question.correct_answer.clone(),
        };
        self.state.record(is_correct, None);
        self.selected = Some(index);
        Ok(Some(feedback))
    }

    /// # Errors
    ///
    /// `NotAnswered` while awaiting an answer, `Finished` once the session ended.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        let step = self.state.advance()?;
        self.selected = None;
        Ok(step)
    }

    /// Ends the session early, scoring only the answered questions.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Summary` if the summary cannot be built.
    pub fn interrupt(&mut self) -> Result<Option<ScoreSummary>, SessionError> {
        self.selected = None;
        self.state.interrupt()
    }

    #[must_use]
    pub fn current(&self) -> Option<&ChoiceQuestion> {
        self.state.current()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.state.current_index()
    }

    #[must_use]
    pub fn questions(&self) -> &[ChoiceQuestion] {
        self.state.questions()
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.state.score()
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.state.phase()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        self.state.progress()
    }
}
