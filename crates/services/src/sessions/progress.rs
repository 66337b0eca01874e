use std::fmt;

/// Where a quiz session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// Waiting for an answer to the current question.
    Awaiting,
    /// The current question is answered and its feedback is showing.
    Feedback,
    Completed,
    Interrupted,
}

impl QuizPhase {
    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Interrupted)
    }
}

impl fmt::Display for QuizPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Awaiting => "awaiting",
            Self::Feedback => "feedback",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
        };
        f.write_str(label)
    }
}

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub phase: QuizPhase,
}
