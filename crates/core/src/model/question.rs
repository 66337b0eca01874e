use serde::{Deserialize, Serialize};

use crate::model::word::WordPair;

/// Multiple-choice question with up to four English options.
///
/// Chapters with fewer than four words produce fewer options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceQuestion {
    pub prompt: String,
    pub correct_answer: String,
    pub options: Vec<String>,
}

impl ChoiceQuestion {
    #[must_use]
    pub fn is_correct_option(&self, index: usize) -> bool {
        self.options
            .get(index)
            .is_some_and(|option| *option == self.correct_answer)
    }

    #[must_use]
    pub fn correct_index(&self) -> Option<usize> {
        self.options
            .iter()
            .position(|option| *option == self.correct_answer)
    }
}

/// Typed-input question: the learner types the English term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputQuestion {
    pub prompt: String,
    pub correct_answer: String,
}

impl InputQuestion {
    #[must_use]
    pub fn from_word(word: &WordPair) -> Self {
        Self {
            prompt: word.japanese().to_owned(),
            correct_answer: word.english().to_owned(),
        }
    }

    /// Case-insensitive comparison of trimmed text.
    #[must_use]
    pub fn accepts(&self, attempt: &str) -> bool {
        attempt.trim().to_lowercase() == self.correct_answer.trim().to_lowercase()
    }
}
