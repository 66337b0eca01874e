mod choice;
mod input;
mod progress;
mod state;

// Public API of the quiz session subsystem.
pub use crate::error::SessionError;
pub use choice::{ChoiceFeedback, ChoiceSession};
pub use input::{InputFeedback, InputSession, InputVerdict, TickOutcome};
pub use progress::{QuizPhase, SessionProgress};
pub use state::Advance;
