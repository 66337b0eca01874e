mod ids;
mod mastery;
mod progress;
mod question;
mod summary;
mod user;
mod word;

pub use ids::ChapterKey;
pub use mastery::{ChapterMastery, MasteryLedger, WordStatus, WordStatusError};
pub use progress::{ProgressKey, ProgressRecord, QuizMode, QuizModeError};
pub use question::{ChoiceQuestion, InputQuestion};
pub use summary::{ScoreError, ScoreSummary, WordOutcome};
pub use user::{User, UserError};
pub use word::{WordBank, WordError, WordPair};
