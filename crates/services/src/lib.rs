#![forbid(unsafe_code)]

pub mod dashboard;
pub mod error;
pub mod generator;
pub mod profile;
pub mod quiz_service;
pub mod sessions;
pub mod timer;

pub use vocab_core::Clock;

pub use dashboard::{ChapterOverview, DashboardService};
pub use error::{ProfileError, SessionError};
pub use generator::{DEFAULT_SAMPLE_SIZE, DISTRACTOR_COUNT, SessionGenerator};
pub use profile::ProfileService;
pub use quiz_service::QuizService;
pub use sessions::{
    Advance, ChoiceFeedback, ChoiceSession, InputFeedback, InputSession, InputVerdict, QuizPhase,
    SessionProgress, TickOutcome,
};
pub use timer::{
    Countdown, CountdownTick, ManualTicker, QUESTION_TIME_LIMIT, TICK_PERIOD, TickScheduler,
    TimerToken, TokioTicker,
};
