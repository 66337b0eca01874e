use vocab_core::model::{InputQuestion, ScoreSummary, WordOutcome, WordStatus};

use super::progress::{QuizPhase, SessionProgress};
use super::state::{Advance, QuizState};
use crate::error::SessionError;
use crate::timer::{Countdown, CountdownTick, ManualTicker, QUESTION_TIME_LIMIT, TickScheduler, TimerToken};

/// How a typed-input question was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputVerdict {
    Correct,
    Incorrect,
    TimeUp,
    Passed,
}

impl InputVerdict {
    /// Mastery status recorded for the word.
    #[must_use]
    pub fn status(self) -> WordStatus {
        match self {
            Self::Correct => WordStatus::Correct,
            Self::Incorrect | Self::TimeUp => WordStatus::Wrong,
            Self::Passed => WordStatus::Passed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFeedback {
    pub verdict: InputVerdict,
    /// What the learner typed. A pass shows the correct answer; time-up shows nothing.
    pub attempt: Option<String>,
    pub correct_answer: String,
}

/// Effect of a countdown tick on the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale token or no question awaiting an answer.
    Ignored,
    Remaining(u32),
    Expired(InputFeedback),
}

//
// ─── INPUT SESSION ─────────────────────────────────────────────────────────────
//

/// Timed typed-input quiz over one chapter.
///
/// Every question runs a countdown. The session owns the scheduler that
/// produces ticks and stops it whenever a question stops awaiting an answer.
#[derive(Debug)]
pub struct InputSession<T: TickScheduler = ManualTicker> {
    state: QuizState<InputQuestion>,
    countdown: Countdown,
    ticker: T,
    feedback: Option<InputFeedback>,
}

impl InputSession<ManualTicker> {
    /// Session whose ticks are delivered by the caller through [`InputSession::tick`].
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided.
    pub fn new(questions: Vec<InputQuestion>) -> Result<Self, SessionError> {
        Self::with_ticker(questions, ManualTicker)
    }
}

impl<T: TickScheduler> InputSession<T> {
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided.
    pub fn with_ticker(questions: Vec<InputQuestion>, ticker: T) -> Result<Self, SessionError> {
        Self::with_time_limit(questions, ticker, QUESTION_TIME_LIMIT)
    }

    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided.
    pub fn with_time_limit(
        questions: Vec<InputQuestion>,
        ticker: T,
        seconds: u32,
    ) -> Result<Self, SessionError> {
        let mut session = Self {
            state: QuizState::new(questions)?,
            countdown: Countdown::new(seconds),
            ticker,
            feedback: None,
        };
        session.start_timer();
        Ok(session)
    }

    /// Checks a typed answer against the current question.
    ///
    /// Blank input and answers to an already-answered question are ignored.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Finished` once the session ended.
    pub fn submit(&mut self, text: &str) -> Result<Option<InputFeedback>, SessionError> {
        self.state.ensure_open()?;
        let attempt = text.trim();
        if self.state.phase() != QuizPhase::Awaiting || attempt.is_empty() {
            return Ok(None);
        }
        let Some(question) = self.state.current() else {
            return Err(SessionError::Finished);
        };

        let verdict = if question.accepts(attempt) {
            InputVerdict::Correct
        } else {
            InputVerdict::Incorrect
        };
        Ok(Some(self.finish_question(verdict, Some(attempt.to_owned()))))
    }

    /// Gives up on the current question and reveals the answer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Finished` once the session ended.
    pub fn pass(&mut self) -> Result<Option<InputFeedback>, SessionError> {
        self.state.ensure_open()?;
        if self.state.phase() != QuizPhase::Awaiting {
            return Ok(None);
        }
        let Some(question) = self.state.current() else {
            return Err(SessionError::Finished);
        };

        let answer = question.correct_answer.clone();
        Ok(Some(self.finish_question(InputVerdict::Passed, Some(answer))))
    }

    /// Applies one countdown tick. Ticks from earlier questions are ignored.
    pub fn tick(&mut self, token: TimerToken) -> TickOutcome {
        if self.state.phase() != QuizPhase::Awaiting {
            return TickOutcome::Ignored;
        }

        match self.countdown.tick(token) {
            CountdownTick::Stale => TickOutcome::Ignored,
            CountdownTick::Running(remaining) => TickOutcome::Remaining(remaining),
            CountdownTick::Expired => {
                TickOutcome::Expired(self.finish_question(InputVerdict::TimeUp, None))
            }
        }
    }

    /// # Errors
    ///
    /// `NotAnswered` while awaiting an answer, `Finished` once the session ended.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        let step = self.state.advance()?;
        self.feedback = None;
        match step {
            Advance::Next => self.start_timer(),
            Advance::Completed(_) => self.stop_timer(),
        }
        Ok(step)
    }

    /// Ends the session early; the timer is stopped before anything else.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Summary` if the summary cannot be built.
    pub fn interrupt(&mut self) -> Result<Option<ScoreSummary>, SessionError> {
        self.stop_timer();
        self.feedback = None;
        self.state.interrupt()
    }

    #[must_use]
    pub fn current(&self) -> Option<&InputQuestion> {
        self.state.current()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.state.current_index()
    }

    #[must_use]
    pub fn questions(&self) -> &[InputQuestion] {
        self.state.questions()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.state.score()
    }

    #[must_use]
    pub fn outcomes(&self) -> &[WordOutcome] {
        self.state.outcomes()
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.state.phase()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        self.state.progress()
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&InputFeedback> {
        self.feedback.as_ref()
    }

    /// Token of the running countdown, if a question is awaiting an answer.
    #[must_use]
    pub fn timer_token(&self) -> Option<TimerToken> {
        self.countdown.token()
    }

    #[must_use]
    pub fn remaining_time(&self) -> u32 {
        self.countdown.remaining()
    }

    #[must_use]
    pub fn time_limit(&self) -> u32 {
        self.countdown.budget()
    }

    #[must_use]
    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    fn start_timer(&mut self) {
        let token = self.countdown.restart();
        self.ticker.schedule(token);
    }

    fn stop_timer(&mut self) {
        self.ticker.cancel();
        self.countdown.cancel();
    }

    fn finish_question(&mut self, verdict: InputVerdict, attempt: Option<String>) -> InputFeedback {
        self.stop_timer();

        let correct_answer = self
            .state
            .current()
            .map(|q| q.correct_answer.clone())
            .unwrap_or_default();
        let outcome = WordOutcome::new(correct_answer.clone(), verdict.status());
        self.state
            .record(verdict == InputVerdict::Correct, Some(outcome));

        let feedback = InputFeedback {
            verdict,
            attempt,
            correct_answer,
        };
        self.feedback = Some(feedback.clone());
        feedback
    }
}

impl<T: TickScheduler> Drop for InputSession<T> {
    fn drop(&mut self) {
        self.ticker.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_core::model::WordPair;

    #[derive(Debug, Default)]
    struct RecordingTicker {
        scheduled: Vec<TimerToken>,
        cancels: usize,
        active: bool,
    }

    impl TickScheduler for RecordingTicker {
        fn schedule(&mut self, token: TimerToken) {
            self.scheduled.push(token);
            self.active = true;
        }

        fn cancel(&mut self) {
            self.cancels += 1;
            self.active = false;
        }
    }

    fn questions(words: &[(&str, &str)]) -> Vec<InputQuestion> {
        words
            .iter()
            .map(|(en, ja)| InputQuestion::from_word(&WordPair::new(en, ja).unwrap()))
            .collect()
    }

    fn animals() -> Vec<InputQuestion> {
        questions(&[("cat", "猫"), ("dog", "犬"), ("bird", "鳥"), ("fish", "魚")])
    }

    #[test]
    fn end_to_end_scenario_scores_and_records_outcomes() {
        let mut session = InputSession::new(animals()).unwrap();

        let first = session.submit("Cat").unwrap().unwrap();
        assert_eq!(first.verdict, InputVerdict::Correct);
        session.advance().unwrap();

        // nothing typed for 犬: the countdown runs out
        let token = session.timer_token().unwrap();
        for _ in 1..QUESTION_TIME_LIMIT {
            assert!(matches!(session.tick(token), TickOutcome::Remaining(_)));
        }
        let TickOutcome::Expired(second) = session.tick(token) else {
            panic!("expected expiry");
        };
        assert_eq!(second.verdict, InputVerdict::TimeUp);
        assert!(second.attempt.is_none());
        assert_eq!(session.tick(token), TickOutcome::Ignored);
        assert_eq!(session.score(), 1);
        session.advance().unwrap();

        let third = session.pass().unwrap().unwrap();
        assert_eq!(third.verdict, InputVerdict::Passed);
        assert_eq!(third.attempt.as_deref(), Some("bird"));
        session.advance().unwrap();

        session.submit(" fish ").unwrap().unwrap();
        let Advance::Completed(summary) = session.advance().unwrap() else {
            panic!("expected completion");
        };

        assert_eq!(summary.correct(), 2);
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.percentage(), 50);
        assert_eq!(
            summary.outcomes(),
            &[
                WordOutcome::new("cat", WordStatus::Correct),
                WordOutcome::new("dog", WordStatus::Wrong),
                WordOutcome::new("bird", WordStatus::Passed),
                WordOutcome::new("fish", WordStatus::Correct),
            ]
        );
    }

    #[test]
    fn blank_and_repeated_submissions_are_ignored() {
        let mut session = InputSession::new(animals()).unwrap();

        assert!(session.submit("   ").unwrap().is_none());
        assert_eq!(session.phase(), QuizPhase::Awaiting);

        session.submit("cat").unwrap().unwrap();
        assert!(session.submit("cat").unwrap().is_none());
        assert!(session.pass().unwrap().is_none());
        assert_eq!(session.score(), 1);
        assert_eq!(session.outcomes().len(), 1);
    }

    #[test]
    fn expiry_records_wrong_without_attempt() {
        let mut session =
            InputSession::with_time_limit(animals(), ManualTicker, 2).unwrap();
        let token = session.timer_token().unwrap();

        assert_eq!(session.tick(token), TickOutcome::Remaining(1));
        let TickOutcome::Expired(feedback) = session.tick(token) else {
            panic!("expected expiry");
        };
        assert_eq!(feedback.verdict, InputVerdict::TimeUp);
        assert!(feedback.attempt.is_none());
        assert_eq!(session.outcomes(), &[WordOutcome::new("cat", WordStatus::Wrong)]);
        assert_eq!(session.score(), 0);
        assert!(session.timer_token().is_none());
    }

    #[test]
    fn stale_tick_after_submit_is_ignored() {
        let mut session = InputSession::new(animals()).unwrap();
        let token = session.timer_token().unwrap();

        session.submit("cat").unwrap();
        assert_eq!(session.tick(token), TickOutcome::Ignored);
        assert_eq!(session.phase(), QuizPhase::Feedback);

        session.advance().unwrap();
        // a tick from the previous question must not touch the new countdown
        assert_eq!(session.tick(token), TickOutcome::Ignored);
        assert_eq!(session.remaining_time(), QUESTION_TIME_LIMIT);
        let fresh = session.timer_token().unwrap();
        assert_eq!(
            session.tick(fresh),
            TickOutcome::Remaining(QUESTION_TIME_LIMIT - 1)
        );
    }

    #[test]
    fn ticker_follows_question_lifecycle() {
        let mut session =
            InputSession::with_ticker(animals(), RecordingTicker::default()).unwrap();
        assert_eq!(session.ticker().scheduled.len(), 1);
        assert!(session.ticker().active);

        session.submit("cat").unwrap();
        assert!(!session.ticker().active);

        session.advance().unwrap();
        assert_eq!(session.ticker().scheduled.len(), 2);
        assert_ne!(session.ticker().scheduled[0], session.ticker().scheduled[1]);
        assert!(session.ticker().active);

        session.interrupt().unwrap();
        assert!(!session.ticker().active);
        assert_eq!(session.ticker().scheduled.len(), 2);
    }

    #[test]
    fn interrupt_keeps_answered_outcomes_only() {
        let mut session = InputSession::new(animals()).unwrap();
        session.submit("cat").unwrap();
        session.advance().unwrap();
        session.pass().unwrap();
        session.advance().unwrap();
        let token = session.timer_token().unwrap();

        let summary = session.interrupt().unwrap().unwrap();
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.correct(), 1);
        assert_eq!(summary.outcomes().len(), 2);
        assert!(matches!(session.submit("bird"), Err(SessionError::Finished)));
        assert_eq!(session.tick(token), TickOutcome::Ignored);
    }
}
