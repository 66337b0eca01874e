//! Per-question countdown and the background tickers that drive it.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Seconds allowed per typed-input question.
pub const QUESTION_TIME_LIMIT: u32 = 30;

/// Interval between countdown ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Identifies one run of a countdown. Ticks carrying an older token are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// What a single tick did to the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// The tick belongs to a cancelled or superseded run.
    Stale,
    Running(u32),
    /// The budget is used up; the countdown has stopped.
    Expired,
}

//
// ─── COUNTDOWN ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    budget: u32,
    remaining: u32,
    generation: u64,
    running: bool,
}

impl Countdown {
    #[must_use]
    pub fn new(budget: u32) -> Self {
        Self {
            budget,
            remaining: budget,
            generation: 0,
            running: false,
        }
    }

    /// Starts a fresh run with the full budget and returns its token.
    pub fn restart(&mut self) -> TimerToken {
        self.generation += 1;
        self.remaining = self.budget;
        self.running = true;
        TimerToken(self.generation)
    }

    /// Stops the current run. Returns `false` if nothing was running.
    pub fn cancel(&mut self) -> bool {
        let was_running = self.running;
        if was_running {
            // retire the token so queued ticks from this run are dropped
            self.generation += 1;
            self.running = false;
        }
        was_running
    }

    pub fn tick(&mut self, token: TimerToken) -> CountdownTick {
        if !self.running || token.0 != self.generation {
            return CountdownTick::Stale;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            self.generation += 1;
            CountdownTick::Expired
        } else {
            CountdownTick::Running(self.remaining)
        }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn budget(&self) -> u32 {
        self.budget
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Token of the active run, if any.
    #[must_use]
    pub fn token(&self) -> Option<TimerToken> {
        self.running.then_some(TimerToken(self.generation))
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(QUESTION_TIME_LIMIT)
    }
}

//
// ─── SCHEDULERS ────────────────────────────────────────────────────────────────
//

/// Delivers ticks for a countdown run until cancelled.
pub trait TickScheduler {
    /// Begins ticking for `token`, replacing any earlier schedule.
    fn schedule(&mut self, token: TimerToken);

    /// Stops ticking. Calling it when nothing is scheduled is a no-op.
    fn cancel(&mut self);
}

/// Scheduler for callers that deliver ticks themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualTicker;

impl TickScheduler for ManualTicker {
    fn schedule(&mut self, _token: TimerToken) {}

    fn cancel(&mut self) {}
}

/// Sends the scheduled token into a channel once per period from a tokio task.
#[derive(Debug)]
pub struct TokioTicker {
    period: Duration,
    tx: mpsc::UnboundedSender<TimerToken>,
    task: Option<JoinHandle<()>>,
}

impl TokioTicker {
    #[must_use]
    pub fn new(period: Duration) -> (Self, mpsc::UnboundedReceiver<TimerToken>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let ticker = Self {
            period,
            tx,
            task: None,
        };
        (ticker, rx)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl TickScheduler for TokioTicker {
    fn schedule(&mut self, token: TimerToken) {
        self.cancel();

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no tokio runtime available; countdown ticks disabled");
            return;
        };

        let period = self.period;
        let tx = self.tx.clone();
        self.task = Some(handle.spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            loop {
                interval.tick().await;
                if tx.send(token).is_err() {
                    break;
                }
            }
        }));
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TokioTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}
