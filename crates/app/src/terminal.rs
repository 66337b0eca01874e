use std::error::Error;
use std::io::Write;

use rand::Rng;
use services::{
    Advance, ChoiceFeedback, InputFeedback, InputVerdict, QuizService, SessionError, TICK_PERIOD,
    TickOutcome, TokioTicker,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use vocab_core::model::{ChapterKey, QuizMode, ScoreSummary};

/// Typed on its own line to stop a quiz early.
pub const QUIT: &str = ":q";
/// Typed in input mode to give up on a word.
pub const PASS: &str = "?";

pub type AppResult<T> = Result<T, Box<dyn Error>>;

/// Line-oriented access to stdin.
pub struct Terminal {
    lines: Lines<BufReader<Stdin>>,
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Next line of input, or `None` at end of input.
    pub async fn read_line(&mut self) -> std::io::Result<Option<String>> {
        self.lines.next_line().await
    }

    fn prompt(&self, text: &str) -> std::io::Result<()> {
        let mut out = std::io::stdout();
        write!(out, "{text}")?;
        out.flush()
    }
}

//
// ─── MULTIPLE CHOICE ───────────────────────────────────────────────────────────
//

pub async fn run_choice_quiz<R: Rng + ?Sized>(
    quiz: &QuizService,
    chapter: &ChapterKey,
    term: &mut Terminal,
    rng: &mut R,
) -> AppResult<()> {
    let mut session = quiz.start_choice(chapter, rng)?;
    println!("Chapter {chapter}: pick the English word. Type {QUIT} to stop.");

    let summary = loop {
        let Some(question) = session.current() else {
            break None;
        };
        let progress = session.progress();
        let option_count = question.options.len();
        println!();
        println!("[{}/{}] {}", progress.answered + 1, progress.total, question.prompt);
        for (i, option) in question.options.iter().enumerate() {
            println!("  {}. {option}", i + 1);
        }
        term.prompt("> ")?;

        let Some(line) = term.read_line().await? else {
            break session.interrupt()?;
        };
        let line = line.trim();
        if line == QUIT {
            break session.interrupt()?;
        }
        let Some(index) = line.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) else {
            println!("Enter a number from 1 to {option_count}.");
            continue;
        };

        match session.select_option(index) {
            Ok(Some(feedback)) => print_choice_feedback(&feedback),
            Ok(None) => {}
            Err(SessionError::OptionOutOfRange { len, .. }) => {
                println!("Enter a number from 1 to {len}.");
                continue;
            }
            Err(err) => return Err(err.into()),
        }

        if let Advance::Completed(summary) = session.advance()? {
            break Some(summary);
        }
    };

    finish(quiz, chapter, QuizMode::Choice, summary, term).await
}

fn print_choice_feedback(feedback: &ChoiceFeedback) {
    if feedback.is_correct {
        println!("Correct!");
    } else {
        println!("Wrong. The answer is \"{}\".", feedback.correct_answer);
    }
}

//
// ─── TYPED INPUT ───────────────────────────────────────────────────────────────
//

pub async fn run_input_quiz<R: Rng + ?Sized>(
    quiz: &QuizService,
    chapter: &ChapterKey,
    fresh: bool,
    term: &mut Terminal,
    rng: &mut R,
) -> AppResult<()> {
    if fresh {
        quiz.reset_mastery(chapter).await?;
    }

    let (ticker, mut ticks) = TokioTicker::new(TICK_PERIOD);
    let mut session = quiz.start_input(chapter, ticker, rng).await?;
    println!(
        "Chapter {chapter}: type the English word. {}s per word, {PASS} to pass, {QUIT} to stop.",
        session.time_limit()
    );

    let summary = loop {
        let Some(question) = session.current() else {
            break None;
        };
        let progress = session.progress();
        println!();
        println!("[{}/{}] {}", progress.answered + 1, progress.total, question.prompt);
        term.prompt("> ")?;

        let feedback = loop {
            tokio::select! {
                line = term.read_line() => {
                    let Some(line) = line? else { break None };
                    let feedback = match line.trim() {
                        QUIT => break None,
                        PASS => session.pass()?,
                        text => session.submit(text)?,
                    };
                    if feedback.is_some() {
                        break feedback;
                    }
                    term.prompt("> ")?;
                }
                Some(token) = ticks.recv() => match session.tick(token) {
                    TickOutcome::Remaining(left) if left <= 5 || left % 10 == 0 => {
                        println!("  ({left}s left)");
                    }
                    TickOutcome::Expired(feedback) => break Some(feedback),
                    TickOutcome::Remaining(_) | TickOutcome::Ignored => {}
                },
            }
        };

        let Some(feedback) = feedback else {
            break session.interrupt()?;
        };
        print_input_feedback(&feedback);

        if let Advance::Completed(summary) = session.advance()? {
            break Some(summary);
        }
    };

    finish(quiz, chapter, QuizMode::Input, summary, term).await
}

fn print_input_feedback(feedback: &InputFeedback) {
    match feedback.verdict {
        InputVerdict::Correct => println!("Correct!"),
        InputVerdict::Incorrect => println!("Wrong. The answer is \"{}\".", feedback.correct_answer),
        InputVerdict::TimeUp => println!("Time's up! The answer is \"{}\".", feedback.correct_answer),
        InputVerdict::Passed => println!("Passed. The answer is \"{}\".", feedback.correct_answer),
    }
}

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

async fn finish(
    quiz: &QuizService,
    chapter: &ChapterKey,
    mode: QuizMode,
    summary: Option<ScoreSummary>,
    term: &mut Terminal,
) -> AppResult<()> {
    let Some(summary) = summary else {
        println!("No questions answered; nothing saved.");
        return Ok(());
    };

    println!();
    println!(
        "Score: {}/{} ({}%)",
        summary.correct(),
        summary.total(),
        summary.percentage()
    );
    for outcome in summary.outcomes() {
        println!("  {:<8} {}", outcome.status.as_str(), outcome.word);
    }

    save_with_retry(quiz, chapter, mode, &summary, term).await
}

async fn save_with_retry(
    quiz: &QuizService,
    chapter: &ChapterKey,
    mode: QuizMode,
    summary: &ScoreSummary,
    term: &mut Terminal,
) -> AppResult<()> {
    loop {
        match quiz.save_summary(chapter, mode, summary).await {
            Ok(_) => {
                println!("Result saved.");
                return Ok(());
            }
            Err(err) => {
                eprintln!("Could not save the result: {err}");
                term.prompt("Retry? [y/N] ")?;
                let answer = term.read_line().await?.unwrap_or_default();
                if !answer.trim().eq_ignore_ascii_case("y") {
                    println!("Result discarded.");
                    return Ok(());
                }
            }
        }
    }
}
