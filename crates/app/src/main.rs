mod config;
mod terminal;

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use services::{Clock, DashboardService, ProfileService, QuizService};
use storage::repository::Storage;
use storage::word_source::load_word_bank_dir;
use tracing_subscriber::EnvFilter;
use vocab_core::model::{ProgressRecord, QuizMode, WordBank};

use config::{Args, Command, Config, print_usage, prepare_sqlite_file};
use terminal::{AppResult, Terminal, run_choice_quiz, run_input_quiz};

fn load_bank(config: &Config) -> AppResult<Arc<WordBank>> {
    let bank = load_word_bank_dir(&config.data_dir)?;
    if bank.is_empty() {
        tracing::warn!(dir = %config.data_dir.display(), "word bank is empty");
    }
    Ok(Arc::new(bank))
}

fn describe(record: Option<&ProgressRecord>) -> String {
    record.map_or_else(
        || "-".to_owned(),
        |r| format!("{}/{} ({}%)", r.correct, r.total, r.percentage),
    )
}

async fn run() -> AppResult<()> {
    let args = Args::parse(std::env::args().skip(1), Config::from_env()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    if args.command == Command::Help {
        print_usage();
        return Ok(());
    }

    // Open + migrate SQLite at startup so services only see the trait object.
    prepare_sqlite_file(&args.config.db_url)?;
    let storage = Storage::sqlite(&args.config.db_url).await?;
    let clock = Clock::default();
    let profiles = ProfileService::new(clock, Arc::clone(&storage.progress));

    match args.command {
        Command::Help => print_usage(),
        Command::Register { name } => {
            let user = profiles.register(&name).await?;
            println!("Welcome, {}!", user.name());
        }
        Command::Clear => {
            profiles.clear_all().await?;
            println!("All progress and the registration were removed.");
        }
        Command::Chapters => {
            let bank = load_bank(&args.config)?;
            let dashboard = DashboardService::new(Arc::clone(&storage.progress), bank);
            if let Some(user) = profiles.current_user().await? {
                println!("Learner: {}", user.name());
            }
            println!(
                "{:<8} {:>6} {:>16} {:>16} {:>9}",
                "chapter", "words", "choice", "input", "mastered"
            );
            for row in dashboard.overview().await? {
                println!(
                    "{:<8} {:>6} {:>16} {:>16} {:>9}",
                    row.chapter.as_str(),
                    row.word_count,
                    describe(row.choice.as_ref()),
                    describe(row.input.as_ref()),
                    row.mastered
                );
            }
        }
        Command::Words { chapter } => {
            let bank = load_bank(&args.config)?;
            let dashboard = DashboardService::new(Arc::clone(&storage.progress), bank);
            for word in dashboard.words(&chapter)? {
                println!("{:<24} {}", word.english(), word.japanese());
            }
        }
        Command::Reset { chapter } => {
            let bank = load_bank(&args.config)?;
            let quiz = QuizService::new(clock, Arc::clone(&storage.progress), bank);
            quiz.chapter_words(&chapter)?;
            quiz.reset_mastery(&chapter).await?;
            println!("Mastery for chapter {chapter} was reset.");
        }
        Command::Quiz {
            chapter,
            mode,
            fresh,
        } => {
            let Some(user) = profiles.current_user().await? else {
                eprintln!("No learner registered yet. Run `app register <name>` first.");
                return Ok(());
            };
            tracing::info!(name = user.name(), %chapter, %mode, "launching quiz");

            let bank = load_bank(&args.config)?;
            let quiz = QuizService::new(clock, Arc::clone(&storage.progress), bank);
            let mut term = Terminal::new();
            let mut rng = StdRng::from_os_rng();
            match mode {
                QuizMode::Choice => run_choice_quiz(&quiz, &chapter, &mut term, &mut rng).await?,
                QuizMode::Input => {
                    run_input_quiz(&quiz, &chapter, fresh, &mut term, &mut rng).await?;
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
