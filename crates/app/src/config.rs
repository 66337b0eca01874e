use std::fmt;
use std::path::{Path, PathBuf};

use vocab_core::model::{ChapterKey, QuizMode};

pub const DB_URL_ENV: &str = "VOCAB_DB_URL";
pub const DATA_DIR_ENV: &str = "VOCAB_DATA_DIR";
pub const DEFAULT_DB_URL: &str = "sqlite://vocab.sqlite3";
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { name: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidChapter { raw: String },
    InvalidMode { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { name } => write!(f, "missing required {name}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidChapter { raw } => write!(f, "invalid --chapter value: {raw:?}"),
            ArgsError::InvalidMode { raw } => {
                write!(f, "invalid --mode value: {raw} (expected choice or input)")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

/// Locations of the word data and the progress database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_url: String,
    pub data_dir: PathBuf,
}

impl Config {
    /// Reads the environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_url = lookup(DB_URL_ENV)
            .filter(|value| !value.trim().is_empty())
            .map_or_else(
                || normalize_sqlite_url(DEFAULT_DB_URL),
                |value| normalize_sqlite_url(&value),
            );
        let data_dir = lookup(DATA_DIR_ENV)
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);
        Self { db_url, data_dir }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register { name: String },
    Chapters,
    Words { chapter: ChapterKey },
    Quiz {
        chapter: ChapterKey,
        mode: QuizMode,
        fresh: bool,
    },
    Reset { chapter: ChapterKey },
    Clear,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub config: Config,
    pub command: Command,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_chapter(raw: String) -> Result<ChapterKey, ArgsError> {
    ChapterKey::new(&raw).map_err(|_| ArgsError::InvalidChapter { raw })
}

fn parse_mode(raw: String) -> Result<QuizMode, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidMode { raw })
}

impl Args {
    /// Parses `argv` (without the program name) on top of `config`.
    pub fn parse(
        argv: impl IntoIterator<Item = String>,
        mut config: Config,
    ) -> Result<Self, ArgsError> {
        let mut args = argv.into_iter();
        let Some(subcommand) = args.next() else {
            return Ok(Self {
                config,
                command: Command::Help,
            });
        };

        let mut positional: Vec<String> = Vec::new();
        let mut chapter = None;
        let mut mode = QuizMode::Choice;
        let mut fresh = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    config.db_url = normalize_sqlite_url(&value);
                }
                "--data" => config.data_dir = PathBuf::from(require_value(&mut args, "--data")?),
                "--chapter" | "-c" => {
                    chapter = Some(parse_chapter(require_value(&mut args, "--chapter")?)?);
                }
                "--mode" | "-m" => mode = parse_mode(require_value(&mut args, "--mode")?)?,
                "--fresh" => fresh = true,
                "--help" | "-h" => {
                    return Ok(Self {
                        config,
                        command: Command::Help,
                    });
                }
                _ if arg.starts_with('-') => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        let require_chapter =
            |chapter: Option<ChapterKey>| chapter.ok_or(ArgsError::MissingArgument { name: "--chapter" });

        let command = match subcommand.as_str() {
            "register" => {
                let name = positional.join(" ");
                if name.trim().is_empty() {
                    return Err(ArgsError::MissingArgument { name: "name" });
                }
                return Ok(Self {
                    config,
                    command: Command::Register { name },
                });
            }
            "chapters" => Command::Chapters,
            "words" => Command::Words {
                chapter: require_chapter(chapter)?,
            },
            "quiz" => Command::Quiz {
                chapter: require_chapter(chapter)?,
                mode,
                fresh,
            },
            "reset" => Command::Reset {
                chapter: require_chapter(chapter)?,
            },
            "clear" => Command::Clear,
            "help" | "--help" | "-h" => Command::Help,
            _ => return Err(ArgsError::UnknownCommand(subcommand)),
        };

        if let Some(extra) = positional.into_iter().next() {
            return Err(ArgsError::UnknownArg(extra));
        }
        Ok(Self { config, command })
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app register <name>");
    eprintln!("  app chapters");
    eprintln!("  app words --chapter <key>");
    eprintln!("  app quiz  --chapter <key> [--mode choice|input] [--fresh]");
    eprintln!("  app reset --chapter <key>");
    eprintln!("  app clear");
    eprintln!();
    eprintln!("Common options:");
    eprintln!("  --db <sqlite_url>   default {DEFAULT_DB_URL}");
    eprintln!("  --data <dir>        default {DEFAULT_DATA_DIR}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  {DB_URL_ENV}, {DATA_DIR_ENV}, RUST_LOG");
}

/// Turns a bare path or `sqlite:` URL into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Creates the database file and its parent directory so the pool can open it.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" || db_url.contains("mode=memory") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_owned(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_owned(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            db_url: "sqlite::memory:".into(),
            data_dir: PathBuf::from("data"),
        }
    }

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(args.iter().map(|a| (*a).to_owned()), base())
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = Config::from_lookup(|key| match key {
            DB_URL_ENV => Some("sqlite:///tmp/words.sqlite3".into()),
            DATA_DIR_ENV => Some("/srv/words".into()),
            _ => None,
        });
        assert_eq!(config.db_url, "sqlite:///tmp/words.sqlite3");
        assert_eq!(config.data_dir, PathBuf::from("/srv/words"));

        let defaults = Config::from_lookup(|_| None);
        assert!(defaults.db_url.starts_with("sqlite://"));
        assert!(defaults.db_url.ends_with("vocab.sqlite3"));
        assert_eq!(defaults.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
    }

    #[test]
    fn quiz_command_with_flags() {
        let args = parse(&["quiz", "--chapter", "3", "--mode", "input", "--fresh", "--data", "words"])
            .unwrap();
        assert_eq!(
            args.command,
            Command::Quiz {
                chapter: ChapterKey::from_number(3),
                mode: QuizMode::Input,
                fresh: true,
            }
        );
        assert_eq!(args.config.data_dir, PathBuf::from("words"));
    }

    #[test]
    fn quiz_defaults_to_choice_mode() {
        let args = parse(&["quiz", "-c", "1"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Quiz {
                mode: QuizMode::Choice,
                fresh: false,
                ..
            }
        ));
    }

    #[test]
    fn register_joins_name_words() {
        let args = parse(&["register", "Hana", "Sato"]).unwrap();
        assert_eq!(
            args.command,
            Command::Register {
                name: "Hana Sato".into()
            }
        );
    }

    #[test]
    fn invalid_input_is_reported() {
        assert_eq!(
            parse(&["quiz"]).unwrap_err(),
            ArgsError::MissingArgument { name: "--chapter" }
        );
        assert_eq!(
            parse(&["quiz", "--chapter", "1", "--mode", "speed"]).unwrap_err(),
            ArgsError::InvalidMode { raw: "speed".into() }
        );
        assert_eq!(
            parse(&["words", "--chapter"]).unwrap_err(),
            ArgsError::MissingValue { flag: "--chapter" }
        );
        assert_eq!(
            parse(&["dance"]).unwrap_err(),
            ArgsError::UnknownCommand("dance".into())
        );
        assert_eq!(
            parse(&["chapters", "--verbose"]).unwrap_err(),
            ArgsError::UnknownArg("--verbose".into())
        );
        assert_eq!(parse(&["register"]).unwrap_err(), ArgsError::MissingArgument { name: "name" });
    }

    #[test]
    fn sqlite_urls_are_normalized() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(normalize_sqlite_url("sqlite:///a/b.db"), "sqlite:///a/b.db");
        assert_eq!(normalize_sqlite_url("/a/b.db"), "sqlite:///a/b.db");
        assert!(normalize_sqlite_url("sqlite:rel.db").ends_with("/rel.db"));
    }
}
