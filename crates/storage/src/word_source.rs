//! CSV ingestion for the word bank.
//!
//! The primary file (`data.csv`) carries `Chapter,English,Japanese` rows.
//! Optional `chapter<key>.csv` files replace a whole chapter and use
//! `English` (or `Idiom`) plus `Japanese` columns.

use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use vocab_core::model::{ChapterKey, WordBank, WordPair};

pub const PRIMARY_FILE: &str = "data.csv";
const OVERRIDE_PREFIX: &str = "chapter";
const OVERRIDE_EXTENSION: &str = "csv";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DataLoadError {
    #[error("word list not found at {}", path.display())]
    Missing { path: PathBuf },

    #[error("word list is malformed: {0}")]
    Malformed(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
struct BankRow {
    #[serde(rename = "Chapter", default)]
    chapter: Option<String>,
    #[serde(rename = "English", default)]
    english: Option<String>,
    #[serde(rename = "Japanese", default)]
    japanese: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OverrideRow {
    #[serde(rename = "English", default)]
    english: Option<String>,
    #[serde(rename = "Idiom", default)]
    idiom: Option<String>,
    #[serde(rename = "Japanese", default)]
    japanese: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

/// Parse the primary word list. Rows missing a chapter or either term are dropped.
///
/// # Errors
///
/// Returns `DataLoadError::Malformed` if the CSV cannot be decoded.
pub fn load_word_bank<R: Read>(input: R) -> Result<WordBank, DataLoadError> {
    let mut bank = WordBank::new();
    let mut dropped = 0_usize;

    for row in reader(input).deserialize::<BankRow>() {
        let row = row?;
        let chapter = non_blank(row.chapter).and_then(|c| ChapterKey::new(c).ok());
        let word = match (non_blank(row.english), non_blank(row.japanese)) {
            (Some(en), Some(ja)) => WordPair::new(en, ja).ok(),
            _ => None,
        };
        match (chapter, word) {
            (Some(chapter), Some(word)) => bank.push_word(chapter, word),
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        tracing::debug!(dropped, "skipped incomplete word rows");
    }
    Ok(bank)
}

/// Parse a single chapter override file.
///
/// # Errors
///
/// Returns `DataLoadError::Malformed` if the CSV cannot be decoded.
pub fn read_chapter_override<R: Read>(input: R) -> Result<Vec<WordPair>, DataLoadError> {
    let mut words = Vec::new();
    for row in reader(input).deserialize::<OverrideRow>() {
        let row = row?;
        let english = non_blank(row.english).or_else(|| non_blank(row.idiom));
        if let (Some(en), Some(ja)) = (english, non_blank(row.japanese)) {
            if let Ok(word) = WordPair::new(en, ja) {
                words.push(word);
            }
        }
    }
    Ok(words)
}

/// Replace a chapter with override data when the override parses and is non-empty.
///
/// Parse failures are logged and leave the bank untouched. Returns whether the
/// chapter was replaced.
pub fn apply_chapter_override<R: Read>(bank: &mut WordBank, chapter: ChapterKey, input: R) -> bool {
    match read_chapter_override(input) {
        Ok(words) => {
            let count = words.len();
            let replaced = bank.replace_chapter(chapter.clone(), words);
            if replaced {
                tracing::debug!(%chapter, count, "applied chapter override");
            }
            replaced
        }
        Err(err) => {
            tracing::warn!(%chapter, error = %err, "failed to parse chapter override");
            false
        }
    }
}

fn override_chapter(path: &Path) -> Option<ChapterKey> {
    if path.extension()?.to_str()? != OVERRIDE_EXTENSION {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let key = stem.strip_prefix(OVERRIDE_PREFIX)?;
    ChapterKey::new(key).ok()
}

/// Load `data.csv` from a directory and apply every `chapter<key>.csv` found next to it.
///
/// # Errors
///
/// Returns `DataLoadError::Missing` if `data.csv` does not exist, or
/// `Malformed`/`Io` if it cannot be read.
pub fn load_word_bank_dir(dir: &Path) -> Result<WordBank, DataLoadError> {
    let primary = dir.join(PRIMARY_FILE);
    if !primary.is_file() {
        return Err(DataLoadError::Missing { path: primary });
    }
    let mut bank = load_word_bank(File::open(&primary)?)?;

    let mut overrides: Vec<(ChapterKey, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter_map(|path| override_chapter(&path).map(|key| (key, path)))
        .collect();
    overrides.sort();

    for (chapter, path) in overrides {
        match File::open(&path) {
            Ok(file) => {
                apply_chapter_override(&mut bank, chapter, file);
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "cannot open chapter override");
            }
        }
    }

    tracing::info!(
        chapters = bank.chapter_count(),
        dir = %dir.display(),
        "word bank loaded"
    );
    Ok(bank)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIMARY: &str = "\
Chapter,English,Japanese
1,cat,猫
1,dog,犬
2,bird,鳥
2,,魚
,fish,魚
3,apple,
10,river,川
";

    #[test]
    fn primary_rows_missing_fields_are_dropped() {
        let bank = load_word_bank(PRIMARY.as_bytes()).unwrap();

        let keys: Vec<_> = bank.chapters().map(ChapterKey::as_str).collect();
        assert_eq!(keys, vec!["1", "2", "10"]);
        assert_eq!(bank.word_count(&ChapterKey::from_number(1)), 2);
        assert_eq!(bank.word_count(&ChapterKey::from_number(2)), 1);
        assert_eq!(bank.word_count(&ChapterKey::from_number(3)), 0);
    }

    #[test]
    fn override_accepts_idiom_column() {
        let csv = "Idiom,Japanese\nbreak the ice,打ち解ける\nhit the sack,\n";
        let words = read_chapter_override(csv.as_bytes()).unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].english(), "break the ice");
    }

    #[test]
    fn override_replaces_chapter_only_when_non_empty() {
        let mut bank = load_word_bank(PRIMARY.as_bytes()).unwrap();
        let one = ChapterKey::from_number(1);

        assert!(!apply_chapter_override(
            &mut bank,
            one.clone(),
            "English,Japanese\n".as_bytes()
        ));
        assert_eq!(bank.word_count(&one), 2);

        let csv = "English,Japanese\nsun,太陽\nmoon,月\nstar,星\n";
        assert!(apply_chapter_override(&mut bank, one.clone(), csv.as_bytes()));
        let words = bank.chapter(&one).unwrap();
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].english(), "sun");
    }

    #[test]
    fn directory_loader_requires_primary_and_applies_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_word_bank_dir(dir.path()).unwrap_err();
        assert!(matches!(err, DataLoadError::Missing { .. }));

        std::fs::write(dir.path().join(PRIMARY_FILE), PRIMARY).unwrap();
        std::fs::write(
            dir.path().join("chapter2.csv"),
            "English,Japanese\nwind,風\nrain,雨\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let bank = load_word_bank_dir(dir.path()).unwrap();
        let two = bank.chapter(&ChapterKey::from_number(2)).unwrap();
        assert_eq!(two.len(), 2);
        assert_eq!(two[1].japanese(), "雨");
        assert_eq!(bank.word_count(&ChapterKey::from_number(1)), 2);
    }
}
