use sqlx::Row;
use vocab_core::model::{ChapterKey, ProgressKey, ProgressRecord, QuizMode, User, WordStatus};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn chapter_from_str(raw: &str) -> Result<ChapterKey, StorageError> {
    ChapterKey::new(raw).map_err(ser)
}

pub(crate) fn parse_mode(raw: &str) -> Result<QuizMode, StorageError> {
    raw.parse().map_err(ser)
}

pub(crate) fn parse_status(raw: &str) -> Result<WordStatus, StorageError> {
    raw.parse().map_err(ser)
}

pub(crate) fn map_user_row(row: &sqlx::sqlite::SqliteRow) -> Result<User, StorageError> {
    let name: String = row.try_get("name").map_err(ser)?;
    let registered_at = row.try_get("registered_at").map_err(ser)?;
    User::new(name, registered_at).map_err(ser)
}

pub(crate) fn map_progress_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<(ProgressKey, ProgressRecord), StorageError> {
    let chapter = chapter_from_str(&row.try_get::<String, _>("chapter").map_err(ser)?)?;
    let mode = parse_mode(&row.try_get::<String, _>("mode").map_err(ser)?)?;
    let record = ProgressRecord {
        correct: u32_from_i64("correct", row.try_get("correct").map_err(ser)?)?,
        total: u32_from_i64("total", row.try_get("total").map_err(ser)?)?,
        percentage: u32_from_i64("percentage", row.try_get("percentage").map_err(ser)?)?,
        last_played: row.try_get("last_played").map_err(ser)?,
    };
    Ok((ProgressKey::new(chapter, mode), record))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_helpers_reject_unknown_codes() {
        assert!(matches!(parse_status("meh"), Err(StorageError::Serialization(_))));
        assert!(matches!(parse_mode("typing"), Err(StorageError::Serialization(_))));
        assert!(matches!(chapter_from_str(" "), Err(StorageError::Serialization(_))));
        assert_eq!(parse_mode("4choice").unwrap(), QuizMode::Choice);
        assert_eq!(parse_status("passed").unwrap(), WordStatus::Passed);
    }

    #[test]
    fn u32_conversion_rejects_negatives() {
        assert!(u32_from_i64("total", -1).is_err());
        assert_eq!(u32_from_i64("total", 30).unwrap(), 30);
    }
}
