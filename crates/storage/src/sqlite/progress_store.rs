use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use vocab_core::model::{
    ChapterKey, ChapterMastery, MasteryLedger, QuizMode, ScoreSummary, User, WordOutcome,
};

use super::SqliteProgressStore;
use super::mapping::{
    chapter_from_str, conn, map_progress_row, map_user_row, parse_status, ser,
};
use crate::repository::{ProgressBook, ProgressStore, StorageError};

fn mastery_from_rows(
    rows: &[sqlx::sqlite::SqliteRow],
) -> Result<ChapterMastery, StorageError> {
    let mut mastery = ChapterMastery::new();
    for row in rows {
        let english: String = row.try_get("english").map_err(ser)?;
        let status = parse_status(&row.try_get::<String, _>("status").map_err(ser)?)?;
        mastery.record(english, status);
    }
    Ok(mastery)
}

#[async_trait]
impl ProgressStore for SqliteProgressStore {
    async fn load_user(&self) -> Result<Option<User>, StorageError> {
        let row = sqlx::query("SELECT name, registered_at FROM users WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_user_row).transpose()
    }

    async fn save_user(&self, user: &User) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO users (id, name, registered_at)
            VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                registered_at = excluded.registered_at
            ",
        )
        .bind(user.name())
        .bind(user.registered_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn load_progress(&self) -> Result<ProgressBook, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT chapter, mode, correct, total, percentage, last_played
            FROM chapter_progress
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut book = ProgressBook::new();
        for row in &rows {
            let (key, record) = map_progress_row(row)?;
            book.insert(key, record);
        }
        Ok(book)
    }

    async fn load_mastery(&self) -> Result<MasteryLedger, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT chapter, english, status
            FROM word_mastery
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut ledger = MasteryLedger::new();
        for row in &rows {
            let chapter = chapter_from_str(&row.try_get::<String, _>("chapter").map_err(ser)?)?;
            let english: String = row.try_get("english").map_err(ser)?;
            let status = parse_status(&row.try_get::<String, _>("status").map_err(ser)?)?;
            ledger.merge(&chapter, &[WordOutcome::new(english, status)]);
        }
        Ok(ledger)
    }

    async fn load_chapter_mastery(
        &self,
        chapter: &ChapterKey,
    ) -> Result<ChapterMastery, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT english, status
            FROM word_mastery
            WHERE chapter = ?1
            ",
        )
        .bind(chapter.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        mastery_from_rows(&rows)
    }

    async fn save_progress(
        &self,
        chapter: &ChapterKey,
        mode: QuizMode,
        summary: &ScoreSummary,
        played_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
            INSERT INTO chapter_progress (chapter, mode, correct, total, percentage, last_played)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(chapter, mode) DO UPDATE SET
                correct = excluded.correct,
                total = excluded.total,
                percentage = excluded.percentage,
                last_played = excluded.last_played
            ",
        )
        .bind(chapter.as_str())
        .bind(mode.as_str())
        .bind(i64::from(summary.correct()))
        .bind(i64::from(summary.total()))
        .bind(i64::from(summary.percentage()))
        .bind(played_at)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        if mode.tracks_mastery() {
            for outcome in summary.outcomes() {
                // correct is sticky; everything else is last-write-wins
                sqlx::query(
                    r"
                    INSERT INTO word_mastery (chapter, english, status)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(chapter, english) DO UPDATE SET
                        status = CASE
                            WHEN word_mastery.status = 'correct' THEN 'correct'
                            ELSE excluded.status
                        END
                    ",
                )
                .bind(chapter.as_str())
                .bind(outcome.word.as_str())
                .bind(outcome.status.as_str())
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
            }
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn clear_mastery_for_chapter(&self, chapter: &ChapterKey) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM word_mastery WHERE chapter = ?1")
            .bind(chapter.as_str())
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        for statement in [
            "DELETE FROM word_mastery",
            "DELETE FROM chapter_progress",
            "DELETE FROM users",
        ] {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
        }
        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
