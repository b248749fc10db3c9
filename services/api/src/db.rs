//! Answer Persistence Sink
//!
//! This module contains the persistence boundary for exported answers. The
//! `AnswerSink` trait keeps handlers testable without a database; the
//! Postgres implementation upserts per (user key, question text) so that a
//! retried save is idempotent and a returning user's rows are merged rather
//! than replaced.

use anyhow::Result;
use async_trait::async_trait;
use consult_core::AnswerRecord;
use sqlx::PgPool;
use tracing::debug;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerSink: Send + Sync {
    /// Persists the exported records under a stable user key.
    async fn save(&self, user_key: &str, session_id: &str, records: &[AnswerRecord])
    -> Result<()>;
}

/// The production sink, a thin wrapper around the `PgPool`.
#[derive(Clone)]
pub struct PostgresAnswerSink {
    pool: PgPool,
}

impl PostgresAnswerSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs all pending `sqlx` migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl AnswerSink for PostgresAnswerSink {
    async fn save(
        &self,
        user_key: &str,
        session_id: &str,
        records: &[AnswerRecord],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO consultation_answers (user_key, session_id, question_text, answer_text)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (user_key, question_text)
                DO UPDATE SET
                    answer_text = EXCLUDED.answer_text,
                    session_id = EXCLUDED.session_id,
                    updated_at = NOW()
                "#,
            )
            .bind(user_key)
            .bind(session_id)
            .bind(&record.question_text)
            .bind(&record.answer_text)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(
            user_key = %user_key,
            session_id = %session_id,
            count = records.len(),
            "persisted exported answers"
        );
        Ok(())
    }
}
