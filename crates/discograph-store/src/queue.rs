// SPDX-License-Identifier: GPL-3.0-or-later
//! The durable job queue (§4.4). `Claim` is the one place in this crate that
//! must be a single atomic statement — two workers racing a claim-then-update
//! would both see the same row as free.

use anyhow::Result;
use chrono::{DateTime, Utc};
use discograph_domain::{Job, JobId, JobMetadata, JobType, DEFAULT_MAX_ATTEMPTS};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::{debug, warn};

/// Per-status row counts, for the admin `GET /api/jobs/stats` endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobQueueStats {
    pub pending: i64,
    pub processing: i64,
    pub completed: i64,
    pub failed: i64,
}

#[async_trait::async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, priority: i32, metadata: JobMetadata) -> Result<JobId>;
    async fn claim(&self, job_types: &[JobType]) -> Result<Option<Job>>;
    async fn complete(&self, id: JobId) -> Result<()>;
    async fn fail(&self, id: JobId, err_msg: &str) -> Result<()>;
    async fn reset_stuck(&self) -> Result<u64>;
    async fn gc(&self) -> Result<u64>;

    /// Row counts by status, for the admin UI's dashboard.
    async fn stats(&self) -> Result<JobQueueStats>;

    /// The `limit` most recently created jobs, newest first, for the admin
    /// UI's activity feed.
    async fn recent(&self, limit: i64) -> Result<Vec<Job>>;

    /// Deletes every `completed` or `failed` row regardless of age, for the
    /// admin UI's "clear history" action (unlike `gc`, which only reaps
    /// `completed` rows past a retention window).
    async fn clear_completed(&self) -> Result<u64>;
}

#[derive(Clone)]
pub struct PgJobQueue {
    pool: PgPool,
}

impl PgJobQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_job(row: &sqlx::postgres::PgRow) -> Result<Job> {
    let job_type: String = row.try_get("job_type")?;
    let entity_type: String = row.try_get("entity_type")?;
    let status: String = row.try_get("status")?;
    let metadata: Json<JobMetadata> = row.try_get("metadata")?;
    Ok(Job {
        id: JobId::from_uuid(row.try_get("id")?),
        job_type: job_type.parse()?,
        entity_type: entity_type.parse()?,
        entity_id: row.try_get("entity_id")?,
        priority: row.try_get("priority")?,
        status: status.parse()?,
        attempts: row.try_get("attempts")?,
        max_attempts: row.try_get("max_attempts")?,
        metadata: metadata.0,
        error_message: row.try_get("error_message")?,
        created_at: row.try_get("created_at")?,
        started_at: row.try_get::<Option<DateTime<Utc>>, _>("started_at")?,
        completed_at: row.try_get("completed_at")?,
    })
}

#[async_trait::async_trait]
impl JobQueue for PgJobQueue {
    async fn enqueue(&self, priority: i32, metadata: JobMetadata) -> Result<JobId> {
        let job_type = metadata.job_type();
        let entity_type = metadata.entity_type();
        let entity_id = metadata.entity_id();
        let id = uuid::Uuid::new_v4();

        debug!(target: "queue", %job_type, %entity_id, priority, "enqueuing job");

        let row = sqlx::query(
            r#"
            INSERT INTO jobs (id, job_type, entity_type, entity_id, priority, status, max_attempts, metadata)
            VALUES ($1, $2, $3, $4, $5, 'pending', $6, $7)
            ON CONFLICT (job_type, entity_id) DO UPDATE SET
                priority = GREATEST(jobs.priority, EXCLUDED.priority),
                status = CASE WHEN jobs.status = 'failed' THEN 'pending' ELSE jobs.status END
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(job_type.as_str())
        .bind(entity_type.as_str())
        .bind(entity_id)
        .bind(priority)
        .bind(DEFAULT_MAX_ATTEMPTS)
        .bind(Json(&metadata))
        .fetch_one(&self.pool)
        .await?;

        Ok(JobId::from_uuid(row.try_get("id")?))
    }

    async fn claim(&self, job_types: &[JobType]) -> Result<Option<Job>> {
        let type_strs: Vec<&str> = job_types.iter().map(|t| t.as_str()).collect();

        let row = sqlx::query(
            r#"
            UPDATE jobs SET
                status = 'processing',
                started_at = now(),
                attempts = attempts + 1
            WHERE id = (
                SELECT id FROM jobs
                WHERE status = 'pending' AND job_type = ANY($1)
                ORDER BY priority DESC, created_at ASC
                FOR UPDATE SKIP LOCKED
                LIMIT 1
            )
            RETURNING *
            "#,
        )
        .bind(&type_strs[..])
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_job).transpose()
    }

    async fn complete(&self, id: JobId) -> Result<()> {
        sqlx::query("UPDATE jobs SET status = 'completed', completed_at = now() WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn fail(&self, id: JobId, err_msg: &str) -> Result<()> {
        warn!(target: "queue", job_id = %id, error = err_msg, "job attempt failed");
        sqlx::query(
            r#"
            UPDATE jobs SET
                status = CASE WHEN attempts >= max_attempts THEN 'failed' ELSE 'pending' END,
                error_message = $2
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(err_msg)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn reset_stuck(&self) -> Result<u64> {
        let processing = sqlx::query("UPDATE jobs SET status = 'pending' WHERE status = 'processing'")
            .execute(&self.pool)
            .await?
            .rows_affected();

        let retryable_failed = sqlx::query(
            "UPDATE jobs SET status = 'pending' WHERE status = 'failed' AND attempts < max_attempts",
        )
        .execute(&self.pool)
        .await?
        .rows_affected();

        let total = processing + retryable_failed;
        if total > 0 {
            debug!(target: "queue", recovered = total, "reset stuck jobs on startup");
        }
        Ok(total)
    }

    async fn gc(&self) -> Result<u64> {
        let deleted = sqlx::query(
            "DELETE FROM jobs WHERE status = 'completed' AND completed_at < now() - INTERVAL '7 days'",
        )
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(deleted)
    }

    async fn stats(&self) -> Result<JobQueueStats> {
        let rows = sqlx::query("SELECT status, count(*) AS count FROM jobs GROUP BY status")
            .fetch_all(&self.pool)
            .await?;

        let mut stats = JobQueueStats::default();
        for row in &rows {
            let status: String = row.try_get("status")?;
            let count: i64 = row.try_get("count")?;
            match status.as_str() {
                "pending" => stats.pending = count,
                "processing" => stats.processing = count,
                "completed" => stats.completed = count,
                "failed" => stats.failed = count,
                _ => {}
            }
        }
        Ok(stats)
    }

    async fn recent(&self, limit: i64) -> Result<Vec<Job>> {
        let rows = sqlx::query("SELECT * FROM jobs ORDER BY created_at DESC LIMIT $1")
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_job).collect()
    }

    async fn clear_completed(&self) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM jobs WHERE status IN ('completed', 'failed')")
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted)
    }
}
