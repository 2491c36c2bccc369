//! Profile Store boundary — the only place that knows where candidate,
//! employer, and posting records actually live.
//!
//! Records cross this boundary as raw `serde_json::Value` documents on
//! purpose: the upstream profile data is loosely typed and inconsistently
//! keyed, and the matching engine owns the field-coalescing rules. The store
//! never writes; the matching engine is strictly a reader of profile data.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

/// Read-only access to profile records and their binary attachments.
///
/// Injected into `MatchEngine` as `Arc<dyn ProfileStore>` so tests can
/// substitute an in-memory double.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetches one candidate's raw profile document, or `None` if unknown.
    async fn fetch_candidate(&self, candidate_id: Uuid) -> Result<Option<Value>>;

    /// Lists all employer ids in their stable enumeration order.
    async fn list_employers(&self) -> Result<Vec<String>>;

    /// Lists one employer's raw posting documents in their stable order.
    async fn list_postings(&self, employer_id: &str) -> Result<Vec<Value>>;

    /// Fetches a binary attachment (resume document, profile screenshot).
    async fn fetch_blob(&self, key: &str) -> Result<Bytes>;
}

/// Production store: profile documents in Postgres `jsonb` columns,
/// attachments in S3 (or a MinIO-compatible endpoint).
pub struct PgProfileStore {
    pool: PgPool,
    s3: aws_sdk_s3::Client,
    bucket: String,
}

impl PgProfileStore {
    pub fn new(pool: PgPool, s3: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { pool, s3, bucket }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn fetch_candidate(&self, candidate_id: Uuid) -> Result<Option<Value>> {
        let row: Option<(Value,)> =
            sqlx::query_as("SELECT profile FROM candidates WHERE id = $1")
                .bind(candidate_id)
                .fetch_optional(&self.pool)
                .await
                .context("failed to read candidate profile")?;

        Ok(row.map(|(profile,)| profile))
    }

    async fn list_employers(&self) -> Result<Vec<String>> {
        // created_at order is the enumeration order the ranker's tie-break
        // ultimately rests on; it must be stable across runs.
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT id FROM employers ORDER BY created_at, id")
                .fetch_all(&self.pool)
                .await
                .context("failed to list employers")?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn list_postings(&self, employer_id: &str) -> Result<Vec<Value>> {
        let rows: Vec<(Value,)> = sqlx::query_as(
            "SELECT doc FROM postings WHERE employer_id = $1 ORDER BY position, created_at",
        )
        .bind(employer_id)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("failed to list postings for employer {employer_id}"))?;

        Ok(rows.into_iter().map(|(doc,)| doc).collect())
    }

    async fn fetch_blob(&self, key: &str) -> Result<Bytes> {
        let object = self
            .s3
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("failed to fetch blob {key}"))?;

        let data = object
            .body
            .collect()
            .await
            .with_context(|| format!("failed to read blob body for {key}"))?;

        Ok(data.into_bytes())
    }
}
