//! Candidate-to-job matching engine.
//!
//! One invocation normalizes the candidate's evidence, collects the full
//! posting pool, fans one scoring pipeline out per posting, and ranks the
//! survivors. Per-posting failures are skips, never batch failures: the only
//! error a caller ever sees is a candidate with no evidence at all (or an
//! unknown candidate id).

pub mod evidence;
mod fields;
pub mod parser;
pub mod postings;
pub mod prompts;
mod ranker;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::extract::{DocumentReader, ImageReader};
use crate::store::ProfileStore;
use evidence::{normalize_evidence, CandidateEvidence};
use parser::{parse_match_percentage, ParseError};
use postings::{collect_postings, CompositeJobKey, JobPosting};

/// The generative scoring oracle. Implemented by `LlmClient` in production
/// and by scripted doubles in tests.
#[async_trait]
pub trait ScoringOracle: Send + Sync {
    /// Sends one scoring prompt and returns the raw, untrusted response text.
    async fn score(&self, prompt: &str) -> anyhow::Result<String>;
}

/// The only errors that escape a matching run.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("candidate has no resume, profile, or name to match against")]
    NoEvidence,

    #[error("candidate {0} not found")]
    CandidateNotFound(Uuid),

    #[error("profile store error: {0}")]
    Store(#[from] anyhow::Error),
}

/// One ranked match.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub job_key: CompositeJobKey,
    pub role: String,
    pub company: String,
    pub logo_ref: Option<String>,
    pub match_percentage: u8,
}

/// The final output of one matching run. `pool_size` lets the caller tell
/// "nothing qualified" apart from "no postings exist": an empty result list
/// over a non-empty pool means the pipelines all skipped.
#[derive(Debug, Serialize)]
pub struct MatchBatch {
    pub results: Vec<MatchResult>,
    pub pool_size: usize,
    pub generated_at: DateTime<Utc>,
}

impl MatchBatch {
    fn empty(pool_size: usize) -> Self {
        Self {
            results: Vec::new(),
            pool_size,
            generated_at: Utc::now(),
        }
    }
}

/// Why one posting's pipeline was excluded from the batch. Logged, never
/// surfaced to the caller.
#[derive(Debug)]
enum SkipReason {
    Timeout,
    Oracle(String),
    Parse(ParseError),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Timeout => write!(f, "scoring call timed out"),
            SkipReason::Oracle(msg) => write!(f, "oracle error: {msg}"),
            SkipReason::Parse(err) => write!(f, "unusable oracle response: {err}"),
        }
    }
}

/// The matching engine. All four collaborators are injected so the whole
/// engine runs against test doubles.
pub struct MatchEngine {
    store: Arc<dyn ProfileStore>,
    documents: Arc<dyn DocumentReader>,
    images: Arc<dyn ImageReader>,
    oracle: Arc<dyn ScoringOracle>,
    score_timeout: Duration,
}

impl MatchEngine {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        documents: Arc<dyn DocumentReader>,
        images: Arc<dyn ImageReader>,
        oracle: Arc<dyn ScoringOracle>,
        score_timeout: Duration,
    ) -> Self {
        Self {
            store,
            documents,
            images,
            oracle,
            score_timeout,
        }
    }

    /// Runs one full matching pass for a candidate and returns the ranked
    /// batch. See `MatchError` for the only failure modes that propagate.
    pub async fn match_candidate(&self, candidate_id: Uuid) -> Result<MatchBatch, MatchError> {
        let raw = self
            .store
            .fetch_candidate(candidate_id)
            .await?
            .ok_or(MatchError::CandidateNotFound(candidate_id))?;

        let evidence = normalize_evidence(
            self.store.as_ref(),
            self.documents.as_ref(),
            self.images.as_ref(),
            &raw,
        )
        .await?;

        let pool = collect_postings(self.store.as_ref()).await?;
        let pool_size = pool.len();

        if pool.is_empty() {
            info!("candidate {candidate_id}: posting pool is empty, nothing to score");
            return Ok(MatchBatch::empty(0));
        }

        let results = self.score_pool(Arc::new(evidence), pool).await;

        info!(
            "candidate {candidate_id}: {} of {pool_size} postings scored",
            results.len()
        );

        Ok(MatchBatch {
            results: ranker::rank(results),
            pool_size,
            generated_at: Utc::now(),
        })
    }

    /// Fans one scoring pipeline out per posting and waits for all of them
    /// to settle. Completion order is unspecified; results are restored to
    /// pool order before ranking so the tie-break stays deterministic.
    async fn score_pool(
        &self,
        evidence: Arc<CandidateEvidence>,
        pool: Vec<JobPosting>,
    ) -> Vec<MatchResult> {
        let mut tasks = JoinSet::new();

        for (index, posting) in pool.into_iter().enumerate() {
            let oracle = Arc::clone(&self.oracle);
            let evidence = Arc::clone(&evidence);
            let deadline = self.score_timeout;

            tasks.spawn(async move {
                let outcome = score_posting(oracle, &evidence, &posting, deadline).await;
                (index, posting.key, outcome)
            });
        }

        let mut scored: Vec<(usize, MatchResult)> = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, _key, Ok(result))) => scored.push((index, result)),
                Ok((_index, key, Err(reason))) => {
                    warn!("skipping posting {key}: {reason}");
                }
                Err(err) => {
                    warn!("skipping posting: scoring task failed: {err}");
                }
            }
        }

        scored.sort_by_key(|(index, _)| *index);
        scored.into_iter().map(|(_, result)| result).collect()
    }
}

/// One posting's pipeline: prompt → scoring call (with deadline) → parse.
async fn score_posting(
    oracle: Arc<dyn ScoringOracle>,
    evidence: &CandidateEvidence,
    posting: &JobPosting,
    deadline: Duration,
) -> Result<MatchResult, SkipReason> {
    let prompt = prompts::build_score_prompt(evidence, posting);

    let raw = match tokio::time::timeout(deadline, oracle.score(&prompt)).await {
        Err(_) => return Err(SkipReason::Timeout),
        Ok(Err(err)) => return Err(SkipReason::Oracle(format!("{err:#}"))),
        Ok(Ok(raw)) => raw,
    };

    let match_percentage = parse_match_percentage(&raw).map_err(SkipReason::Parse)?;

    Ok(MatchResult {
        job_key: posting.key.clone(),
        role: posting.role.clone(),
        company: posting.company.clone(),
        logo_ref: posting.logo_ref.clone(),
        match_percentage,
    })
}
