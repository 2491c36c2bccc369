//! Posting Collector — flattens every employer's postings into one pool.
//!
//! One employer's read failure never aborts collection: that employer is
//! logged and omitted, the rest of the pool survives. An empty pool is a
//! valid outcome, not an error.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::matching::fields::{coalesce_id, coalesce_str};
use crate::store::ProfileStore;

pub const PLACEHOLDER_ROLE: &str = "Unknown role";
pub const PLACEHOLDER_COMPANY: &str = "Unknown company";

const POSTING_ID_KEYS: &[&str] = &["posting_id", "postingId", "job_id", "jobId", "id"];
const ROLE_KEYS: &[&str] = &["role", "title", "job_title", "jobTitle", "position"];
const COMPANY_KEYS: &[&str] = &["company", "company_name", "companyName", "employer", "organization"];
const DESCRIPTION_KEYS: &[&str] = &["description", "job_description", "jobDescription", "details", "summary"];
const LOGO_KEYS: &[&str] = &["logo_ref", "logoRef", "logo", "logo_url", "logoUrl", "company_logo"];

/// Externally visible identity of a match. Combining the employer id with the
/// raw posting id keeps postings from different employers distinct even when
/// their raw ids collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeJobKey {
    pub employer_id: String,
    pub posting_id: String,
}

impl std::fmt::Display for CompositeJobKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.employer_id, self.posting_id)
    }
}

impl Serialize for CompositeJobKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One employer's open role, coalesced into canonical fields.
#[derive(Debug, Clone)]
pub struct JobPosting {
    pub key: CompositeJobKey,
    pub role: String,
    pub company: String,
    pub description: String,
    pub logo_ref: Option<String>,
}

/// Enumerates the full posting pool across all employers.
///
/// Order is employer-enumeration order, then posting order within each
/// employer — the stable basis for the ranker's tie-break.
pub async fn collect_postings(store: &dyn ProfileStore) -> anyhow::Result<Vec<JobPosting>> {
    let employers = store.list_employers().await?;
    let mut pool = Vec::new();

    for employer_id in employers {
        let docs = match store.list_postings(&employer_id).await {
            Ok(docs) => docs,
            Err(err) => {
                warn!("skipping postings for employer {employer_id}: {err:#}");
                continue;
            }
        };

        for doc in docs {
            match coalesce_posting(&employer_id, &doc) {
                Some(posting) => pool.push(posting),
                None => {
                    warn!("skipping posting without a usable id for employer {employer_id}");
                }
            }
        }
    }

    Ok(pool)
}

/// Maps one raw posting document onto a `JobPosting`. Display fields default
/// to placeholders; only a missing posting id disqualifies the document,
/// since without it there is no composite key.
fn coalesce_posting(employer_id: &str, doc: &Value) -> Option<JobPosting> {
    let posting_id = coalesce_id(doc, POSTING_ID_KEYS)?;

    Some(JobPosting {
        key: CompositeJobKey {
            employer_id: employer_id.to_string(),
            posting_id,
        },
        role: coalesce_str(doc, ROLE_KEYS).unwrap_or_else(|| PLACEHOLDER_ROLE.to_string()),
        company: coalesce_str(doc, COMPANY_KEYS).unwrap_or_else(|| PLACEHOLDER_COMPANY.to_string()),
        description: coalesce_str(doc, DESCRIPTION_KEYS).unwrap_or_default(),
        logo_ref: coalesce_str(doc, LOGO_KEYS),
    })
}
