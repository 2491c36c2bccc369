//! Evidence Normalizer — reconciles one candidate's scattered signals into a
//! single canonical record.
//!
//! The three sources (resume document, profile screenshot, identity fields)
//! are each optional and each independently failable. Extraction failures
//! degrade that one signal to an empty string; normalization only fails when
//! there is nothing left to match against at all.

use serde_json::Value;
use tracing::warn;

use crate::extract::{DocumentReader, ImageReader};
use crate::matching::fields::coalesce_str;
use crate::matching::MatchError;
use crate::store::ProfileStore;

const NAME_KEYS: &[&str] = &["name", "full_name", "fullName", "candidate_name", "display_name"];
const EMAIL_KEYS: &[&str] = &["email", "email_address", "emailAddress", "contact_email"];
const PHONE_KEYS: &[&str] = &["phone", "phone_number", "phoneNumber", "mobile", "contact_phone"];
const RESUME_REF_KEYS: &[&str] = &["resume_ref", "resumeRef", "resume_key", "resume_path", "cv_ref"];
const PROFILE_IMAGE_REF_KEYS: &[&str] = &[
    "network_profile_ref",
    "networkProfileRef",
    "profile_image_ref",
    "profile_screenshot",
    "linkedin_screenshot",
];

/// Display-only identity fields. Never required individually, but a
/// non-empty name alone is enough evidence to attempt a match.
#[derive(Debug, Clone, Default)]
pub struct Identity {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// The normalized view of one candidate, immutable for the matching run.
#[derive(Debug, Clone)]
pub struct CandidateEvidence {
    pub identity: Identity,
    pub resume_text: String,
    pub network_profile_text: String,
}

impl CandidateEvidence {
    /// True when the record carries no signal a scorer could work with.
    pub fn is_empty(&self) -> bool {
        self.resume_text.is_empty()
            && self.network_profile_text.is_empty()
            && self.identity.name.is_empty()
    }
}

/// Builds `CandidateEvidence` from a raw profile document plus best-effort
/// extraction of its binary attachments.
///
/// Fails only with `MatchError::NoEvidence` when, after both attempts, no
/// usable signal remains.
pub async fn normalize_evidence(
    store: &dyn ProfileStore,
    documents: &dyn DocumentReader,
    images: &dyn ImageReader,
    raw: &Value,
) -> Result<CandidateEvidence, MatchError> {
    let identity = Identity {
        name: coalesce_str(raw, NAME_KEYS).unwrap_or_default(),
        email: coalesce_str(raw, EMAIL_KEYS),
        phone: coalesce_str(raw, PHONE_KEYS),
    };

    // The two extractions are independent: they run concurrently, one
    // failing must not block the other, and neither failing may abort
    // normalization.
    let resume_fut = async {
        match coalesce_str(raw, RESUME_REF_KEYS) {
            Some(key) => extract_resume(store, documents, &key).await,
            None => String::new(),
        }
    };
    let profile_fut = async {
        match coalesce_str(raw, PROFILE_IMAGE_REF_KEYS) {
            Some(key) => extract_profile_image(store, images, &key).await,
            None => String::new(),
        }
    };
    let (resume_text, network_profile_text) = tokio::join!(resume_fut, profile_fut);

    let evidence = CandidateEvidence {
        identity,
        resume_text,
        network_profile_text,
    };

    if evidence.is_empty() {
        return Err(MatchError::NoEvidence);
    }

    Ok(evidence)
}

async fn extract_resume(
    store: &dyn ProfileStore,
    documents: &dyn DocumentReader,
    key: &str,
) -> String {
    let blob = match store.fetch_blob(key).await {
        Ok(blob) => blob,
        Err(err) => {
            warn!("resume blob {key} unavailable, continuing without it: {err:#}");
            return String::new();
        }
    };

    match documents.extract_text(&blob).await {
        Ok(text) => text.trim().to_string(),
        Err(err) => {
            warn!("resume extraction failed for {key}, continuing without it: {err:#}");
            String::new()
        }
    }
}

async fn extract_profile_image(
    store: &dyn ProfileStore,
    images: &dyn ImageReader,
    key: &str,
) -> String {
    let blob = match store.fetch_blob(key).await {
        Ok(blob) => blob,
        Err(err) => {
            warn!("profile image {key} unavailable, continuing without it: {err:#}");
            return String::new();
        }
    };

    match images.extract_text(&blob).await {
        Ok(text) => text.trim().to_string(),
        Err(err) => {
            warn!("profile image extraction failed for {key}, continuing without it: {err:#}");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use bytes::Bytes;
    use serde_json::json;
    use uuid::Uuid;

    struct BlobStore {
        blobs: Vec<(String, Bytes)>,
    }

    #[async_trait]
    impl ProfileStore for BlobStore {
        async fn fetch_candidate(&self, _candidate_id: Uuid) -> anyhow::Result<Option<Value>> {
            Ok(None)
        }

        async fn list_employers(&self) -> anyhow::Result<Vec<String>> {
            Ok(vec![])
        }

        async fn list_postings(&self, _employer_id: &str) -> anyhow::Result<Vec<Value>> {
            Ok(vec![])
        }

        async fn fetch_blob(&self, key: &str) -> anyhow::Result<Bytes> {
            self.blobs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, b)| b.clone())
                .ok_or_else(|| anyhow!("blob {key} not found"))
        }
    }

    struct FixedReader(anyhow::Result<String>);

    #[async_trait]
    impl DocumentReader for FixedReader {
        async fn extract_text(&self, _document: &[u8]) -> anyhow::Result<String> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(err) => Err(anyhow!("{err}")),
            }
        }
    }

    #[async_trait]
    impl ImageReader for FixedReader {
        async fn extract_text(&self, _image: &[u8]) -> anyhow::Result<String> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(err) => Err(anyhow!("{err}")),
            }
        }
    }

    fn store_with(keys: &[&str]) -> BlobStore {
        BlobStore {
            blobs: keys
                .iter()
                .map(|k| (k.to_string(), Bytes::from_static(b"bytes")))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_all_sources_present() {
        let store = store_with(&["resumes/a.pdf", "shots/a.png"]);
        let raw = json!({
            "full_name": "Ada Lovelace",
            "contact_email": "ada@example.com",
            "resume_ref": "resumes/a.pdf",
            "linkedin_screenshot": "shots/a.png"
        });

        let evidence = normalize_evidence(
            &store,
            &FixedReader(Ok("5 years Python, ML".to_string())),
            &FixedReader(Ok("Senior ML Engineer at Example".to_string())),
            &raw,
        )
        .await
        .unwrap();

        assert_eq!(evidence.identity.name, "Ada Lovelace");
        assert_eq!(evidence.identity.email.as_deref(), Some("ada@example.com"));
        assert_eq!(evidence.resume_text, "5 years Python, ML");
        assert_eq!(evidence.network_profile_text, "Senior ML Engineer at Example");
    }

    #[tokio::test]
    async fn test_name_only_with_both_extractions_failing_still_succeeds() {
        let store = store_with(&["resumes/a.pdf", "shots/a.png"]);
        let raw = json!({
            "name": "Ada Lovelace",
            "resume_ref": "resumes/a.pdf",
            "network_profile_ref": "shots/a.png"
        });

        let evidence = normalize_evidence(
            &store,
            &FixedReader(Err(anyhow!("corrupt pdf"))),
            &FixedReader(Err(anyhow!("vision service down"))),
            &raw,
        )
        .await
        .unwrap();

        assert_eq!(evidence.identity.name, "Ada Lovelace");
        assert!(evidence.resume_text.is_empty());
        assert!(evidence.network_profile_text.is_empty());
    }

    #[tokio::test]
    async fn test_no_signal_at_all_is_fatal() {
        let store = store_with(&[]);
        let raw = json!({"unrelated": "field"});

        let err = normalize_evidence(
            &store,
            &FixedReader(Ok("unused".to_string())),
            &FixedReader(Ok("unused".to_string())),
            &raw,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, MatchError::NoEvidence));
    }

    #[tokio::test]
    async fn test_one_extraction_failing_does_not_block_the_other() {
        let store = store_with(&["resumes/a.pdf", "shots/a.png"]);
        let raw = json!({
            "resume_ref": "resumes/a.pdf",
            "profile_screenshot": "shots/a.png"
        });

        let evidence = normalize_evidence(
            &store,
            &FixedReader(Err(anyhow!("corrupt pdf"))),
            &FixedReader(Ok("Engineer at Example".to_string())),
            &raw,
        )
        .await
        .unwrap();

        assert!(evidence.resume_text.is_empty());
        assert_eq!(evidence.network_profile_text, "Engineer at Example");
    }

    #[tokio::test]
    async fn test_missing_blob_degrades_to_empty_not_error() {
        let store = store_with(&[]);
        let raw = json!({
            "name": "Ada",
            "resume_ref": "resumes/gone.pdf"
        });

        let evidence = normalize_evidence(
            &store,
            &FixedReader(Ok("never reached".to_string())),
            &FixedReader(Ok("never reached".to_string())),
            &raw,
        )
        .await
        .unwrap();

        assert!(evidence.resume_text.is_empty());
    }

    struct SlowReader {
        delay: std::time::Duration,
        text: String,
    }

    #[async_trait]
    impl DocumentReader for SlowReader {
        async fn extract_text(&self, _document: &[u8]) -> anyhow::Result<String> {
            tokio::time::sleep(self.delay).await;
            Ok(self.text.clone())
        }
    }

    #[async_trait]
    impl ImageReader for SlowReader {
        async fn extract_text(&self, _image: &[u8]) -> anyhow::Result<String> {
            tokio::time::sleep(self.delay).await;
            Ok(self.text.clone())
        }
    }

    #[tokio::test]
    async fn test_extraction_pair_runs_concurrently() {
        let delay = std::time::Duration::from_millis(100);
        let store = store_with(&["resumes/a.pdf", "shots/a.png"]);
        let raw = json!({
            "resume_ref": "resumes/a.pdf",
            "network_profile_ref": "shots/a.png"
        });

        let started = std::time::Instant::now();
        let evidence = normalize_evidence(
            &store,
            &SlowReader {
                delay,
                text: "5 years Python, ML".to_string(),
            },
            &SlowReader {
                delay,
                text: "Engineer at Example".to_string(),
            },
            &raw,
        )
        .await
        .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(evidence.resume_text, "5 years Python, ML");
        assert_eq!(evidence.network_profile_text, "Engineer at Example");
        // Two 100ms extractions run as a pair, not back to back.
        assert!(
            elapsed < delay * 2,
            "extraction pair took {elapsed:?}, expected close to one delay"
        );
    }

    #[test]
    fn test_is_empty_requires_all_three_signals_absent() {
        let mut evidence = CandidateEvidence {
            identity: Identity::default(),
            resume_text: String::new(),
            network_profile_text: String::new(),
        };
        assert!(evidence.is_empty());

        evidence.identity.name = "Ada".to_string();
        assert!(!evidence.is_empty());
    }
}
