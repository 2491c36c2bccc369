//! Prompt Builder — composes the scoring request for one candidate/posting
//! pair.
//!
//! Absent inputs are stated explicitly instead of silently omitted: the
//! oracle is asked for a best-effort score from partial evidence, and it can
//! only do that honestly if it knows which evidence is missing.

use crate::matching::evidence::CandidateEvidence;
use crate::matching::postings::JobPosting;

/// System prompt for all scoring calls. JSON-only, single numeric field.
pub const SCORE_SYSTEM: &str = "You are a precise recruiting assistant that rates \
    how well a candidate matches a job posting. \
    You MUST respond with a single JSON object and nothing else: \
    {\"match_percentage\": <integer between 0 and 100>}. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    If some candidate evidence is marked unavailable, still produce your best \
    estimate from whatever evidence remains.";

const NO_RESUME: &str = "No resume available.";
const NO_NETWORK_PROFILE: &str = "No professional-network profile available.";
const NO_IDENTITY: &str = "No identity details available.";

/// Deterministic, pure composition of one scoring prompt.
pub fn build_score_prompt(evidence: &CandidateEvidence, posting: &JobPosting) -> String {
    let mut prompt = String::new();

    prompt.push_str("CANDIDATE EVIDENCE\n\n");

    prompt.push_str("Identity:\n");
    if evidence.identity.name.is_empty()
        && evidence.identity.email.is_none()
        && evidence.identity.phone.is_none()
    {
        prompt.push_str(NO_IDENTITY);
        prompt.push('\n');
    } else {
        if !evidence.identity.name.is_empty() {
            prompt.push_str(&format!("Name: {}\n", evidence.identity.name));
        }
        if let Some(email) = &evidence.identity.email {
            prompt.push_str(&format!("Email: {email}\n"));
        }
        if let Some(phone) = &evidence.identity.phone {
            prompt.push_str(&format!("Phone: {phone}\n"));
        }
    }

    prompt.push_str("\nResume:\n");
    if evidence.resume_text.is_empty() {
        prompt.push_str(NO_RESUME);
    } else {
        prompt.push_str(&evidence.resume_text);
    }
    prompt.push('\n');

    prompt.push_str("\nProfessional-network profile:\n");
    if evidence.network_profile_text.is_empty() {
        prompt.push_str(NO_NETWORK_PROFILE);
    } else {
        prompt.push_str(&evidence.network_profile_text);
    }
    prompt.push('\n');

    prompt.push_str("\nJOB POSTING\n\n");
    prompt.push_str(&format!("Role: {}\n", posting.role));
    prompt.push_str(&format!("Company: {}\n", posting.company));
    prompt.push_str("Description:\n");
    prompt.push_str(&posting.description);
    prompt.push('\n');

    prompt.push_str(
        "\nRate how well this candidate matches this posting. \
         Respond with exactly one JSON object: \
         {\"match_percentage\": <integer between 0 and 100>}.",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::evidence::Identity;
    use crate::matching::postings::CompositeJobKey;

    fn posting() -> JobPosting {
        JobPosting {
            key: CompositeJobKey {
                employer_id: "acme".to_string(),
                posting_id: "p1".to_string(),
            },
            role: "ML Engineer".to_string(),
            company: "Acme Corp".to_string(),
            description: "Requires Python and ML experience.".to_string(),
            logo_ref: None,
        }
    }

    fn full_evidence() -> CandidateEvidence {
        CandidateEvidence {
            identity: Identity {
                name: "Ada Lovelace".to_string(),
                email: Some("ada@example.com".to_string()),
                phone: None,
            },
            resume_text: "5 years Python, ML".to_string(),
            network_profile_text: "Senior ML Engineer at Example".to_string(),
        }
    }

    #[test]
    fn test_prompt_includes_all_available_evidence_and_description() {
        let prompt = build_score_prompt(&full_evidence(), &posting());
        assert!(prompt.contains("Ada Lovelace"));
        assert!(prompt.contains("5 years Python, ML"));
        assert!(prompt.contains("Senior ML Engineer at Example"));
        assert!(prompt.contains("Requires Python and ML experience."));
        assert!(prompt.contains("ML Engineer"));
    }

    #[test]
    fn test_absent_inputs_are_stated_not_omitted() {
        let evidence = CandidateEvidence {
            identity: Identity {
                name: "Ada Lovelace".to_string(),
                email: None,
                phone: None,
            },
            resume_text: String::new(),
            network_profile_text: String::new(),
        };
        let prompt = build_score_prompt(&evidence, &posting());
        assert!(prompt.contains(NO_RESUME));
        assert!(prompt.contains(NO_NETWORK_PROFILE));
    }

    #[test]
    fn test_missing_identity_is_stated() {
        let evidence = CandidateEvidence {
            identity: Identity::default(),
            resume_text: "Python".to_string(),
            network_profile_text: String::new(),
        };
        let prompt = build_score_prompt(&evidence, &posting());
        assert!(prompt.contains(NO_IDENTITY));
    }

    #[test]
    fn test_prompt_instructs_single_json_object() {
        let prompt = build_score_prompt(&full_evidence(), &posting());
        assert!(prompt.contains("match_percentage"));
        assert!(prompt.contains("integer between 0 and 100"));
        assert!(SCORE_SYSTEM.contains("match_percentage"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_score_prompt(&full_evidence(), &posting());
        let b = build_score_prompt(&full_evidence(), &posting());
        assert_eq!(a, b);
    }
}
