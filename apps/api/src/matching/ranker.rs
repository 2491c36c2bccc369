//! Ranker — orders the aggregated matches for presentation.
//!
//! Stable sort, score descending: equal scores keep the relative order the
//! posting collector produced, so identical inputs always rank identically.
//! No content-based dedup — composite keys already make every posting a
//! distinct identity, and two employers advertising the same role are two
//! legitimate matches.

use crate::matching::MatchResult;

pub fn rank(mut results: Vec<MatchResult>) -> Vec<MatchResult> {
    results.sort_by(|a, b| b.match_percentage.cmp(&a.match_percentage));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::postings::CompositeJobKey;

    fn result(employer: &str, posting: &str, score: u8) -> MatchResult {
        MatchResult {
            job_key: CompositeJobKey {
                employer_id: employer.to_string(),
                posting_id: posting.to_string(),
            },
            role: "Engineer".to_string(),
            company: employer.to_string(),
            logo_ref: None,
            match_percentage: score,
        }
    }

    #[test]
    fn test_sorts_descending_by_score() {
        let ranked = rank(vec![
            result("a", "1", 40),
            result("b", "1", 90),
            result("c", "1", 65),
        ]);
        let scores: Vec<u8> = ranked.iter().map(|r| r.match_percentage).collect();
        assert_eq!(scores, vec![90, 65, 40]);
    }

    #[test]
    fn test_ties_keep_collection_order() {
        let ranked = rank(vec![
            result("a", "1", 70),
            result("b", "1", 70),
            result("c", "1", 70),
        ]);
        let employers: Vec<&str> = ranked.iter().map(|r| r.job_key.employer_id.as_str()).collect();
        assert_eq!(employers, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_mixed_ties_are_stable() {
        let ranked = rank(vec![
            result("a", "1", 50),
            result("b", "1", 80),
            result("c", "1", 50),
            result("d", "1", 80),
        ]);
        let keys: Vec<String> = ranked.iter().map(|r| r.job_key.to_string()).collect();
        assert_eq!(keys, vec!["b:1", "d:1", "a:1", "c:1"]);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(rank(vec![]).is_empty());
    }

    #[test]
    fn test_duplicate_content_across_employers_is_not_deduplicated() {
        let ranked = rank(vec![result("a", "1", 60), result("b", "1", 60)]);
        assert_eq!(ranked.len(), 2);
    }
}
