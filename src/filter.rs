use crate::types::{CurationGroup, FilterOutcome, HarvestResult};
use tracing::debug;

/// Returns the ids of corpus items whose text contains at least one of
/// the group's keywords, in corpus traversal order.
///
/// Pure function of its inputs: no side effects, deterministic, safe to
/// run any number of times against the same corpus. Matching is plain
/// substring containment; both the corpus text and the group keywords
/// are lowercase by construction, which is what makes it
/// case-insensitive.
pub fn matching_ids(corpus: &[HarvestResult], group: &CurationGroup) -> Vec<String> {
    corpus
        .iter()
        .filter(|result| {
            group
                .keywords
                .iter()
                .any(|keyword| result.text.contains(keyword.as_str()))
        })
        .map(|result| result.id.clone())
        .collect()
}

/// Evaluates every curation group against one corpus.
///
/// The corpus is traversed once per group and never refetched; outcomes
/// come back in group input order.
pub fn apply_groups(corpus: &[HarvestResult], groups: &[CurationGroup]) -> Vec<FilterOutcome> {
    groups
        .iter()
        .map(|group| {
            let matched = matching_ids(corpus, group);
            debug!(
                "group '{}' matched {} of {} items",
                group.name,
                matched.len(),
                corpus.len()
            );
            FilterOutcome {
                name: group.name.clone(),
                matched,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, text: &str) -> HarvestResult {
        HarvestResult {
            id: id.to_string(),
            text: text.to_string(),
            title: String::new(),
            brand: String::new(),
        }
    }

    fn corpus() -> Vec<HarvestResult> {
        vec![
            result("A", "red sequin gown"),
            result("B", "plain cotton dress"),
            result("C", "beaded silk blouse"),
        ]
    }

    #[test]
    fn test_any_keyword_matches() {
        let group = CurationGroup::new("Party", ["sequin", "beaded"]).unwrap();
        let matched = matching_ids(&corpus(), &group);

        assert_eq!(matched, vec!["A", "C"]);
    }

    #[test]
    fn test_no_keyword_matches() {
        let group = CurationGroup::new("Winter", ["wool", "fleece"]).unwrap();

        assert!(matching_ids(&corpus(), &group).is_empty());
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let group = CurationGroup::new("Party", ["Sequin"]).unwrap();
        let matched = matching_ids(&corpus(), &group);

        assert_eq!(matched, vec!["A"]);
    }

    #[test]
    fn test_filter_is_deterministic_and_idempotent() {
        let corpus = corpus();
        let group = CurationGroup::new("Party", ["sequin", "beaded"]).unwrap();

        let first = matching_ids(&corpus, &group);
        let second = matching_ids(&corpus, &group);

        assert_eq!(first, second);
    }

    #[test]
    fn test_many_groups_share_one_corpus() {
        let corpus = corpus();
        let groups = vec![
            CurationGroup::new("Party", ["sequin", "beaded"]).unwrap(),
            CurationGroup::new("Basics", ["cotton"]).unwrap(),
        ];

        let outcomes = apply_groups(&corpus, &groups);

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].name, "Party");
        assert_eq!(outcomes[0].matched, vec!["A", "C"]);
        assert_eq!(outcomes[1].name, "Basics");
        assert_eq!(outcomes[1].matched, vec!["B"]);
    }

    #[test]
    fn test_empty_corpus_yields_empty_outcomes() {
        let group = CurationGroup::new("Party", ["sequin"]).unwrap();

        assert!(matching_ids(&[], &group).is_empty());
    }
}
