//! Merge planning between local quotes and remote quotes.

use std::collections::{HashMap, HashSet};

use crate::models::{Quote, QuoteId, SyncConflict};

/// Result of reconciling local quotes against a remote snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    /// Candidate store contents: remote quotes first, then local-only quotes
    pub merged: Vec<Quote>,
    /// Shared ids whose local and remote content disagree
    pub conflicts: Vec<SyncConflict>,
}

impl MergePlan {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Reconcile `local` against `remote`.
///
/// Local quotes without a matching remote id are kept unchanged. The first
/// local quote carrying a remote id competes for that remote slot: identical
/// text and category keeps the remote copy, different content becomes a
/// conflict and the candidate holds the remote copy at that position until
/// the conflict is resolved. Later local quotes repeating an already claimed
/// id are appended unchanged unless they match the remote copy.
pub fn plan_merge(local: &[Quote], remote: Vec<Quote>) -> MergePlan {
    let index = remote
        .iter()
        .enumerate()
        .filter_map(|(position, quote)| quote.id.clone().map(|id| (id, position)))
        .collect::<HashMap<QuoteId, usize>>();

    let mut merged = remote;
    let mut conflicts = Vec::new();
    let mut claimed = HashSet::new();

    for quote in local {
        let Some((id, position)) = quote
            .id
            .as_ref()
            .and_then(|id| index.get(id).map(|position| (id, *position)))
        else {
            merged.push(quote.clone());
            continue;
        };

        let server = &merged[position];
        if server.same_content(quote) {
            claimed.insert(id.clone());
            continue;
        }

        if claimed.insert(id.clone()) {
            conflicts.push(SyncConflict {
                id: id.clone(),
                local: quote.clone(),
                server: server.clone(),
            });
        } else {
            tracing::debug!("Keeping extra local copy of {id} alongside the remote slot");
            merged.push(quote.clone());
        }
    }

    MergePlan { merged, conflicts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn server(id: u32, text: &str) -> Quote {
        Quote::from_server(QuoteId::server(id), text, 100)
    }

    #[test]
    fn local_only_quotes_are_appended() {
        let local = vec![Quote::new("Mine", "Life").unwrap()];
        let remote = vec![server(1, "Remote")];

        let plan = plan_merge(&local, remote.clone());
        assert!(plan.is_clean());
        assert_eq!(plan.merged, vec![remote[0].clone(), local[0].clone()]);
    }

    #[test]
    fn identical_content_is_reconciled_once() {
        let local = vec![server(1, "Same").touched(5)];
        let remote = vec![server(1, "Same")];

        let plan = plan_merge(&local, remote);
        assert!(plan.is_clean());
        assert_eq!(plan.merged.len(), 1);
        assert_eq!(plan.merged[0].last_updated, Some(100));
    }

    #[test]
    fn differing_content_becomes_conflict() {
        let local_copy = Quote {
            text: "Edited locally".to_string(),
            ..server(1, "Original")
        };
        let remote = vec![server(1, "Original"), server(2, "Other")];

        let plan = plan_merge(std::slice::from_ref(&local_copy), remote);
        assert_eq!(plan.conflicts.len(), 1);
        assert_eq!(plan.conflicts[0].id, QuoteId::server(1));
        assert_eq!(plan.conflicts[0].local, local_copy);
        assert_eq!(plan.conflicts[0].server.text, "Original");
        assert_eq!(plan.merged.len(), 2);
    }

    #[test]
    fn category_difference_also_conflicts() {
        let local_copy = Quote {
            category: "Moved".to_string(),
            ..server(3, "Text")
        };
        let plan = plan_merge(&[local_copy], vec![server(3, "Text")]);
        assert_eq!(plan.conflicts.len(), 1);
    }

    #[test]
    fn unmatched_server_ids_are_local_only() {
        let stale = server(9, "No longer on remote");
        let plan = plan_merge(std::slice::from_ref(&stale), vec![server(1, "Fresh")]);
        assert!(plan.is_clean());
        assert_eq!(plan.merged.last(), Some(&stale));
    }

    #[test]
    fn repeated_local_id_keeps_every_copy() {
        let first = Quote {
            text: "Local A".to_string(),
            ..server(1, "Remote")
        };
        let second = Quote {
            text: "Local B".to_string(),
            ..server(1, "Remote")
        };
        let echo = server(1, "Remote").touched(7);

        let plan = plan_merge(
            &[first.clone(), second.clone(), echo],
            vec![server(1, "Remote")],
        );

        assert_eq!(plan.conflicts.len(), 1);
        assert_eq!(plan.conflicts[0].local, first);
        assert_eq!(plan.merged, vec![server(1, "Remote"), second]);
    }

    #[test]
    fn matching_first_copy_still_claims_the_slot() {
        let edited = Quote {
            text: "Edited".to_string(),
            ..server(2, "Remote")
        };

        let plan = plan_merge(
            &[server(2, "Remote"), edited.clone()],
            vec![server(2, "Remote")],
        );

        assert!(plan.is_clean());
        assert_eq!(plan.merged, vec![server(2, "Remote"), edited]);
    }
}
