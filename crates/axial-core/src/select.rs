//! Candidate selection.
//!
//! Narrows the raw input down to the records that still need a model call:
//! eligible (identifier plus a meaningful comment), first occurrence of each
//! identifier, optionally capped, and not already present in the result store.

use std::collections::HashSet;

use crate::record::FeedbackRecord;

/// Outcome of [`select_candidates`].
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a> {
    /// Eligible records after the cap was applied.
    pub eligible: usize,
    /// Eligible records skipped because a result already exists.
    pub already_processed: usize,
    /// Records to submit, in input order.
    pub candidates: Vec<&'a FeedbackRecord>,
}

/// Select the records to classify.
///
/// Repeated identifiers keep only their first eligible record. `limit`
/// truncates the eligible set to its first N records *before* the processed
/// filter.
#[must_use]
pub fn select_candidates<'a>(
    records: &'a [FeedbackRecord],
    processed: &HashSet<String>,
    limit: Option<usize>,
) -> Selection<'a> {
    let mut seen = HashSet::new();
    let mut eligible: Vec<&FeedbackRecord> = records
        .iter()
        .filter(|r| r.is_eligible())
        .filter(|r| r.id().is_some_and(|id| seen.insert(id)))
        .collect();
    if let Some(limit) = limit {
        eligible.truncate(limit);
    }

    let total = eligible.len();
    let candidates: Vec<_> = eligible
        .into_iter()
        .filter(|r| r.id().is_some_and(|id| !processed.contains(id)))
        .collect();

    Selection {
        eligible: total,
        already_processed: total - candidates.len(),
        candidates,
    }
}
