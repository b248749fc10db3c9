//! Dependency Resolver
//!
//! Pure computation of the eligible question set: everything not yet answered
//! whose dependencies are all satisfied. An empty result is the normal
//! "exhausted" outcome, not an error.

use crate::catalog::{Catalog, QuestionDef};
use std::collections::BTreeSet;

/// Returns the unordered set of questions whose dependencies are satisfied
/// and that have not been answered yet.
pub fn available<'a>(catalog: &'a Catalog, answered: &BTreeSet<String>) -> Vec<&'a QuestionDef> {
    catalog
        .questions()
        .filter(|q| {
            !answered.contains(&q.label) && q.dependencies.iter().all(|d| answered.contains(d))
        })
        .collect()
}

/// Like [`available`], with an optional bound on how many eligible questions
/// are returned, for callers that want to limit lookahead.
pub fn available_capped<'a>(
    catalog: &'a Catalog,
    answered: &BTreeSet<String>,
    cap: Option<usize>,
) -> Vec<&'a QuestionDef> {
    let mut eligible = available(catalog, answered);
    if let Some(cap) = cap {
        eligible.truncate(cap);
    }
    eligible
}
