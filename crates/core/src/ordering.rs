//! Ordering Policy
//!
//! The single authority for "what comes next": a stable total order over any
//! candidate set. Sort key, ascending: position of the category in the
//! catalog's flow order (unknown categories last), then priority (unset
//! last), then the sequence number parsed from the label suffix (non-numeric
//! last). Callers never invent their own ordering.

use crate::catalog::{Catalog, QuestionDef};

/// Sorts candidates into presentation order. Stable on ties.
pub fn order<'a>(catalog: &Catalog, mut candidates: Vec<&'a QuestionDef>) -> Vec<&'a QuestionDef> {
    candidates.sort_by_key(|q| sort_key(catalog, q));
    candidates
}

fn sort_key(catalog: &Catalog, q: &QuestionDef) -> (usize, u32, u32) {
    (
        catalog.flow_position(&q.category),
        q.priority.unwrap_or(u32::MAX),
        q.sequence.unwrap_or(u32::MAX),
    )
}
