//! Flow Controller
//!
//! The state machine driving one session: records the answer to the pending
//! question (if any), asks the resolver and ordering policy for the next
//! question, and detects completion. Selection depends only on the catalog
//! and the answered set, never on wall-clock time or randomness, so a
//! repeated call over identical state picks the identical question.

use crate::catalog::{Catalog, QuestionDef};
use crate::ordering;
use crate::resolver;
use crate::session::{Phase, SessionState};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// The result of one controller invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// The text of the next question, or `None` when the flow is done.
    pub question: Option<String>,
    /// True once no eligible unanswered question remains.
    pub done: bool,
    /// The label whose answer was recorded this turn. Internal; callers use
    /// it to decide whether an export is due, never to expose it.
    pub answered: Option<String>,
}

/// Drives the question sequence for a single session.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowController {
    cap: Option<usize>,
}

impl FlowController {
    pub fn new() -> Self {
        Self::default()
    }

    /// A controller that bounds the eligible set considered per selection.
    pub fn with_cap(cap: Option<usize>) -> Self {
        Self { cap }
    }

    /// Processes one user input against the session and returns the next
    /// question or a completion signal. Never fails: a session in the
    /// `Completed` phase simply yields `done` with no question, leaving the
    /// input for the caller's free-chat collaborator.
    pub fn handle(&self, catalog: &Catalog, state: &mut SessionState, input: &str) -> Turn {
        let answered = match state.phase() {
            // The first input is a greeting, not an answer.
            Phase::AwaitingFirstInput => None,
            Phase::QuestionPending => {
                if let Some(label) = state.current.clone() {
                    state.record_answer(&label, input);
                    debug!(label = %label, "recorded answer");
                    Some(label)
                } else {
                    None
                }
            }
            Phase::Completed => {
                return Turn {
                    question: None,
                    done: true,
                    answered: None,
                };
            }
        };

        match self.select_next(catalog, state) {
            Some(def) => {
                state.mark_asked(&def.label);
                debug!(label = %def.label, "selected next question");
                Turn {
                    question: Some(def.text.clone()),
                    done: false,
                    answered,
                }
            }
            None => {
                state.mark_complete();
                debug!("no eligible question remains; session complete");
                Turn {
                    question: None,
                    done: true,
                    answered,
                }
            }
        }
    }

    fn select_next<'a>(&self, catalog: &'a Catalog, state: &SessionState) -> Option<&'a QuestionDef> {
        let candidates = resolver::available_capped(catalog, &state.answered, self.cap);
        let ordered = ordering::order(catalog, candidates);
        pick(ordered, &state.answered)
    }
}

/// Takes the first ordered candidate, discarding any label that is somehow
/// already answered. The resolver excludes answered labels by construction;
/// this backstop guards against a catalog or selection bug and re-runs the
/// pick on the remaining candidates instead of re-asking.
fn pick<'a>(ordered: Vec<&'a QuestionDef>, answered: &BTreeSet<String>) -> Option<&'a QuestionDef> {
    for candidate in ordered {
        if answered.contains(&candidate.label) {
            warn!(
                label = %candidate.label,
                "selector proposed an already-answered label; discarding and re-selecting"
            );
            continue;
        }
        return Some(candidate);
    }
    None
}
