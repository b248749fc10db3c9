//! Session State
//!
//! One mutable record per conversation. The struct is a plain value type:
//! reads from the store hand out independent clones, and the merge rules for
//! resuming from a possibly stale snapshot are an explicit method rather than
//! incidental defensive copying.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A recorded answer with the moment it was written, so that merging two
/// divergent snapshots can keep the newest write per label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub text: String,
    pub recorded_at: DateTime<Utc>,
}

/// The three observable phases of a session's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing asked yet; the next input is a greeting, not an answer.
    AwaitingFirstInput,
    /// A question is outstanding and the next input answers it.
    QuestionPending,
    /// No eligible question remains; terminal until an explicit reset.
    Completed,
}

/// Per-conversation mutable state.
///
/// Invariants maintained by the mutators here:
/// - `answered` is a subset of `asked`;
/// - the key set of `answers` equals `answered`;
/// - `complete` is monotonic until `reset`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    /// Labels already presented to the user.
    pub asked: BTreeSet<String>,
    /// Labels with a recorded answer.
    pub answered: BTreeSet<String>,
    /// Answer text per label, newest write per label.
    pub answers: BTreeMap<String, AnswerEntry>,
    /// The label most recently asked and not yet answered, if any.
    pub current: Option<String>,
    /// True once no eligible unanswered question remains.
    pub complete: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.complete {
            Phase::Completed
        } else if self.current.is_some() {
            Phase::QuestionPending
        } else {
            Phase::AwaitingFirstInput
        }
    }

    /// Marks a label as presented to the user and makes it the pending one.
    pub fn mark_asked(&mut self, label: &str) {
        self.asked.insert(label.to_string());
        self.current = Some(label.to_string());
    }

    /// Records (or overwrites) the answer for a label. Re-answering the same
    /// pending question updates the stored value; this is the only edit path.
    pub fn record_answer(&mut self, label: &str, text: &str) {
        // Answered implies asked, even when recording for a label that was
        // restored from a snapshot that never saw mark_asked.
        self.asked.insert(label.to_string());
        self.answered.insert(label.to_string());
        self.answers.insert(
            label.to_string(),
            AnswerEntry {
                text: text.to_string(),
                recorded_at: Utc::now(),
            },
        );
        if self.current.as_deref() == Some(label) {
            self.current = None;
        }
    }

    pub fn mark_complete(&mut self) {
        self.complete = true;
        self.current = None;
    }

    /// Merges a (possibly stale) stored snapshot into this in-progress state.
    ///
    /// `asked` and `answered` become unions; `answers` keeps the newest write
    /// per label; `current` from this state wins over the stored value
    /// because it reflects the question the user is actually responding to.
    /// No recorded answer is ever lost, even under a lost-update race.
    pub fn merge_from(&mut self, stored: &SessionState) {
        self.asked.extend(stored.asked.iter().cloned());
        self.answered.extend(stored.answered.iter().cloned());
        for (label, theirs) in &stored.answers {
            match self.answers.get(label) {
                Some(ours) if ours.recorded_at >= theirs.recorded_at => {}
                _ => {
                    self.answers.insert(label.clone(), theirs.clone());
                }
            }
        }
        // Re-establish answered == keys(answers) after the union.
        for label in self.answers.keys() {
            self.answered.insert(label.clone());
            self.asked.insert(label.clone());
        }
        if self.current.is_none() {
            self.current = stored.current.clone();
        }
        self.complete = self.complete || stored.complete;
    }
}
