//! Answer Export
//!
//! Turns a session's recorded answers into [`AnswerRecord`]s for the
//! persistence sink. Records are keyed by the literal question text; labels
//! never cross this boundary. Entries that fail validation (text too short
//! to be a real question, blank answers, placeholder answers) are counted
//! and skipped, never an error.

use crate::catalog::Catalog;
use crate::session::SessionState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// One exportable question/answer pair. Built at the hand-off point from
/// session state; downstream consumers only ever see question text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_text: String,
    pub answer_text: String,
}

/// Validation knobs for the export filter.
#[derive(Debug, Clone)]
pub struct ExportFilter {
    /// A resolved question text shorter than this is treated as a label that
    /// leaked through, not a real question.
    pub min_question_len: usize,
    /// Lowercased placeholder fragments; an answer containing any of them is
    /// not worth persisting.
    pub placeholders: Vec<String>,
}

impl Default for ExportFilter {
    fn default() -> Self {
        Self {
            min_question_len: 20,
            placeholders: [
                "placeholder",
                "n/a",
                "not applicable",
                "none",
                "null",
                "undefined",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl ExportFilter {
    fn is_placeholder(&self, answer: &str) -> bool {
        let lowered = answer.trim().to_lowercase();
        self.placeholders.iter().any(|p| lowered.contains(p.as_str()))
    }
}

/// Builds the exportable records for a session.
///
/// Duplicate question text (two differently labeled catalog entries sharing
/// text) resolves last-write-wins by recording time.
pub fn exportable(
    state: &SessionState,
    catalog: &Catalog,
    filter: &ExportFilter,
) -> Vec<AnswerRecord> {
    // Oldest first so that later writes overwrite earlier ones per text key.
    let mut entries: Vec<(&String, &crate::session::AnswerEntry)> =
        state.answers.iter().collect();
    entries.sort_by_key(|(_, e)| e.recorded_at);

    let mut by_text: BTreeMap<String, String> = BTreeMap::new();
    let mut skipped = 0usize;
    for (label, entry) in entries {
        let Some(def) = catalog.get(label) else {
            skipped += 1;
            continue;
        };
        let question = def.text.trim();
        let answer = entry.text.trim();
        if question.len() < filter.min_question_len
            || answer.is_empty()
            || filter.is_placeholder(answer)
        {
            skipped += 1;
            continue;
        }
        by_text.insert(question.to_string(), answer.to_string());
    }

    if skipped > 0 {
        debug!(skipped, exported = by_text.len(), "export filter skipped entries");
    }

    by_text
        .into_iter()
        .map(|(question_text, answer_text)| AnswerRecord {
            question_text,
            answer_text,
        })
        .collect()
}
