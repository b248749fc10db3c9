//! Consultation Sequencing Core
//!
//! This crate implements the structured question-sequencing engine behind the
//! consultation service: an immutable question catalog with categories,
//! priorities, and inter-question dependencies; a deterministic selector for
//! the next question; per-session resumable state; and the export path that
//! turns recorded answers into records for the persistence sink.

pub mod catalog;
pub mod chat;
pub mod error;
pub mod export;
pub mod flow;
pub mod ordering;
pub mod resolver;
pub mod session;
pub mod store;

pub use catalog::{Catalog, QuestionDef};
pub use error::{CatalogError, SaveStatus};
pub use export::{AnswerRecord, ExportFilter};
pub use flow::{FlowController, Turn};
pub use session::{Phase, SessionState};
pub use store::SessionStore;
