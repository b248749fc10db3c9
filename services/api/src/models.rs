//! API Models
//!
//! Request and response payloads for the consultation endpoints, doubling as
//! the schemas for the generated OpenAPI documentation. Question labels are
//! an engine-internal detail and never appear in any of these types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema, Debug, Clone)]
pub struct ChatRequest {
    #[schema(example = "I have had a persistent cough for two weeks")]
    pub message: String,
    /// Omit to start a new session; the server assigns an id.
    pub session_id: Option<String>,
    /// Stable key under which exported answers are persisted. Without it,
    /// answers live only in the session.
    #[schema(example = "patient-42")]
    pub username: Option<String>,
}

/// Flow progress attached to every chat response.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct FlowMeta {
    pub answered_count: usize,
    pub total_questions: usize,
    /// One of `saved`, `failed`, `no_user_key`, `nothing_to_save`.
    #[schema(example = "saved")]
    pub save_status: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct ChatResponse {
    /// The next question, a completion message, or a free-chat reply.
    pub response: String,
    pub session_id: String,
    /// True once no eligible unanswered question remains.
    pub done: bool,
    pub flow: FlowMeta,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub asked_count: usize,
    pub answered_count: usize,
    /// Text of the question currently awaiting an answer, if any.
    pub current_question: Option<String>,
    pub done: bool,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct ResetResponse {
    pub session_id: String,
    pub reset: bool,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub message: String,
}
