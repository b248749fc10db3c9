//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds all shared,
//! clonable resources: the immutable catalog, the session store, the flow
//! controller, the persistence sink, and the optional free-chat client.

use crate::config::Config;
use crate::db::AnswerSink;
use consult_core::chat::ChatClient;
use consult_core::{Catalog, ExportFilter, FlowController, SessionStore};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all
/// handlers. All fields are public to be accessible from other modules.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub store: Arc<SessionStore>,
    pub controller: FlowController,
    pub export_filter: ExportFilter,
    pub sink: Arc<dyn AnswerSink>,
    /// `None` when no API key is configured; post-completion chat then
    /// falls back to a canned acknowledgement.
    pub chat: Option<Arc<dyn ChatClient>>,
    pub config: Arc<Config>,
}
