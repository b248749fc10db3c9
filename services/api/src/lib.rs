//! Consultation API Library Crate
//!
//! This library contains all the logic for the consultation web service:
//! configuration, the answer persistence sink, API handlers, shared state,
//! and routing. The `bin/api.rs` binary is a thin wrapper around this
//! library.

pub mod config;
pub mod db;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
