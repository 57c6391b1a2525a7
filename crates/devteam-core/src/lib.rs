//! devteam core — session state, configuration, and shared chat types.
//!
//! - **session**: bounded, expiring conversation state and its registry
//! - **config**: JSON config file + env var overrides
//! - **types**: chat messages and LLM wire types
//! - **error**: snapshot persistence errors

pub mod config;
pub mod error;
pub mod session;
pub mod types;
pub mod utils;

pub use error::SnapshotError;
pub use session::{HistoryMessage, Session, SessionManager, SessionOptions};
