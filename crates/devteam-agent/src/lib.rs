//! DevTeam Agent — personas, prompts, and the session-aware team agent.
//!
//! This crate contains:
//! - **persona**: The fixed team members (frontend, backend, scrum master)
//! - **context**: System prompt and message list construction
//! - **session_key**: Session ids derived from conversation content
//! - **agent**: `TeamAgent`, one persona answering through a shared session store

pub mod agent;
pub mod context;
pub mod persona;
pub mod session_key;

pub use agent::{SharedSessions, TeamAgent};
pub use context::ContextBuilder;
pub use persona::{find_persona, Persona, PERSONAS};
pub use session_key::derive_session_id;
