//! Session ids derived from conversation content.
//!
//! Used when a caller hands a conversation to an agent without naming a
//! session. Ids are a 64-bit prefix of a SHA-256 digest, stable across builds
//! so they stay valid as snapshot keys. Two different conversations can still
//! collide; callers that need isolation should pass explicit ids.

use sha2::{Digest, Sha256};

use devteam_core::types::ChatMessage;

/// Derive a session id for `conversation`.
///
/// Keyed on the first user message (`user_<hex>`) so follow-up turns of the
/// same conversation land in the same session; falls back to hashing the
/// whole conversation (`session_<hex>`) when there is no user message.
pub fn derive_session_id(conversation: &[ChatMessage]) -> String {
    match conversation.iter().find(|m| m.is_user()) {
        Some(first_user) => {
            let mut hasher = Sha256::new();
            hasher.update(first_user.content.as_bytes());
            format!("user_{}", hex_prefix(hasher))
        }
        None => {
            let mut hasher = Sha256::new();
            for msg in conversation {
                hasher.update(msg.role.as_bytes());
                hasher.update([0u8]);
                hasher.update(msg.content.as_bytes());
                hasher.update([0u8]);
            }
            format!("session_{}", hex_prefix(hasher))
        }
    }
}

/// First 16 hex digits of the digest.
fn hex_prefix(hasher: Sha256) -> String {
    format!("{:x}", hasher.finalize())[..16].to_string()
}
