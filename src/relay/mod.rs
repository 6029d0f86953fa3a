//! Move relay: pairs remote participants under an opaque session id and
//! forwards each column one of them plays to the others.
//!
//! - [`Relay`] is the in-process hub that owns session membership.
//! - [`RelayServer`] exposes a hub over TCP with newline-delimited JSON.
//! - [`RelayClient`] and [`RelayEndpoint`] are the two [`MoveChannel`]s a
//!   game session can play through.
//!
//! Delivery is fire-and-forget: no acknowledgement, no retry, and the game
//! session never assumes moves arrive in order or exactly once.

mod client;
mod hub;
mod server;
pub mod wire;

use std::fmt;
use std::time::Duration;

use crate::error::RelayError;

pub use client::RelayClient;
pub use hub::{ParticipantId, Relay, RelayEndpoint};
pub use server::RelayServer;

/// Opaque token naming a remote game. Shared between players out-of-band.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Random UUID v4 in its hyphenated form
    pub fn generate() -> Self {
        SessionId(uuid::Uuid::new_v4().to_string())
    }

    /// Accept any non-empty token, trimmed
    pub fn parse(raw: &str) -> Result<Self, RelayError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RelayError::EmptySessionId);
        }
        Ok(SessionId(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A participant's end of a relayed session, as seen by the game session.
pub trait MoveChannel: Send {
    fn session_id(&self) -> &SessionId;

    /// Send a column to every other participant of the session.
    fn publish_move(&mut self, column: usize) -> Result<(), RelayError>;

    /// Next column received from another participant, if one is waiting.
    fn try_recv_move(&mut self) -> Result<Option<usize>, RelayError>;

    /// Wait up to `timeout` for the next column.
    fn recv_move_timeout(&mut self, timeout: Duration) -> Result<Option<usize>, RelayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_have_uuid_layout() {
        let id = SessionId::generate();
        let parts: Vec<&str> = id.as_str().split('-').collect();
        let lengths: Vec<usize> = parts.iter().map(|p| p.len()).collect();
        assert_eq!(lengths, vec![8, 4, 4, 4, 12]);
        assert!(parts[2].starts_with('4'), "version nibble in {id}");
        let parsed = uuid::Uuid::parse_str(id.as_str()).unwrap();
        assert_eq!(parsed.get_version(), Some(uuid::Version::Random));
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[test]
    fn parse_trims_and_rejects_empty() {
        assert_eq!(SessionId::parse("  abc \n").unwrap().as_str(), "abc");
        assert!(matches!(SessionId::parse("   "), Err(RelayError::EmptySessionId)));
    }
}
