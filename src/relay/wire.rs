//! Relay wire format: one JSON object per line.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::SessionId;
use crate::error::RelayError;

/// Sent by a participant to the relay server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join { session_id: SessionId },
    Move { session_id: SessionId, column: usize },
}

/// Sent by the relay server to the other participants. Only the column
/// travels; receivers recompute row and outcome themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    MoveMade { column: usize },
}

/// Encode a message as a single newline-terminated line
pub fn encode<T: Serialize>(message: &T) -> Result<String, RelayError> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

pub fn decode<T: DeserializeOwned>(line: &str) -> Result<T, RelayError> {
    Ok(serde_json::from_str(line.trim_end())?)
}
