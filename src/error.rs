use std::path::PathBuf;

use crate::game::Player;

/// Errors raised by the board when a piece cannot be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("column {column} is outside the board")]
    InvalidColumn { column: usize },

    #[error("column {column} is full")]
    ColumnFull { column: usize },
}

/// Errors raised when building a board from text rows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardParseError {
    #[error("expected {expected_rows} rows of {expected_cols} cells")]
    WrongShape {
        expected_rows: usize,
        expected_cols: usize,
    },

    #[error("unknown cell symbol {0:?}")]
    UnknownSymbol(char),

    #[error("piece at row {row}, column {col} is floating above an empty cell")]
    Floating { row: usize, col: usize },
}

/// Errors raised by a game session when a move is submitted.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Move(#[from] MoveError),

    #[error("game is over, start a new one")]
    GameOver,

    #[error("not your turn ({expected} to move)")]
    NotYourTurn { expected: Player },

    #[error("remote move {column} does not fit the local game: {reason}")]
    Desync { column: usize, reason: String },

    #[error("relay error: {0}")]
    Relay(#[from] RelayError),
}

/// Errors raised by the move relay and its transports.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed relay message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("relay connection closed")]
    Disconnected,

    #[error("session id must not be empty")]
    EmptySessionId,
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_error_display() {
        assert_eq!(
            MoveError::ColumnFull { column: 2 }.to_string(),
            "column 2 is full"
        );
        assert_eq!(
            MoveError::InvalidColumn { column: 9 }.to_string(),
            "column 9 is outside the board"
        );
    }

    #[test]
    fn test_session_error_wraps_move_error() {
        let err: SessionError = MoveError::ColumnFull { column: 0 }.into();
        assert!(matches!(err, SessionError::Move(MoveError::ColumnFull { column: 0 })));
        assert_eq!(err.to_string(), "column 0 is full");
    }

    #[test]
    fn test_desync_error_display() {
        let err = SessionError::Desync {
            column: 4,
            reason: "column 4 is full".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "remote move 4 does not fit the local game: column 4 is full"
        );
    }

    #[test]
    fn test_not_your_turn_display() {
        let err = SessionError::NotYourTurn {
            expected: Player::Yellow,
        };
        assert_eq!(err.to_string(), "not your turn (Yellow to move)");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("search.difficulty must be in 1..=10".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: search.difficulty must be in 1..=10"
        );
    }
}
