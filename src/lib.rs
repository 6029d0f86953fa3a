//! # Connect Four
//!
//! A two-player Connect Four engine: local hot-seat play, play against a
//! minimax opponent, and remote play relayed through session-keyed rooms.
//!
//! ## Modules
//!
//! - [`game`]: Board, player, and game state with derived outcome
//! - [`ai`]: Window heuristic, alpha-beta search, computer agents
//! - [`session`]: Turn order, controllers, observers, remote move handling
//! - [`relay`]: Session membership hub, TCP relay server and client
//! - [`ui`]: Terminal UI for playing a session
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod relay;
pub mod session;
pub mod ui;
