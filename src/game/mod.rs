//! Core Connect Four game logic: board representation, player types, and game
//! state with derived outcome.

mod board;
mod player;
mod state;

pub use board::{Board, Cell, COLS, ROWS, WINNING_LENGTH};
pub use player::Player;
pub use state::{GameState, MoveRecord, Outcome};
