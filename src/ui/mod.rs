//! Terminal UI: a board view driven by a game session.

mod app;
mod game_view;

pub use app::App;
