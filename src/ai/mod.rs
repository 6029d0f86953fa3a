//! Computer opponents: the window heuristic, the alpha-beta search built on
//! it, and the agents that drive a game with them.

mod agent;
pub mod evaluator;
mod minimax;
mod random;
pub mod search;

pub use agent::Agent;
pub use evaluator::{Heuristic, WindowHeuristic};
pub use minimax::{depth_for_difficulty, MinimaxAgent, MAX_SEARCH_DEPTH};
pub use random::RandomAgent;
pub use search::{choose_move, SearchEngine, SearchResult};
