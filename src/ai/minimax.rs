use crate::config::SearchConfig;
use crate::game::GameState;

use super::agent::Agent;
use super::search::SearchEngine;

/// Deepest search the difficulty setting can ask for. Branching factor 7
/// makes anything past this noticeably slow.
pub const MAX_SEARCH_DEPTH: u32 = 6;

/// Map a difficulty setting to a search depth
pub fn depth_for_difficulty(difficulty: u32, max_depth: u32) -> u32 {
    difficulty.min(max_depth)
}

/// Computer opponent backed by the alpha-beta search.
pub struct MinimaxAgent {
    depth: u32,
    engine: SearchEngine,
}

impl MinimaxAgent {
    pub fn new(difficulty: u32) -> Self {
        Self::with_depth(depth_for_difficulty(difficulty, MAX_SEARCH_DEPTH))
    }

    pub fn with_depth(depth: u32) -> Self {
        MinimaxAgent {
            depth,
            engine: SearchEngine::new(),
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        let cap = config.max_depth.min(MAX_SEARCH_DEPTH);
        Self::with_depth(depth_for_difficulty(config.difficulty, cap))
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }
}

impl Agent for MinimaxAgent {
    fn select_action(&mut self, state: &GameState) -> Option<usize> {
        let legal = state.legal_actions();
        let first = *legal.first()?;

        let result = self
            .engine
            .choose_move(state.board(), state.current_player(), self.depth);
        Some(result.column.filter(|col| legal.contains(col)).unwrap_or(first))
    }

    fn name(&self) -> &str {
        "Minimax"
    }
}
