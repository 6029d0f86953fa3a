use crate::game::GameState;

/// Anything that can pick a column for the side to move.
pub trait Agent: Send {
    /// Select a column for `state.current_player()`. Returns `None` only when
    /// the state has no legal move.
    fn select_action(&mut self, state: &GameState) -> Option<usize>;

    /// Return the agent's display name.
    fn name(&self) -> &str;
}
