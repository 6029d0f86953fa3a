use super::{Board, Player};
use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    InProgress,
    Won(Player),
    Draw,
}

/// A piece that was placed: who, and where it landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveRecord {
    pub player: Player,
    pub row: usize,
    pub column: usize,
}

/// Board, side to move and the outcome derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    current_player: Player,
    outcome: Outcome,
    last_move: Option<MoveRecord>,
}

impl GameState {
    /// Create initial game state
    pub fn initial() -> Self {
        Self::with_first_player(Player::Red)
    }

    /// Empty board with the given side to move first
    pub fn with_first_player(first: Player) -> Self {
        GameState {
            board: Board::new(),
            current_player: first,
            outcome: Outcome::InProgress,
            last_move: None,
        }
    }

    /// Wrap a position that was not produced move by move. The outcome is
    /// derived with a full-board scan.
    pub fn from_board(board: Board, to_move: Player) -> Self {
        let outcome = match board.winner() {
            Some(player) => Outcome::Won(player),
            None if board.is_full() => Outcome::Draw,
            None => Outcome::InProgress,
        };
        GameState {
            board,
            current_player: to_move,
            outcome,
            last_move: None,
        }
    }

    /// Get current player
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Get reference to board
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// The last piece placed, for highlighting
    pub fn last_move(&self) -> Option<MoveRecord> {
        self.last_move
    }

    /// Check if game is over
    pub fn is_terminal(&self) -> bool {
        self.outcome != Outcome::InProgress
    }

    /// Get list of legal columns (not full)
    pub fn legal_actions(&self) -> Vec<usize> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.board.available_columns()
    }

    /// Apply a move and return new state (immutable)
    pub fn apply_move(&self, column: usize) -> Result<GameState, SessionError> {
        let mut next = *self;
        next.apply_move_mut(column)?;
        Ok(next)
    }

    /// Apply a move in place. Rejected moves leave the state untouched.
    ///
    /// A winning or board-filling move ends the game and keeps the mover as
    /// `current_player`; otherwise the turn passes to the other side.
    pub fn apply_move_mut(&mut self, column: usize) -> Result<MoveRecord, SessionError> {
        if self.is_terminal() {
            return Err(SessionError::GameOver);
        }

        let player = self.current_player;
        let row = self.board.drop(column, player)?;
        let record = MoveRecord { player, row, column };
        self.last_move = Some(record);

        if self.board.winning_line(row, column, player) {
            self.outcome = Outcome::Won(player);
        } else if self.board.is_full() {
            self.outcome = Outcome::Draw;
        } else {
            self.current_player = player.other();
        }

        Ok(record)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::super::Cell;
    use super::*;
    use crate::error::MoveError;

    #[test]
    fn test_initial_state() {
        let state = GameState::initial();
        assert_eq!(state.current_player(), Player::Red);
        assert!(!state.is_terminal());
        assert_eq!(state.outcome(), Outcome::InProgress);
        assert_eq!(state.legal_actions().len(), 7);
        assert_eq!(state.last_move(), None);
    }

    #[test]
    fn test_apply_move() {
        let state = GameState::initial();
        let new_state = state.apply_move(3).unwrap();

        assert_eq!(new_state.current_player(), Player::Yellow);
        assert_eq!(new_state.board().get(5, 3), Cell::Red);
        assert_eq!(
            new_state.last_move(),
            Some(MoveRecord {
                player: Player::Red,
                row: 5,
                column: 3
            })
        );
        // original untouched
        assert_eq!(state.board().get(5, 3), Cell::Empty);
    }

    #[test]
    fn test_rejected_move_leaves_state_untouched() {
        let mut state = GameState::initial();
        for _ in 0..6 {
            state.apply_move_mut(0).unwrap();
        }
        let before = state;
        let err = state.apply_move_mut(0).unwrap_err();
        assert!(matches!(err, SessionError::Move(MoveError::ColumnFull { column: 0 })));
        let err = state.apply_move_mut(9).unwrap_err();
        assert!(matches!(err, SessionError::Move(MoveError::InvalidColumn { column: 9 })));
        assert_eq!(state, before);
    }

    #[test]
    fn test_win_detection() {
        let mut state = GameState::initial();

        for col in 0..4 {
            state = state.apply_move(col).unwrap(); // Red
            if col < 3 {
                state = state.apply_move(col).unwrap(); // Yellow
            }
        }

        assert!(state.is_terminal());
        assert_eq!(state.outcome(), Outcome::Won(Player::Red));
        assert_eq!(state.current_player(), Player::Red);
        assert!(state.legal_actions().is_empty());
        assert!(matches!(state.apply_move(5), Err(SessionError::GameOver)));
    }

    #[test]
    fn test_draw() {
        // Columns filled in pairs so that no line of four ever forms.
        let order = [
            0, 1, 0, 1, 0, 1, 1, 0, 1, 0, 1, 0, //
            2, 3, 2, 3, 2, 3, 3, 2, 3, 2, 3, 2, //
            4, 5, 4, 5, 4, 5, 5, 4, 5, 4, 5, 4, //
            6, 6, 6, 6, 6, 6,
        ];
        let mut state = GameState::initial();
        for (i, &col) in order.iter().enumerate() {
            assert!(!state.is_terminal(), "game ended early at move {i}");
            state.apply_move_mut(col).unwrap();
        }
        assert_eq!(state.outcome(), Outcome::Draw);
    }

    #[test]
    fn test_from_board_derives_outcome() {
        let won = Board::from_rows(&[
            ".......", ".......", ".......", ".......", ".......", "YYYY...",
        ])
        .unwrap();
        assert_eq!(
            GameState::from_board(won, Player::Red).outcome(),
            Outcome::Won(Player::Yellow)
        );

        let open = Board::from_rows(&[
            ".......", ".......", ".......", ".......", ".......", "YYY.RRR",
        ])
        .unwrap();
        let state = GameState::from_board(open, Player::Red);
        assert_eq!(state.outcome(), Outcome::InProgress);
        assert_eq!(state.current_player(), Player::Red);
    }
}
