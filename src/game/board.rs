use std::fmt;

use super::Player;
use crate::error::{BoardParseError, MoveError};

pub const ROWS: usize = 6;
pub const COLS: usize = 7;
pub const WINNING_LENGTH: usize = 4;

/// (row step, col step) for horizontal, vertical, diagonal \ and diagonal /.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Red,
    Yellow,
}

impl Cell {
    /// The player owning this cell, if any
    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Red => Some(Player::Red),
            Cell::Yellow => Some(Player::Yellow),
        }
    }

    fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Red => 'R',
            Cell::Yellow => 'Y',
        }
    }
}

/// A 6x7 grid. Row 0 is the top, row 5 is the bottom.
///
/// Pieces always obey gravity: within a column the occupied cells form a
/// contiguous run resting on the bottom row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Board {
            cells: [[Cell::Empty; COLS]; ROWS],
        }
    }

    /// Build a board from text rows, top row first. `.` is empty, `R`/`Y`
    /// are pieces. Rejects boards with pieces floating above empty cells.
    pub fn from_rows(rows: &[&str]) -> Result<Self, BoardParseError> {
        let shape_err = BoardParseError::WrongShape {
            expected_rows: ROWS,
            expected_cols: COLS,
        };
        if rows.len() != ROWS {
            return Err(shape_err);
        }

        let mut board = Board::new();
        for (row, line) in rows.iter().enumerate() {
            let symbols: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if symbols.len() != COLS {
                return Err(shape_err);
            }
            for (col, symbol) in symbols.into_iter().enumerate() {
                board.cells[row][col] = match symbol {
                    '.' => Cell::Empty,
                    'R' | 'r' => Cell::Red,
                    'Y' | 'y' => Cell::Yellow,
                    other => return Err(BoardParseError::UnknownSymbol(other)),
                };
            }
        }

        for row in 0..ROWS - 1 {
            for col in 0..COLS {
                if board.cells[row][col] != Cell::Empty && board.cells[row + 1][col] == Cell::Empty {
                    return Err(BoardParseError::Floating { row, col });
                }
            }
        }

        Ok(board)
    }

    /// Get the cell at a specific position
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// Check if a column is full. Out-of-range columns count as full.
    pub fn is_column_full(&self, col: usize) -> bool {
        if col >= COLS {
            return true;
        }
        self.cells[0][col] != Cell::Empty
    }

    /// Number of pieces stacked in a column. Out-of-range columns are empty.
    pub fn column_height(&self, col: usize) -> usize {
        if col >= COLS {
            return 0;
        }
        (0..ROWS)
            .filter(|&row| self.cells[row][col] != Cell::Empty)
            .count()
    }

    /// Drop a piece in a column, returns the row where it landed
    pub fn drop(&mut self, col: usize, player: Player) -> Result<usize, MoveError> {
        if col >= COLS {
            return Err(MoveError::InvalidColumn { column: col });
        }

        if self.is_column_full(col) {
            return Err(MoveError::ColumnFull { column: col });
        }

        let row = ROWS - 1 - self.column_height(col);
        self.cells[row][col] = player.to_cell();
        Ok(row)
    }

    /// Remove the topmost piece of a column. Used by the search to restore the
    /// board after exploring a move. Returns the row that was cleared, or
    /// `None` for an empty or out-of-range column.
    pub fn undo(&mut self, col: usize) -> Option<usize> {
        if col >= COLS {
            return None;
        }
        let row = (0..ROWS).find(|&row| self.cells[row][col] != Cell::Empty)?;
        self.cells[row][col] = Cell::Empty;
        Some(row)
    }

    /// Check if the board is completely full.
    ///
    /// Gravity makes a full top row equivalent to a full board.
    pub fn is_full(&self) -> bool {
        (0..COLS).all(|col| self.is_column_full(col))
    }

    /// Columns that can still take a piece, left to right
    pub fn available_columns(&self) -> Vec<usize> {
        (0..COLS).filter(|&col| !self.is_column_full(col)).collect()
    }

    /// Check whether the piece at (row, col) owned by `player` is part of a run
    /// of at least four along any direction.
    pub fn winning_line(&self, row: usize, col: usize, player: Player) -> bool {
        if row >= ROWS || col >= COLS {
            return false;
        }
        let cell = player.to_cell();
        if self.cells[row][col] != cell {
            return false;
        }

        DIRECTIONS.iter().any(|&(dr, dc)| {
            let count =
                1 + self.run_length(row, col, dr, dc, cell) + self.run_length(row, col, -dr, -dc, cell);
            count >= WINNING_LENGTH
        })
    }

    /// Full-board scan for a completed line. Used for positions that were
    /// not produced move by move.
    pub fn winner(&self) -> Option<Player> {
        for row in 0..ROWS {
            for col in 0..COLS {
                if let Some(player) = self.cells[row][col].owner() {
                    if self.winning_line(row, col, player) {
                        return Some(player);
                    }
                }
            }
        }
        None
    }

    /// Copy of the board with every Red piece turned Yellow and vice versa
    pub fn with_sides_swapped(&self) -> Board {
        let mut swapped = *self;
        for row in swapped.cells.iter_mut() {
            for cell in row.iter_mut() {
                *cell = match *cell {
                    Cell::Empty => Cell::Empty,
                    Cell::Red => Cell::Yellow,
                    Cell::Yellow => Cell::Red,
                };
            }
        }
        swapped
    }

    /// Count contiguous `cell`s starting one step away from (row, col)
    fn run_length(&self, row: usize, col: usize, dr: isize, dc: isize, cell: Cell) -> usize {
        let mut count = 0;
        let mut r = row as isize + dr;
        let mut c = col as isize + dc;
        while r >= 0
            && r < ROWS as isize
            && c >= 0
            && c < COLS as isize
            && self.cells[r as usize][c as usize] == cell
        {
            count += 1;
            r += dr;
            c += dc;
        }
        count
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: String = row.iter().map(|cell| cell.symbol()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Reference check: does any run of four pass through (row, col)?
    fn scan_through(board: &Board, row: usize, col: usize, player: Player) -> bool {
        let cell = player.to_cell();
        for r in 0..ROWS {
            for c in 0..COLS {
                for &(dr, dc) in &DIRECTIONS {
                    let cells: Vec<(isize, isize)> = (0..WINNING_LENGTH as isize)
                        .map(|i| (r as isize + i * dr, c as isize + i * dc))
                        .collect();
                    let in_bounds = cells
                        .iter()
                        .all(|&(r, c)| r >= 0 && r < ROWS as isize && c >= 0 && c < COLS as isize);
                    if !in_bounds {
                        continue;
                    }
                    let all_owned = cells
                        .iter()
                        .all(|&(r, c)| board.get(r as usize, c as usize) == cell);
                    let through = cells
                        .iter()
                        .any(|&(r, c)| r as usize == row && c as usize == col);
                    if all_owned && through {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn assert_gravity(board: &Board) {
        for col in 0..COLS {
            for row in 0..ROWS - 1 {
                if board.get(row, col) != Cell::Empty {
                    assert_ne!(board.get(row + 1, col), Cell::Empty, "floating piece at ({row}, {col})");
                }
            }
        }
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        for row in 0..ROWS {
            for col in 0..COLS {
                assert_eq!(board.get(row, col), Cell::Empty);
            }
        }
        assert_eq!(board.available_columns(), vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_drop_piece() {
        let mut board = Board::new();

        let row = board.drop(3, Player::Red).unwrap();
        assert_eq!(row, 5);
        assert_eq!(board.get(5, 3), Cell::Red);

        let row = board.drop(3, Player::Yellow).unwrap();
        assert_eq!(row, 4);
        assert_eq!(board.get(4, 3), Cell::Yellow);
        assert_eq!(board.column_height(3), 2);
    }

    #[test]
    fn test_column_full() {
        let mut board = Board::new();
        for _ in 0..ROWS {
            board.drop(0, Player::Red).unwrap();
        }

        assert!(board.is_column_full(0));
        assert_eq!(
            board.drop(0, Player::Yellow),
            Err(MoveError::ColumnFull { column: 0 })
        );
        assert_eq!(board.available_columns(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_invalid_column() {
        let mut board = Board::new();
        assert_eq!(
            board.drop(7, Player::Red),
            Err(MoveError::InvalidColumn { column: 7 })
        );
    }

    #[test]
    fn test_undo_restores_board() {
        let mut board = Board::new();
        board.drop(2, Player::Red).unwrap();
        let before = board;
        board.drop(2, Player::Yellow).unwrap();
        assert_eq!(board.undo(2), Some(4));
        assert_eq!(board, before);
        assert_eq!(board.undo(5), None);
    }

    #[test]
    fn test_full_board() {
        let mut board = Board::new();
        for col in 0..COLS {
            for _ in 0..ROWS {
                board.drop(col, Player::Red).unwrap();
            }
        }
        assert!(board.is_full());
        assert!(board.available_columns().is_empty());
    }

    #[test]
    fn test_horizontal_win() {
        let mut board = Board::new();
        for col in 0..4 {
            board.drop(col, Player::Red).unwrap();
        }
        assert!(board.winning_line(5, 2, Player::Red));
        assert!(!board.winning_line(5, 2, Player::Yellow));
    }

    #[test]
    fn test_vertical_win() {
        let mut board = Board::new();
        for _ in 0..4 {
            board.drop(3, Player::Yellow).unwrap();
        }
        assert!(board.winning_line(2, 3, Player::Yellow));
    }

    #[test]
    fn test_diagonal_up_win() {
        let board = Board::from_rows(&[
            ".......",
            ".......",
            "...R...",
            "..RY...",
            ".RYY...",
            "RYYY...",
        ])
        .unwrap();
        assert!(board.winning_line(2, 3, Player::Red));
        assert!(board.winning_line(5, 0, Player::Red));
    }

    #[test]
    fn test_diagonal_down_win() {
        let board = Board::from_rows(&[
            ".......",
            ".......",
            "...R...",
            "...YR..",
            "...YYR.",
            "...YYYR",
        ])
        .unwrap();
        assert!(board.winning_line(2, 3, Player::Red));
        assert_eq!(board.winner(), Some(Player::Red));
    }

    #[test]
    fn test_no_win_with_three() {
        let mut board = Board::new();
        for col in 0..3 {
            board.drop(col, Player::Red).unwrap();
        }
        assert!(!board.winning_line(5, 1, Player::Red));
        assert_eq!(board.winner(), None);
    }

    #[test]
    fn test_from_rows_rejects_floating_piece() {
        let err = Board::from_rows(&[
            ".......",
            ".......",
            ".......",
            ".......",
            "...R...",
            ".......",
        ])
        .unwrap_err();
        assert_eq!(err, BoardParseError::Floating { row: 4, col: 3 });
    }

    #[test]
    fn test_from_rows_rejects_bad_shape_and_symbol() {
        assert!(matches!(
            Board::from_rows(&["......."]),
            Err(BoardParseError::WrongShape { .. })
        ));
        let err = Board::from_rows(&[
            ".......", ".......", ".......", ".......", ".......", "...X...",
        ])
        .unwrap_err();
        assert_eq!(err, BoardParseError::UnknownSymbol('X'));
    }

    #[test]
    fn test_out_of_range_columns_are_harmless() {
        let mut board = Board::new();
        board.drop(0, Player::Red).unwrap();
        let before = board;

        assert_eq!(board.undo(COLS), None);
        assert_eq!(board.undo(usize::MAX), None);
        assert_eq!(board.column_height(COLS + 2), 0);
        assert_eq!(board, before);
    }

    #[test]
    fn test_display_round_trips_through_from_rows() {
        let mut board = Board::new();
        board.drop(0, Player::Red).unwrap();
        board.drop(0, Player::Yellow).unwrap();
        board.drop(6, Player::Red).unwrap();
        let text = board.to_string();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(Board::from_rows(&rows).unwrap(), board);
    }

    #[test]
    fn test_local_win_check_matches_full_scan_on_random_games() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let mut board = Board::new();
            let mut player = Player::Red;
            loop {
                let columns = board.available_columns();
                if columns.is_empty() {
                    break;
                }
                let col = columns[rng.random_range(0..columns.len())];
                let height = board.column_height(col);
                let row = board.drop(col, player).unwrap();

                assert_eq!(row, ROWS - 1 - height);
                assert_eq!(board.column_height(col), height + 1);
                assert_gravity(&board);
                assert_eq!(board.is_full(), board.available_columns().is_empty());

                let local = board.winning_line(row, col, player);
                assert_eq!(local, scan_through(&board, row, col, player));
                if local {
                    assert_eq!(board.winner(), Some(player));
                    break;
                }
                assert_eq!(board.winner(), None);
                player = player.other();
            }
        }
    }
}
