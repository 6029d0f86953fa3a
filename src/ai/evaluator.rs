use crate::game::{Board, Player, COLS, ROWS, WINNING_LENGTH};

/// Trait for evaluating a board position from a player's perspective.
pub trait Heuristic: Send + Sync {
    fn evaluate(&self, board: &Board, player: Player) -> i32;
}

/// Scores every window of four cells: completed lines dominate, open threes
/// and twos add small amounts, mixed windows are worth nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowHeuristic;

impl WindowHeuristic {
    fn score_window(own: usize, opp: usize) -> i32 {
        match (own, opp) {
            (4, 0) => 100,
            (0, 4) => -100,
            (3, 0) => 5,
            (0, 3) => -5,
            (2, 0) => 2,
            (0, 2) => -2,
            _ => 0,
        }
    }
}

impl Heuristic for WindowHeuristic {
    fn evaluate(&self, board: &Board, player: Player) -> i32 {
        let own_cell = player.to_cell();
        let opp_cell = player.other().to_cell();

        windows()
            .map(|cells| {
                let mut own = 0;
                let mut opp = 0;
                for (row, col) in cells {
                    match board.get(row, col) {
                        c if c == own_cell => own += 1,
                        c if c == opp_cell => opp += 1,
                        _ => {}
                    }
                }
                Self::score_window(own, opp)
            })
            .sum()
    }
}

/// Score `board` for `side` with the default window heuristic
pub fn score(board: &Board, side: Player) -> i32 {
    WindowHeuristic.evaluate(board, side)
}

/// Every run of WINNING_LENGTH cells: horizontal, vertical, diagonal \ and
/// diagonal /.
fn windows() -> impl Iterator<Item = [(usize, usize); WINNING_LENGTH]> {
    let span = WINNING_LENGTH - 1;

    let horizontal = (0..ROWS)
        .flat_map(move |row| (0..COLS - span).map(move |col| window(row, col, 0, 1)));
    let vertical = (0..ROWS - span)
        .flat_map(move |row| (0..COLS).map(move |col| window(row, col, 1, 0)));
    let diagonal_down = (0..ROWS - span)
        .flat_map(move |row| (0..COLS - span).map(move |col| window(row, col, 1, 1)));
    let diagonal_up = (0..ROWS - span)
        .flat_map(move |row| (span..COLS).map(move |col| window(row, col, 1, -1)));

    horizontal
        .chain(vertical)
        .chain(diagonal_down)
        .chain(diagonal_up)
}

fn window(row: usize, col: usize, dr: usize, dc: isize) -> [(usize, usize); WINNING_LENGTH] {
    std::array::from_fn(|i| (row + i * dr, (col as isize + i as isize * dc) as usize))
}
