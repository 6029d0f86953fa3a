use crate::game::{Board, Player};

use super::evaluator::{Heuristic, WindowHeuristic};

/// Score of the best line found, and the column that starts it.
/// `column` is `None` when the root position has no legal moves or is
/// already decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub score: i32,
    pub column: Option<usize>,
}

/// Fixed-depth minimax with alpha-beta pruning.
///
/// Columns are explored left to right and only a strictly better score
/// replaces the current best, so ties go to the left-most column. The search
/// works on a single scratch board, dropping a piece before each recursion
/// and lifting it afterwards.
pub struct SearchEngine {
    heuristic: Box<dyn Heuristic>,
}

/// Scratch state for one search.
struct Context<'a> {
    board: Board,
    side: Player,
    heuristic: &'a dyn Heuristic,
    nodes: u64,
}

impl SearchEngine {
    pub fn new() -> Self {
        SearchEngine {
            heuristic: Box::new(WindowHeuristic),
        }
    }

    pub fn with_heuristic(heuristic: Box<dyn Heuristic>) -> Self {
        SearchEngine { heuristic }
    }

    /// Pick a column for `side`, searching `depth` plies.
    ///
    /// A column that wins on the spot is always taken (left-most first), since
    /// the static evaluation of a deeper line can outscore an immediate win.
    /// Otherwise this is plain [`SearchEngine::minimax`].
    ///
    /// The reported score is always the value of the returned column. For an
    /// immediate win that is the evaluation of the finished board, which is
    /// also what minimax backs up for that column; the root score of
    /// [`SearchEngine::minimax`] can be higher when it prefers another column.
    pub fn choose_move(&self, board: &Board, side: Player, depth: u32) -> SearchResult {
        if depth >= 1 && !is_decided(board) {
            if let Some(result) = self.immediate_win(board, side) {
                log::debug!("{side} wins immediately in column {:?}", result.column);
                return result;
            }
        }
        self.minimax(board, side, depth)
    }

    /// Minimax from `side`'s point of view: `side` maximizes, the opponent
    /// minimizes, leaves are scored with the heuristic for `side`.
    pub fn minimax(&self, board: &Board, side: Player, depth: u32) -> SearchResult {
        let mut ctx = Context {
            board: *board,
            side,
            heuristic: self.heuristic.as_ref(),
            nodes: 0,
        };

        let result = if is_decided(board) {
            SearchResult {
                score: ctx.evaluate(),
                column: None,
            }
        } else {
            ctx.search(depth, i32::MIN, i32::MAX, true, false)
        };

        log::debug!(
            "search for {side} at depth {depth}: column {:?}, score {}, {} nodes",
            result.column,
            result.score,
            ctx.nodes
        );
        result
    }

    fn immediate_win(&self, board: &Board, side: Player) -> Option<SearchResult> {
        let mut scratch = *board;
        for col in board.available_columns() {
            let row = scratch.drop(col, side).ok()?;
            let wins = scratch.winning_line(row, col, side);
            let score = if wins {
                self.heuristic.evaluate(&scratch, side)
            } else {
                0
            };
            scratch.undo(col);
            if wins {
                return Some(SearchResult {
                    score,
                    column: Some(col),
                });
            }
        }
        None
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Context<'_> {
    fn evaluate(&self) -> i32 {
        self.heuristic.evaluate(&self.board, self.side)
    }

    /// `decided` is true when the move that led here completed a line.
    fn search(
        &mut self,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        decided: bool,
    ) -> SearchResult {
        self.nodes += 1;

        let columns = self.board.available_columns();
        if depth == 0 || columns.is_empty() || decided {
            return SearchResult {
                score: self.evaluate(),
                column: None,
            };
        }

        let mover = if maximizing { self.side } else { self.side.other() };
        let mut best_score = if maximizing { i32::MIN } else { i32::MAX };
        let mut best_column = None;

        for &col in &columns {
            let Ok(row) = self.board.drop(col, mover) else {
                continue;
            };
            let wins = self.board.winning_line(row, col, mover);
            let child = self.search(depth - 1, alpha, beta, !maximizing, wins).score;
            self.board.undo(col);

            if maximizing {
                if child > best_score {
                    best_score = child;
                    best_column = Some(col);
                }
                alpha = alpha.max(child);
            } else {
                if child < best_score {
                    best_score = child;
                    best_column = Some(col);
                }
                beta = beta.min(child);
            }
            if beta <= alpha {
                break;
            }
        }

        SearchResult {
            score: best_score,
            column: best_column.or(columns.first().copied()),
        }
    }
}

/// Already won by either side, or no room left
fn is_decided(board: &Board) -> bool {
    board.winner().is_some() || board.is_full()
}

/// Search with the default heuristic
pub fn choose_move(board: &Board, side: Player, depth: u32) -> SearchResult {
    SearchEngine::new().choose_move(board, side, depth)
}
