use crate::board::{Board, BLANK};
use crate::core::{check_orthogonally_adjacent, Direction, Error, Index};

/// Hard cap on the number of recorded moves. The reduction strategy is
/// bounded well below this for any board it accepts, so reaching the ceiling
/// signals a defect in the strategy, never a hard puzzle -- unsolvable boards
/// are rejected before a single move is made.
pub const MOVE_CEILING: usize = 100_000;

/// The one mutation path for a board being solved. Owns the board, a
/// value-to-cell index kept in sync with every swap, and the move history.
///
/// The history records the *blank's* displacement for each swap; the tile
/// that moved went the opposite way.
pub struct BoardOperator {
    board: Board,
    positions: Box<[Index]>,
    history: Vec<Direction>,
    ceiling: usize,
}

impl BoardOperator {
    pub fn new(board: Board) -> Self {
        Self::with_ceiling(board, MOVE_CEILING)
    }

    pub(crate) fn with_ceiling(board: Board, ceiling: usize) -> Self {
        let n = board.size();
        let mut positions = vec![[0, 0]; n * n].into_boxed_slice();
        for r in 0..n {
            for c in 0..n {
                positions[board.get([r, c])] = [r, c];
            }
        }
        BoardOperator { board, positions, history: Vec::new(), ceiling }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn blank(&self) -> Index {
        self.positions[BLANK]
    }

    /// Current cell of the given value, in O(1).
    pub fn cell_of_value(&self, value: usize) -> Index {
        self.positions[value]
    }

    /// Current cell of the value whose solved home is `target` -- i.e. "where
    /// is the tile that belongs at `target` right now".
    pub fn cell_of_target(&self, target: Index) -> Index {
        self.positions[self.board.target_value(target)]
    }

    pub fn history(&self) -> &[Direction] {
        &self.history
    }

    pub fn into_history(self) -> Vec<Direction> {
        self.history
    }

    /// Swaps two orthogonally adjacent cells, one of which must hold the
    /// blank, recording the blank's displacement. Both preconditions are
    /// caller contracts; a violation is an internal defect, as is running
    /// into the move ceiling.
    pub fn swap_adjacent(&mut self, a: Index, b: Index) -> Result<(), Error> {
        if self.history.len() >= self.ceiling {
            return Err(Error::internal_const(
                "move ceiling exceeded without reaching the solved board"));
        }
        check_orthogonally_adjacent(a, b)?;
        let (tile_cell, blank_cell) = if self.board.get(a) == BLANK {
            (b, a)
        } else {
            (a, b)
        };
        if self.board.get(blank_cell) != BLANK {
            return Err(Error::internal_const(
                "swap_adjacent requires one of the cells to hold the blank"));
        }
        let dir = Direction::between(blank_cell, tile_cell).ok_or(
            Error::internal_const("adjacent cells with no direction between them"))?;
        self.history.push(dir);
        self.board.swap(tile_cell, blank_cell);
        self.positions[self.board.get(tile_cell)] = tile_cell;
        self.positions[self.board.get(blank_cell)] = blank_cell;
        Ok(())
    }

    /// Replays a fixed token sequence as successive blank slides. Used to
    /// apply the rotation sequences, which are verified as a whole; no cell
    /// is individually re-checked along the way.
    pub fn apply_sequence(&mut self, ops: &[Direction]) -> Result<(), Error> {
        for &op in ops {
            let blank = self.blank();
            let target = op.step(blank, self.board.size()).ok_or(
                Error::internal_const("fixed sequence stepped off the board"))?;
            self.swap_adjacent(target, blank)?;
        }
        Ok(())
    }
}
