use std::time::Instant;
use serde_derive::Serialize;
use strum::IntoEnumIterator;
use tracing::{debug, info};
use crate::board::Board;
use crate::core::{Direction, Error, Index};
use crate::operator::BoardOperator;
use crate::path::{LockGrid, PathFinder};
use crate::solvability::is_solvable;

/// The rotation that finishes a column pair in the bottom two rows. With the
/// pair's bottom tile already home at (N-1, i), the top tile staged at
/// (N-2, i+2) and the blank at (N-2, i+1), these ten blank slides cycle the
/// staged tile into (N-2, i) and return the bottom tile to its cell, all
/// inside the 2x3 window at columns i..i+2. It is the unique shortest such
/// sequence; its effect is a fixed permutation of the window, verified by
/// simulation in the tests rather than re-derived.
pub const GOLDEN_ROTATION: [Direction; 10] = [
    Direction::Left, Direction::Down, Direction::Right, Direction::Up,
    Direction::Right, Direction::Down, Direction::Left, Direction::Left,
    Direction::Up, Direction::Right,
];

lazy_static::lazy_static! {
    /// The same rotation for a row pair in the right two columns: each token
    /// of GOLDEN_ROTATION mapped through its transpose (right<->down,
    /// left<->up). Derived, never authored independently.
    pub static ref GOLDEN_ROTATION_VERTICAL: [Direction; 10] = {
        let mut seq = GOLDEN_ROTATION;
        for d in seq.iter_mut() {
            *d = d.transposed();
        }
        seq
    };
}

/// The outcome of a solve: either the board was provably unsolvable, or a
/// replayable sequence of blank slides that reaches the solved board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    pub solvable: bool,
    pub moves: Vec<Direction>,
}

/// The strictly ordered stages of the reduction. Each stage assumes every
/// earlier stage is complete and locked; they run exactly once, in
/// declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::EnumIter)]
pub enum Phase {
    /// Cells (i, j) with i < N-2 and j < N-2, row-major, locked one by one.
    InteriorBlock,
    /// Bottom two rows, finished pairwise per column over columns 0..N-2.
    BottomRows,
    /// Right two columns, the transpose of BottomRows over rows 0..N-2.
    RightColumns,
    /// The remaining four cells, rotated into place directly.
    FinalSquare,
}

/// Solves a board by progressive reduction: lock the interior block cell by
/// cell, close out the bottom rows and right columns pairwise with the
/// rotation gadget, then rotate the trailing 2x2. Produces *a* solution,
/// never a minimal one.
pub struct ReductionSolver {
    size: usize,
    op: BoardOperator,
    finder: PathFinder,
    locks: LockGrid,
}

impl ReductionSolver {
    pub fn new(board: Board) -> Self {
        Self::from_operator(BoardOperator::new(board))
    }

    #[cfg(test)]
    pub(crate) fn with_ceiling(board: Board, ceiling: usize) -> Self {
        Self::from_operator(BoardOperator::with_ceiling(board, ceiling))
    }

    fn from_operator(op: BoardOperator) -> Self {
        let size = op.board().size();
        ReductionSolver {
            size,
            op,
            finder: PathFinder::new(size),
            locks: LockGrid::new(size),
        }
    }

    /// Gates on the parity check, then runs the phases in order. An
    /// unsolvable board is a normal negative result; an `Err` is always an
    /// implementation defect, never a property of the puzzle.
    pub fn solve(mut self) -> Result<Solution, Error> {
        info!(size = self.size, "starting reduction solve");
        if !is_solvable(self.op.board()) {
            info!("parity check failed; board is unsolvable");
            return Ok(Solution { solvable: false, moves: Vec::new() });
        }
        let start = Instant::now();
        for phase in Phase::iter() {
            self.run_phase(phase)?;
            debug!(?phase, locked = self.locks.locked_count(),
                   moves = self.op.history().len(), "phase complete");
        }
        if !self.op.board().is_solved() {
            return Err(Error::internal_const(
                "all phases ran but the board is not solved"));
        }
        info!(moves = self.op.history().len(),
              elapsed_ms = start.elapsed().as_millis() as u64, "solved");
        Ok(Solution { solvable: true, moves: self.op.into_history() })
    }

    fn run_phase(&mut self, phase: Phase) -> Result<(), Error> {
        match phase {
            Phase::InteriorBlock => self.solve_interior_block(),
            Phase::BottomRows => self.solve_bottom_rows(),
            Phase::RightColumns => self.solve_right_columns(),
            Phase::FinalSquare => self.solve_final_square(),
        }
    }

    fn solve_interior_block(&mut self) -> Result<(), Error> {
        let n = self.size;
        for i in 0..n - 2 {
            for j in 0..n - 2 {
                self.place_and_lock([i, j])?;
            }
        }
        Ok(())
    }

    /// Finishes one column pair of the bottom two rows. The bottom tile goes
    /// straight home and its cell is locked at once, which shields it from
    /// all routing while the top tile is staged two cells to the right. The
    /// rotation is then applied blind: it is the one place a locked cell's
    /// content moves, and the sequence provably puts it back.
    fn solve_bottom_rows(&mut self) -> Result<(), Error> {
        let n = self.size;
        for i in 0..n - 2 {
            self.place_and_lock([n - 1, i])?;
            if self.op.blank() == [n - 2, i] {
                self.op.swap_adjacent([n - 2, i + 1], [n - 2, i])?;
            }
            if self.op.cell_of_target([n - 2, i]) != [n - 2, i] {
                let top = self.op.board().target_value([n - 2, i]);
                self.move_tile(top, [n - 2, i + 2])?;
                self.route_blank([n - 2, i + 1], Some([n - 2, i + 2]))?;
                self.op.apply_sequence(&GOLDEN_ROTATION)?;
            }
            self.locks.lock([n - 2, i]);
        }
        Ok(())
    }

    /// The transpose of solve_bottom_rows over the right two columns.
    fn solve_right_columns(&mut self) -> Result<(), Error> {
        let n = self.size;
        for j in 0..n - 2 {
            self.place_and_lock([j, n - 1])?;
            if self.op.blank() == [j, n - 2] {
                self.op.swap_adjacent([j + 1, n - 2], [j, n - 2])?;
            }
            if self.op.cell_of_target([j, n - 2]) != [j, n - 2] {
                let left = self.op.board().target_value([j, n - 2]);
                self.move_tile(left, [j + 2, n - 2])?;
                self.route_blank([j + 1, n - 2], Some([j + 2, n - 2]))?;
                self.op.apply_sequence(&*GOLDEN_ROTATION_VERTICAL)?;
            }
            self.locks.lock([j, n - 2]);
        }
        Ok(())
    }

    /// Only the trailing 2x2 is left, a single 4-cycle of cells. Placing its
    /// tiles one by one just rotates the ring; solvability guarantees the
    /// last two fall into place with the first.
    fn solve_final_square(&mut self) -> Result<(), Error> {
        let n = self.size;
        for cell in [[n - 2, n - 2], [n - 2, n - 1], [n - 1, n - 2]] {
            self.place_and_lock(cell)?;
        }
        self.locks.lock([n - 1, n - 1]);
        Ok(())
    }

    fn place_and_lock(&mut self, cell: Index) -> Result<(), Error> {
        let value = self.op.board().target_value(cell);
        self.move_tile(value, cell)?;
        self.locks.lock(cell);
        Ok(())
    }

    /// The shared tile mover: walk the tile along its shortest path over
    /// unlocked cells, routing the blank to the tile's next cell each step
    /// with the tile itself pinned so the detour cannot shove it aside.
    fn move_tile(&mut self, value: usize, dest: Index) -> Result<(), Error> {
        while self.op.cell_of_value(value) != dest {
            let cur = self.op.cell_of_value(value);
            let path = self.finder.find_path(&self.locks, cur, dest, None);
            if path.len() < 2 {
                return Err(Error::internal(format!(
                    "no route to bring tile {} to {:?}", value, dest)));
            }
            let next = path[1];
            self.route_blank(next, Some(cur))?;
            self.op.swap_adjacent(cur, next)?;
        }
        Ok(())
    }

    fn route_blank(&mut self, dest: Index, pinned: Option<Index>) -> Result<(), Error> {
        let path = self.finder.find_path(&self.locks, self.op.blank(), dest, pinned);
        if path.is_empty() {
            return Err(Error::internal(format!(
                "no route to bring the blank to {:?}", dest)));
        }
        for cell in path.into_iter().skip(1) {
            let blank = self.op.blank();
            self.op.swap_adjacent(blank, cell)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use crate::operator::MOVE_CEILING;
    use super::*;

    /// Replays a move sequence from the given start, checking every slide is
    /// legal, and returns the resulting board.
    fn replay(tiles: &[usize], moves: &[Direction]) -> Board {
        let mut board = Board::from_tiles(tiles).unwrap();
        for &m in moves {
            board.slide(m).unwrap();
        }
        board
    }

    fn solve_and_replay(tiles: &[usize]) -> (Solution, Board) {
        let board = Board::from_tiles(tiles).unwrap();
        let solution = ReductionSolver::new(board).solve().unwrap();
        assert!(solution.solvable);
        assert!(solution.moves.len() <= MOVE_CEILING);
        (solution.clone(), replay(tiles, &solution.moves))
    }

    #[test]
    fn test_vertical_rotation_is_the_transpose() {
        let expect: Vec<Direction> =
            GOLDEN_ROTATION.iter().map(|d| d.transposed()).collect();
        assert_eq!(GOLDEN_ROTATION_VERTICAL.to_vec(), expect);
        assert_eq!(GOLDEN_ROTATION_VERTICAL[0], Direction::Up);
    }

    #[test]
    fn test_golden_rotation_resolves_a_bottom_pair() {
        // 4x4 with the pair for column 0 of the bottom rows set up exactly
        // as solve_bottom_rows leaves it: 13 (bottom) home at (3, 0), 9
        // (top) staged at (2, 2), blank at (2, 1).
        let tiles = [
            1, 2, 3, 4,
            5, 6, 7, 8,
            10, 0, 9, 11,
            13, 12, 14, 15,
        ];
        let mut op = BoardOperator::new(Board::from_tiles(&tiles).unwrap());
        op.apply_sequence(&GOLDEN_ROTATION).unwrap();
        assert_eq!(op.cell_of_value(9), [2, 0]);
        assert_eq!(op.cell_of_value(13), [3, 0]);
        assert_eq!(op.blank(), [2, 1]);
        // Nothing outside the 2x3 window moved.
        for col in 0..4 {
            assert_eq!(op.board().get([0, col]), col + 1);
            assert_eq!(op.board().get([1, col]), col + 5);
        }
        assert_eq!(op.board().get([2, 3]), 11);
        assert_eq!(op.board().get([3, 3]), 15);
    }

    #[test]
    fn test_vertical_rotation_resolves_a_right_pair() {
        // The transposed setup for row 0 of the right columns: 4 home at
        // (0, 3), 3 staged at (2, 2), blank at (1, 2).
        let tiles = [
            1, 2, 7, 4,
            5, 6, 0, 8,
            9, 10, 3, 11,
            13, 14, 15, 12,
        ];
        let mut op = BoardOperator::new(Board::from_tiles(&tiles).unwrap());
        op.apply_sequence(&*GOLDEN_ROTATION_VERTICAL).unwrap();
        assert_eq!(op.cell_of_value(3), [0, 2]);
        assert_eq!(op.cell_of_value(4), [0, 3]);
        assert_eq!(op.blank(), [1, 2]);
        // Nothing outside the 3x2 window moved.
        for row in 0..4 {
            assert_eq!(op.board().get([row, 0]), row * 4 + 1);
            assert_eq!(op.board().get([row, 1]), row * 4 + 2);
        }
        assert_eq!(op.board().get([3, 2]), 15);
        assert_eq!(op.board().get([3, 3]), 12);
    }

    #[test]
    fn test_solves_trivial_2x2() {
        let (solution, replayed) = solve_and_replay(&[1, 2, 0, 3]);
        assert!(replayed.is_solved());
        assert_eq!(solution.moves, vec![Direction::Right]);
    }

    #[test]
    fn test_unsolvable_3x3_is_a_negative_result() {
        let board = Board::from_tiles(&[2, 1, 3, 4, 5, 6, 7, 8, 0]).unwrap();
        let solution = ReductionSolver::new(board).solve().unwrap();
        assert_eq!(solution, Solution { solvable: false, moves: vec![] });
    }

    #[test]
    fn test_solves_scrambled_3x3() {
        let (_, replayed) = solve_and_replay(&[5, 7, 3, 4, 8, 6, 1, 0, 2]);
        assert!(replayed.is_solved());
    }

    #[test]
    fn test_solves_scrambled_4x4() {
        let (_, replayed) = solve_and_replay(
            &[1, 2, 3, 4, 5, 6, 7, 0, 9, 10, 11, 8, 13, 14, 15, 12]);
        assert!(replayed.is_solved());
    }

    #[test]
    fn test_already_solved_board_needs_no_moves() {
        let board = Board::solved(5).unwrap();
        let solution = ReductionSolver::new(board).solve().unwrap();
        assert!(solution.solvable);
        assert!(solution.moves.is_empty());
    }

    fn scrambled(n: usize, rng: &mut ChaCha20Rng) -> Vec<usize> {
        let mut tiles: Vec<usize> = (0..n * n).collect();
        loop {
            tiles.shuffle(rng);
            if is_solvable(&Board::from_tiles(&tiles).unwrap()) {
                return tiles;
            }
        }
    }

    #[test]
    fn test_solves_random_boards_across_sizes() {
        let mut rng = ChaCha20Rng::seed_from_u64(0x51ed7e11);
        for n in 2..=6 {
            for _ in 0..5 {
                let tiles = scrambled(n, &mut rng);
                let (_, replayed) = solve_and_replay(&tiles);
                assert!(replayed.is_solved(), "size {} board {:?}", n, tiles);
            }
        }
    }

    #[test]
    fn test_solves_11x11_within_ceiling() {
        let mut rng = ChaCha20Rng::seed_from_u64(0xeea42aa1638be961);
        let tiles = scrambled(11, &mut rng);
        let (solution, replayed) = solve_and_replay(&tiles);
        assert!(replayed.is_solved());
        assert!(solution.moves.len() < MOVE_CEILING);
    }

    #[test]
    fn test_exhausted_ceiling_is_an_internal_error() {
        // This scramble needs at least 11 moves (its Manhattan distance), so
        // a ceiling of 10 must trip the defect path, not return an answer.
        let board = Board::from_tiles(&[5, 7, 3, 4, 8, 6, 1, 0, 2]).unwrap();
        let res = ReductionSolver::with_ceiling(board, 10).solve();
        assert!(matches!(res, Err(Error::Internal(_))));
    }

    #[test]
    fn test_solution_serializes_for_consumers() {
        let board = Board::from_tiles(&[1, 2, 0, 3]).unwrap();
        let solution = ReductionSolver::new(board).solve().unwrap();
        assert_eq!(
            serde_json::to_string(&solution).unwrap(),
            r#"{"solvable":true,"moves":["Right"]}"#);
    }
}
