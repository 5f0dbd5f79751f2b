use std::borrow::Cow;
use std::fmt::Display;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde_derive::Serialize;

/// Error type. Anything that is a normal outcome of solving -- including a
/// board that is provably unsolvable -- is not an error. Errors are either
/// malformed input that never reaches the solver, or a defect in the solver
/// itself (a missing path that must structurally exist, a breached move
/// ceiling).
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    InvalidInput(Cow<'static, str>),
    Internal(Cow<'static, str>),
}

impl Error {
    pub const fn invalid_const(s: &'static str) -> Self {
        Error::InvalidInput(Cow::Borrowed(s))
    }

    pub fn invalid<S: Into<String>>(s: S) -> Self {
        Error::InvalidInput(Cow::Owned(s.into()))
    }

    pub const fn internal_const(s: &'static str) -> Self {
        Error::Internal(Cow::Borrowed(s))
    }

    pub fn internal<S: Into<String>>(s: S) -> Self {
        Error::Internal(Cow::Owned(s.into()))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidInput(s) => write!(f, "invalid input: {}", s),
            Error::Internal(s) => write!(f, "internal error: {}", s),
        }
    }
}

impl std::error::Error for Error {}

/// Cells are addressed as [row, col], 0-based from the top-left.
pub type Index = [usize; 2];

/// The four ways the blank can slide, in the fixed table order used
/// everywhere (BFS neighbor visitation, wire indices, the rotation
/// sequences). The discriminant is the wire index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive,
         Serialize, strum_macros::EnumCount, strum_macros::EnumIter)]
#[repr(u8)]
pub enum Direction {
    Right = 0,
    Left,
    Up,
    Down,
}

impl Direction {
    /// [row, col] displacement of the blank for this direction.
    pub fn offset(self) -> [isize; 2] {
        match self {
            Direction::Right => [0, 1],
            Direction::Left => [0, -1],
            Direction::Up => [-1, 0],
            Direction::Down => [1, 0],
        }
    }

    /// The direction between two orthogonally adjacent cells, or None if the
    /// cells are not orthogonally adjacent.
    pub fn between(from: Index, to: Index) -> Option<Direction> {
        let dr = (to[0] as isize) - (from[0] as isize);
        let dc = (to[1] as isize) - (from[1] as isize);
        match (dr, dc) {
            (0, 1) => Some(Direction::Right),
            (0, -1) => Some(Direction::Left),
            (-1, 0) => Some(Direction::Up),
            (1, 0) => Some(Direction::Down),
            _ => None,
        }
    }

    /// The image of this direction under transposing the board (rows become
    /// columns). With the table order above this is index 3 - i, but the
    /// match keeps the pairing readable: right<->down and left<->up.
    pub fn transposed(self) -> Direction {
        match self {
            Direction::Right => Direction::Down,
            Direction::Left => Direction::Up,
            Direction::Up => Direction::Left,
            Direction::Down => Direction::Right,
        }
    }

    /// The cell one step in this direction from `cell`, if it stays on an
    /// n-by-n board.
    pub fn step(self, cell: Index, n: usize) -> Option<Index> {
        let [dr, dc] = self.offset();
        let r = cell[0] as isize + dr;
        let c = cell[1] as isize + dc;
        if r >= 0 && r < n as isize && c >= 0 && c < n as isize {
            Some([r as usize, c as usize])
        } else {
            None
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let c = match self {
            Direction::Right => 'R',
            Direction::Left => 'L',
            Direction::Up => 'U',
            Direction::Down => 'D',
        };
        write!(f, "{}", c)
    }
}

pub fn check_orthogonally_adjacent(c1: Index, c2: Index) -> Result<(), Error> {
    let diff = (c1[0].abs_diff(c2[0]), c1[1].abs_diff(c2[1]));
    if diff != (0, 1) && diff != (1, 0) {
        Err(Error::internal(format!(
            "Cells {:?} and {:?} are not orthogonally adjacent", c1, c2)))
    } else {
        Ok(())
    }
}
