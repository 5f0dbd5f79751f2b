use bit_set::BitSet;
use strum::IntoEnumIterator;
use crate::core::{Direction, Index};

/// Cells whose correct tile is already in place. Bits are only ever set:
/// once a cell is locked it stays locked for the rest of the solve, and the
/// path finder refuses to route through it.
#[derive(Debug, Clone)]
pub struct LockGrid {
    size: usize,
    bits: BitSet,
}

impl LockGrid {
    pub fn new(size: usize) -> Self {
        LockGrid { size, bits: BitSet::with_capacity(size * size) }
    }

    pub fn lock(&mut self, index: Index) {
        self.bits.insert(index[0] * self.size + index[1]);
    }

    pub fn is_locked(&self, index: Index) -> bool {
        self.bits.contains(index[0] * self.size + index[1])
    }

    pub fn locked_count(&self) -> usize {
        self.bits.len()
    }
}

/// Breadth-first search over the 4-neighborhood of the board, treating
/// locked cells -- and at most one extra "pinned" cell -- as impassable.
/// The pin is how a tile is held in place while the blank is routed around
/// it.
pub struct PathFinder {
    size: usize,
}

impl PathFinder {
    pub fn new(size: usize) -> Self {
        PathFinder { size }
    }

    /// Shortest path from `from` to `to` inclusive, or an empty vector when
    /// `to` is unreachable. Neighbors are visited in the fixed table order
    /// (right, left, up, down), so among equal-length paths the first one
    /// discovered in that order wins; callers must only rely on length
    /// minimality.
    pub fn find_path(
        &self,
        locks: &LockGrid,
        from: Index,
        to: Index,
        pinned: Option<Index>,
    ) -> Vec<Index> {
        if from == to {
            return vec![from];
        }
        let n = self.size;
        let mut visited = vec![false; n * n];
        let mut previous = vec![[0, 0]; n * n];
        let mut queue = std::collections::VecDeque::new();
        visited[from[0] * n + from[1]] = true;
        queue.push_back(from);
        while let Some(cur) = queue.pop_front() {
            for d in Direction::iter() {
                let next = match d.step(cur, n) {
                    Some(cell) => cell,
                    None => continue,
                };
                let flat = next[0] * n + next[1];
                if visited[flat] || locks.is_locked(next) || pinned == Some(next) {
                    continue;
                }
                visited[flat] = true;
                previous[flat] = cur;
                if next == to {
                    let mut path = vec![next];
                    while *path.last().unwrap() != from {
                        let last = *path.last().unwrap();
                        path.push(previous[last[0] * n + last[1]]);
                    }
                    path.reverse();
                    return path;
                }
                queue.push_back(next);
            }
        }
        Vec::new()
    }
}
