//! Board graph — cell classification, adjacency, and path distances.
//!
//! DESIGN
//! ======
//! The board is a rectangular grid with odd dimensions. Coordinate parity
//! decides the role of each cell:
//! - both even → ground (walkable, the only graph nodes)
//! - exactly one odd → wall slot (between two ground cells)
//! - both odd → pillar (never occupied)
//!
//! Two ground cells two steps apart are adjacent unless the wall slot
//! between them is built. Distances are unweighted BFS hop counts, where one
//! hop costs one action unit.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

// =============================================================================
// SIDES
// =============================================================================

/// One of the two players. Side one is always the session creator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "side1")]
    One,
    #[serde(rename = "side2")]
    Two,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::One, Side::Two];

    /// Array index for per-side tables (`0` for the creator, `1` for the joiner).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
        }
    }

    #[must_use]
    pub fn other(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }

    #[must_use]
    pub fn from_index(idx: usize) -> Option<Side> {
        match idx {
            0 => Some(Side::One),
            1 => Some(Side::Two),
            _ => None,
        }
    }
}

// =============================================================================
// POSITIONS
// =============================================================================

/// A `(row, col)` coordinate. Serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Pos {
    pub row: i32,
    pub col: i32,
}

impl Pos {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

impl From<[i32; 2]> for Pos {
    fn from([row, col]: [i32; 2]) -> Self {
        Self { row, col }
    }
}

impl From<Pos> for [i32; 2] {
    fn from(pos: Pos) -> Self {
        [pos.row, pos.col]
    }
}

/// Role of a cell, derived from coordinate parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellType {
    Ground,
    Wall,
    Pillar,
}

/// Classify a coordinate by parity. Bounds are not checked.
#[must_use]
pub fn cell_type(pos: Pos) -> CellType {
    match (pos.row.rem_euclid(2) == 0, pos.col.rem_euclid(2) == 0) {
        (true, true) => CellType::Ground,
        (false, false) => CellType::Pillar,
        _ => CellType::Wall,
    }
}

// =============================================================================
// GRID
// =============================================================================

/// State of one grid cell. Only wall slots are ever `Built`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WallCell {
    Empty,
    Built(Side),
}

/// Row-major wall grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: i32,
    cols: i32,
    cells: Vec<WallCell>,
}

impl Grid {
    /// Create an empty grid. Dimensions must be odd for parity roles to hold;
    /// callers validate this through `BoardSettings::validate`.
    #[must_use]
    pub fn new(rows: i32, cols: i32) -> Self {
        let len = usize::try_from(rows.max(0) * cols.max(0)).unwrap_or(0);
        Self { rows, cols, cells: vec![WallCell::Empty; len] }
    }

    #[must_use]
    pub fn rows(&self) -> i32 {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> i32 {
        self.cols
    }

    #[must_use]
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.row >= 0 && pos.col >= 0 && pos.row < self.rows && pos.col < self.cols
    }

    fn offset(&self, pos: Pos) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        usize::try_from(pos.row * self.cols + pos.col).ok()
    }

    /// Cell state, or `None` when out of bounds.
    #[must_use]
    pub fn get(&self, pos: Pos) -> Option<WallCell> {
        self.offset(pos).map(|i| self.cells[i])
    }

    #[must_use]
    pub fn is_built(&self, pos: Pos) -> bool {
        matches!(self.get(pos), Some(WallCell::Built(_)))
    }

    /// Overwrite a cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, pos: Pos, cell: WallCell) {
        if let Some(i) = self.offset(pos) {
            self.cells[i] = cell;
        }
    }

    /// Number of walls built by `side`.
    #[must_use]
    pub fn wall_count(&self, side: Side) -> u32 {
        let count = self
            .cells
            .iter()
            .filter(|c| **c == WallCell::Built(side))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

// =============================================================================
// BOARD SETTINGS
// =============================================================================

/// Grid dimensions and each side's start and goal cell. Fixed for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSettings {
    /// `[rows, cols]`, both odd.
    pub dims: [i32; 2],
    /// Start cell indexed by `Side::index`.
    pub start_pos: [Pos; 2],
    /// Goal cell indexed by `Side::index`.
    pub goal_pos: [Pos; 2],
}

impl Default for BoardSettings {
    /// 13×13 grid (7×7 ground cells). The creator runs top-left to
    /// bottom-right, the joiner top-right to bottom-left.
    fn default() -> Self {
        Self {
            dims: [13, 13],
            start_pos: [Pos::new(0, 0), Pos::new(0, 12)],
            goal_pos: [Pos::new(12, 12), Pos::new(12, 0)],
        }
    }
}

impl BoardSettings {
    /// Check dimensions and that every start/goal is an in-bounds ground cell.
    ///
    /// # Errors
    ///
    /// Returns a short description of the first violated constraint.
    pub fn validate(&self) -> Result<(), &'static str> {
        let [rows, cols] = self.dims;
        if rows < 3 || cols < 3 || rows % 2 == 0 || cols % 2 == 0 {
            return Err("board dimensions must be odd and at least 3");
        }
        let grid = Grid::new(rows, cols);
        for pos in self.start_pos.iter().chain(self.goal_pos.iter()) {
            if !grid.in_bounds(*pos) || cell_type(*pos) != CellType::Ground {
                return Err("start and goal cells must be ground cells on the board");
            }
        }
        if Side::BOTH
            .iter()
            .any(|s| self.start_pos[s.index()] == self.goal_pos[s.index()])
        {
            return Err("a side cannot start on its own goal");
        }
        Ok(())
    }

    #[must_use]
    pub fn empty_grid(&self) -> Grid {
        Grid::new(self.dims[0], self.dims[1])
    }
}

// =============================================================================
// GRAPH
// =============================================================================

const STEPS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Ground cells adjacent to `pos`: two steps away, in bounds, with the wall
/// slot between them not built. Non-ground input yields no neighbors.
#[must_use]
pub fn neighbors(grid: &Grid, pos: Pos) -> Vec<Pos> {
    if cell_type(pos) != CellType::Ground || !grid.in_bounds(pos) {
        return Vec::new();
    }
    STEPS
        .iter()
        .filter_map(|&(dr, dc)| {
            let slot = Pos::new(pos.row + dr, pos.col + dc);
            let next = Pos::new(pos.row + 2 * dr, pos.col + 2 * dc);
            (grid.in_bounds(next) && !grid.is_built(slot)).then_some(next)
        })
        .collect()
}

/// BFS hop count from `start` to `target`, or `None` when unreachable.
#[must_use]
pub fn distance(grid: &Grid, start: Pos, target: Pos) -> Option<u32> {
    bfs(grid, start, target, None)
}

/// Whether `target` is reachable from `start` in at most `max_hops` hops.
/// Stops expanding as soon as the frontier passes `max_hops`.
#[must_use]
pub fn reachable_within(grid: &Grid, start: Pos, target: Pos, max_hops: u32) -> bool {
    bfs(grid, start, target, Some(max_hops)).is_some()
}

fn bfs(grid: &Grid, start: Pos, target: Pos, max_hops: Option<u32>) -> Option<u32> {
    if cell_type(start) != CellType::Ground || !grid.in_bounds(start) {
        return None;
    }
    if start == target {
        return Some(0);
    }

    let mut seen = vec![false; grid.cells.len()];
    seen[grid.offset(start)?] = true;

    let mut queue = VecDeque::from([(start, 0u32)]);
    while let Some((pos, dist)) = queue.pop_front() {
        if max_hops.is_some_and(|max| dist >= max) {
            continue;
        }
        for next in neighbors(grid, pos) {
            let Some(i) = grid.offset(next) else { continue };
            if seen[i] {
                continue;
            }
            if next == target {
                return Some(dist + 1);
            }
            seen[i] = true;
            queue.push_back((next, dist + 1));
        }
    }
    None
}

#[cfg(test)]
#[path = "board_test.rs"]
mod tests;
