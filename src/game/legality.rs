//! Move legality — wall connectivity, action cost, and whole-move validation.
//!
//! DESIGN
//! ======
//! Every function here is a pure decision over a borrowed grid. Provisional
//! wall placement happens on a scratch copy, so callers never observe a
//! half-applied state. The authoritative commit path calls `validate_move`
//! and only then `apply_move`; a move is either applied whole or not at all.
//!
//! INVARIANT
//! =========
//! A wall may never be built if it would leave either side without a path
//! to its own goal, regardless of who builds it.

use serde::{Deserialize, Serialize};

use super::board::{CellType, Grid, Pos, Side, WallCell, cell_type, distance};

/// Most action units a single move may spend.
pub const ACTION_BUDGET: u32 = 2;

// =============================================================================
// TYPES
// =============================================================================

/// One sub-move: relocate the mover's token, or build a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "cell", rename_all = "camelCase")]
pub enum Action {
    Ground(Pos),
    Wall(Pos),
}

impl Action {
    #[must_use]
    pub fn target(self) -> Pos {
        match self {
            Action::Ground(p) | Action::Wall(p) => p,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("a move needs one or two actions, got {0}")]
    ActionCount(usize),
    #[error("a move may relocate the token at most once")]
    MultipleGroundActions,
    #[error("the same cell appears twice in one move")]
    DuplicateTarget,
    #[error("cell {0:?} is not a ground cell on this board")]
    NotGround(Pos),
    #[error("wall at {0:?} is already built, off the board, or would block a path")]
    IllegalWall(Pos),
    #[error("cell {0:?} cannot be reached")]
    Unreachable(Pos),
    #[error("move costs {0} action units, the budget is {ACTION_BUDGET}")]
    OverBudget(u32),
}

impl crate::protocol::ErrorCode for MoveError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ActionCount(_) => "E_ACTION_COUNT",
            Self::MultipleGroundActions => "E_MULTIPLE_GROUND",
            Self::DuplicateTarget => "E_DUPLICATE_TARGET",
            Self::NotGround(_) => "E_NOT_GROUND",
            Self::IllegalWall(_) => "E_ILLEGAL_WALL",
            Self::Unreachable(_) => "E_UNREACHABLE",
            Self::OverBudget(_) => "E_OVER_BUDGET",
        }
    }
}

// =============================================================================
// DECISIONS
// =============================================================================

/// Whether a wall may be built at `slot` without stranding either side.
///
/// Pure: the borrowed grid is never modified.
#[must_use]
pub fn can_build_wall(grid: &Grid, positions: &[Pos; 2], goals: &[Pos; 2], slot: Pos) -> bool {
    if cell_type(slot) != CellType::Wall || grid.get(slot) != Some(WallCell::Empty) {
        return false;
    }
    let mut scratch = grid.clone();
    // Ownership is irrelevant to connectivity.
    scratch.set(slot, WallCell::Built(Side::One));
    Side::BOTH
        .iter()
        .all(|s| distance(&scratch, positions[s.index()], goals[s.index()]).is_some())
}

/// Action units `target` would cost `mover`, or `None` if the action is
/// illegal. Ground costs are raw BFS distances; callers cap them at the
/// budget.
#[must_use]
pub fn action_cost(grid: &Grid, positions: &[Pos; 2], goals: &[Pos; 2], mover: Side, target: Action) -> Option<u32> {
    match target {
        Action::Ground(cell) => {
            if cell_type(cell) != CellType::Ground || !grid.in_bounds(cell) {
                return None;
            }
            distance(grid, positions[mover.index()], cell)
        }
        Action::Wall(slot) => can_build_wall(grid, positions, goals, slot).then_some(1),
    }
}

/// BFS distance from each side's token to its own goal.
#[must_use]
pub fn goal_distances(grid: &Grid, positions: &[Pos; 2], goals: &[Pos; 2]) -> [Option<u32>; 2] {
    [
        distance(grid, positions[0], goals[0]),
        distance(grid, positions[1], goals[1]),
    ]
}

// =============================================================================
// WHOLE MOVES
// =============================================================================

/// Check that `actions` form one legal move for `mover`.
///
/// Actions are evaluated in order against a scratch board, so a second wall
/// sees the first one built and a wall after a relocation sees the token in
/// its new cell.
///
/// # Errors
///
/// Returns the first rule the move breaks.
pub fn validate_move(
    grid: &Grid,
    positions: &[Pos; 2],
    goals: &[Pos; 2],
    mover: Side,
    actions: &[Action],
) -> Result<(), MoveError> {
    if actions.is_empty() || actions.len() > 2 {
        return Err(MoveError::ActionCount(actions.len()));
    }
    if actions.len() == 2 {
        if actions[0].target() == actions[1].target() {
            return Err(MoveError::DuplicateTarget);
        }
        if matches!((actions[0], actions[1]), (Action::Ground(_), Action::Ground(_))) {
            return Err(MoveError::MultipleGroundActions);
        }
    }

    let mut scratch = grid.clone();
    let mut scratch_pos = *positions;
    let mut spent = 0;
    for &action in actions {
        let cost = match action_cost(&scratch, &scratch_pos, goals, mover, action) {
            Some(0) | None => return Err(rejection(&scratch, action)),
            Some(cost) => cost,
        };
        spent += cost;
        if spent > ACTION_BUDGET {
            return Err(MoveError::OverBudget(spent));
        }
        apply_action(&mut scratch, &mut scratch_pos, mover, action);
    }
    Ok(())
}

fn rejection(grid: &Grid, action: Action) -> MoveError {
    match action {
        Action::Wall(slot) => MoveError::IllegalWall(slot),
        Action::Ground(cell) if cell_type(cell) != CellType::Ground || !grid.in_bounds(cell) => {
            MoveError::NotGround(cell)
        }
        Action::Ground(cell) => MoveError::Unreachable(cell),
    }
}

/// Apply a move previously accepted by `validate_move`.
pub fn apply_move(grid: &mut Grid, positions: &mut [Pos; 2], mover: Side, actions: &[Action]) {
    for &action in actions {
        apply_action(grid, positions, mover, action);
    }
}

fn apply_action(grid: &mut Grid, positions: &mut [Pos; 2], mover: Side, action: Action) {
    match action {
        Action::Ground(cell) => positions[mover.index()] = cell,
        Action::Wall(slot) => grid.set(slot, WallCell::Built(mover)),
    }
}

#[cfg(test)]
#[path = "legality_test.rs"]
mod tests;
