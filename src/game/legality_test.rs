use super::*;
use crate::game::board::{Grid, Pos, Side, WallCell, distance};

const POSITIONS: [Pos; 2] = [Pos::new(0, 0), Pos::new(0, 4)];
const GOALS: [Pos; 2] = [Pos::new(4, 4), Pos::new(4, 0)];

fn grid_with(slots: &[(i32, i32)]) -> Grid {
    let mut grid = Grid::new(5, 5);
    for &(r, c) in slots {
        grid.set(Pos::new(r, c), WallCell::Built(Side::Two));
    }
    grid
}

fn wall_slots(grid: &Grid) -> Vec<Pos> {
    let mut out = Vec::new();
    for r in 0..grid.rows() {
        for c in 0..grid.cols() {
            if (r + c) % 2 == 1 {
                out.push(Pos::new(r, c));
            }
        }
    }
    out
}

// =============================================================================
// can_build_wall
// =============================================================================

#[test]
fn can_build_wall_matches_connectivity_definition_and_is_pure() {
    let grid = grid_with(&[(0, 1), (3, 2), (2, 3)]);
    for slot in wall_slots(&grid) {
        let before = grid.clone();
        let actual = can_build_wall(&grid, &POSITIONS, &GOALS, slot);
        assert_eq!(grid, before, "grid changed while checking {slot:?}");

        let expected = if grid.is_built(slot) {
            false
        } else {
            let mut probe = grid.clone();
            probe.set(slot, WallCell::Built(Side::One));
            Side::BOTH
                .iter()
                .all(|s| distance(&probe, POSITIONS[s.index()], GOALS[s.index()]).is_some())
        };
        assert_eq!(actual, expected, "slot {slot:?}");
    }
}

#[test]
fn wall_that_strands_a_player_is_rejected() {
    let grid = grid_with(&[(0, 1)]);
    assert!(!can_build_wall(&grid, &POSITIONS, &GOALS, Pos::new(1, 0)));
}

#[test]
fn wall_that_strands_the_opponent_is_rejected_too() {
    // Side two sits at (0,4); sealing it in is as illegal as sealing oneself.
    let grid = grid_with(&[(0, 3)]);
    assert!(!can_build_wall(&grid, &POSITIONS, &GOALS, Pos::new(1, 4)));
}

#[test]
fn built_slot_and_non_wall_cells_are_rejected() {
    let grid = grid_with(&[(0, 1)]);
    assert!(!can_build_wall(&grid, &POSITIONS, &GOALS, Pos::new(0, 1)));
    assert!(!can_build_wall(&grid, &POSITIONS, &GOALS, Pos::new(2, 2)));
    assert!(!can_build_wall(&grid, &POSITIONS, &GOALS, Pos::new(1, 1)));
    assert!(!can_build_wall(&grid, &POSITIONS, &GOALS, Pos::new(9, 0)));
}

// =============================================================================
// action_cost
// =============================================================================

#[test]
fn action_cost_for_ground_is_distance() {
    let grid = Grid::new(5, 5);
    let cost = |cell| action_cost(&grid, &POSITIONS, &GOALS, Side::One, Action::Ground(cell));
    assert_eq!(cost(Pos::new(0, 2)), Some(1));
    assert_eq!(cost(Pos::new(2, 2)), Some(2));
    assert_eq!(cost(Pos::new(4, 4)), Some(4));
    assert_eq!(cost(Pos::new(0, 1)), None);
}

#[test]
fn action_cost_for_wall_is_one_or_illegal() {
    let grid = grid_with(&[(0, 1)]);
    let cost = |slot| action_cost(&grid, &POSITIONS, &GOALS, Side::One, Action::Wall(slot));
    assert_eq!(cost(Pos::new(3, 2)), Some(1));
    assert_eq!(cost(Pos::new(1, 0)), None);
}

// =============================================================================
// validate_move
// =============================================================================

#[test]
fn two_step_relocation_is_legal() {
    let grid = Grid::new(5, 5);
    assert_eq!(
        validate_move(&grid, &POSITIONS, &GOALS, Side::One, &[Action::Ground(Pos::new(2, 2))]),
        Ok(())
    );
}

#[test]
fn step_plus_wall_is_legal() {
    let grid = Grid::new(5, 5);
    let actions = [Action::Ground(Pos::new(0, 2)), Action::Wall(Pos::new(3, 0))];
    assert_eq!(validate_move(&grid, &POSITIONS, &GOALS, Side::One, &actions), Ok(()));
}

#[test]
fn two_walls_are_legal() {
    let grid = Grid::new(5, 5);
    let actions = [Action::Wall(Pos::new(3, 0)), Action::Wall(Pos::new(3, 4))];
    assert_eq!(validate_move(&grid, &POSITIONS, &GOALS, Side::Two, &actions), Ok(()));
}

#[test]
fn long_relocation_plus_wall_exceeds_budget() {
    let grid = Grid::new(5, 5);
    let actions = [Action::Ground(Pos::new(2, 2)), Action::Wall(Pos::new(3, 0))];
    assert_eq!(
        validate_move(&grid, &POSITIONS, &GOALS, Side::One, &actions),
        Err(MoveError::OverBudget(3))
    );
}

#[test]
fn relocation_beyond_budget_is_rejected() {
    let grid = Grid::new(5, 5);
    assert_eq!(
        validate_move(&grid, &POSITIONS, &GOALS, Side::One, &[Action::Ground(Pos::new(4, 4))]),
        Err(MoveError::OverBudget(4))
    );
}

#[test]
fn second_wall_is_checked_with_first_built() {
    let grid = Grid::new(5, 5);
    let actions = [Action::Wall(Pos::new(0, 1)), Action::Wall(Pos::new(1, 0))];
    assert_eq!(
        validate_move(&grid, &POSITIONS, &GOALS, Side::Two, &actions),
        Err(MoveError::IllegalWall(Pos::new(1, 0)))
    );
}

#[test]
fn malformed_moves_are_rejected() {
    let grid = Grid::new(5, 5);
    assert_eq!(
        validate_move(&grid, &POSITIONS, &GOALS, Side::One, &[]),
        Err(MoveError::ActionCount(0))
    );
    let three = [
        Action::Wall(Pos::new(3, 0)),
        Action::Wall(Pos::new(3, 2)),
        Action::Wall(Pos::new(3, 4)),
    ];
    assert_eq!(
        validate_move(&grid, &POSITIONS, &GOALS, Side::One, &three),
        Err(MoveError::ActionCount(3))
    );
    let grounds = [Action::Ground(Pos::new(0, 2)), Action::Ground(Pos::new(2, 2))];
    assert_eq!(
        validate_move(&grid, &POSITIONS, &GOALS, Side::One, &grounds),
        Err(MoveError::MultipleGroundActions)
    );
    let dup = [Action::Wall(Pos::new(3, 0)), Action::Wall(Pos::new(3, 0))];
    assert_eq!(
        validate_move(&grid, &POSITIONS, &GOALS, Side::One, &dup),
        Err(MoveError::DuplicateTarget)
    );
    assert_eq!(
        validate_move(&grid, &POSITIONS, &GOALS, Side::One, &[Action::Ground(Pos::new(1, 1))]),
        Err(MoveError::NotGround(Pos::new(1, 1)))
    );
}

#[test]
fn apply_move_builds_walls_for_mover_and_relocates() {
    let mut grid = Grid::new(5, 5);
    let mut positions = POSITIONS;
    let actions = [Action::Ground(Pos::new(0, 2)), Action::Wall(Pos::new(3, 0))];
    apply_move(&mut grid, &mut positions, Side::One, &actions);
    assert_eq!(positions[0], Pos::new(0, 2));
    assert_eq!(positions[1], POSITIONS[1]);
    assert_eq!(grid.get(Pos::new(3, 0)), Some(WallCell::Built(Side::One)));
}

#[test]
fn action_serializes_with_tag() {
    let json = serde_json::to_value(Action::Wall(Pos::new(1, 2))).unwrap();
    assert_eq!(json, serde_json::json!({"type": "wall", "cell": [1, 2]}));
}
