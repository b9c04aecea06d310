use super::*;
use crate::game::legality::validate_move;

const GOALS: [Pos; 2] = [Pos::new(4, 4), Pos::new(4, 0)];

fn view(grid: &Grid, mover: Side) -> BoardView<'_> {
    BoardView { grid, positions: [Pos::new(0, 0), Pos::new(0, 4)], goals: GOALS, mover }
}

fn ground(r: i32, c: i32) -> Action {
    Action::Ground(Pos::new(r, c))
}

fn wall(r: i32, c: i32) -> Action {
    Action::Wall(Pos::new(r, c))
}

// =============================================================================
// Ghost
// =============================================================================

#[test]
fn one_step_enters_pending_ground() {
    let grid = Grid::new(5, 5);
    let mut ghost = Ghost::None;
    assert_eq!(ghost.select(&view(&grid, Side::One), ground(0, 2)), Selection::Updated);
    assert_eq!(ghost, Ghost::PendingGround(Pos::new(0, 2)));
}

#[test]
fn two_steps_from_none_commits_single_action() {
    let grid = Grid::new(5, 5);
    let mut ghost = Ghost::None;
    assert_eq!(
        ghost.select(&view(&grid, Side::One), ground(2, 2)),
        Selection::Committed(vec![ground(2, 2)])
    );
    assert_eq!(ghost, Ghost::None);
}

#[test]
fn reselecting_pending_cancels() {
    let grid = Grid::new(5, 5);
    let v = view(&grid, Side::One);

    let mut ghost = Ghost::None;
    ghost.select(&v, wall(3, 0));
    assert_eq!(ghost, Ghost::PendingWall(Pos::new(3, 0)));
    assert_eq!(ghost.select(&v, wall(3, 0)), Selection::Updated);
    assert_eq!(ghost, Ghost::None);

    ghost.select(&v, ground(2, 0));
    assert_eq!(ghost.select(&v, ground(2, 0)), Selection::Updated);
    assert_eq!(ghost, Ghost::None);
}

#[test]
fn pending_ground_budget_rules() {
    let grid = Grid::new(5, 5);
    let v = view(&grid, Side::One);
    let mut ghost = Ghost::PendingGround(Pos::new(0, 2));

    // Cost 1 from the committed cell: replace.
    assert_eq!(ghost.select(&v, ground(2, 0)), Selection::Updated);
    assert_eq!(ghost, Ghost::PendingGround(Pos::new(2, 0)));

    // Cost 0 (own cell): clear.
    assert_eq!(ghost.select(&v, ground(0, 0)), Selection::Updated);
    assert_eq!(ghost, Ghost::None);

    // Cost 2: commit a single relocation.
    let mut ghost = Ghost::PendingGround(Pos::new(0, 2));
    assert_eq!(ghost.select(&v, ground(0, 4)), Selection::Committed(vec![ground(0, 4)]));
}

#[test]
fn wall_then_wall_commits_both() {
    let grid = Grid::new(5, 5);
    let v = view(&grid, Side::One);
    let mut ghost = Ghost::PendingWall(Pos::new(3, 0));
    assert_eq!(
        ghost.select(&v, wall(3, 4)),
        Selection::Committed(vec![wall(3, 0), wall(3, 4)])
    );
}

#[test]
fn pending_ground_then_wall_commits_in_order() {
    let grid = Grid::new(5, 5);
    let v = view(&grid, Side::One);
    let mut ghost = Ghost::PendingGround(Pos::new(0, 2));
    let Selection::Committed(actions) = ghost.select(&v, wall(3, 0)) else {
        panic!("expected commit");
    };
    assert_eq!(actions, vec![ground(0, 2), wall(3, 0)]);
    assert!(validate_move(&grid, &v.positions, &GOALS, Side::One, &actions).is_ok());
}

#[test]
fn selection_over_budget_is_ignored() {
    let grid = Grid::new(5, 5);
    let v = view(&grid, Side::One);

    let mut ghost = Ghost::None;
    assert_eq!(ghost.select(&v, ground(4, 4)), Selection::Ignored);
    assert_eq!(ghost, Ghost::None);

    let mut ghost = Ghost::PendingWall(Pos::new(3, 0));
    assert_eq!(ghost.select(&v, ground(2, 2)), Selection::Ignored);
    assert_eq!(ghost, Ghost::PendingWall(Pos::new(3, 0)));
}

#[test]
fn second_wall_that_would_strand_is_ignored() {
    let grid = Grid::new(5, 5);
    let v = view(&grid, Side::One);
    let mut ghost = Ghost::PendingWall(Pos::new(0, 1));
    assert_eq!(ghost.select(&v, wall(1, 0)), Selection::Ignored);
    assert_eq!(ghost, Ghost::PendingWall(Pos::new(0, 1)));
}

// =============================================================================
// Premove
// =============================================================================

#[test]
fn premove_accumulates_within_budget() {
    let grid = Grid::new(5, 5);
    let v = view(&grid, Side::Two);
    let mut pre = Premove::default();

    assert_eq!(pre.select(&v, wall(3, 0)), Selection::Updated);
    assert_eq!(pre.select(&v, ground(0, 2)), Selection::Updated);
    assert_eq!(pre.ground(), Some(Pos::new(0, 2)));
    assert_eq!(pre.walls(), &[Pos::new(3, 0)]);

    // Budget full: another wall is ignored.
    assert_eq!(pre.select(&v, wall(3, 4)), Selection::Ignored);
    assert_eq!(pre.walls().len(), 1);
}

#[test]
fn premove_two_walls_then_ground_is_ignored() {
    let grid = Grid::new(5, 5);
    let v = view(&grid, Side::Two);
    let mut pre = Premove::default();
    pre.select(&v, wall(3, 0));
    pre.select(&v, wall(3, 4));
    assert_eq!(pre.select(&v, ground(2, 4)), Selection::Ignored);
    assert_eq!(pre.ground(), None);
}

#[test]
fn selecting_own_cell_clears_premove() {
    let grid = Grid::new(5, 5);
    let v = view(&grid, Side::Two);
    let mut pre = Premove::default();
    pre.select(&v, wall(3, 0));
    pre.select(&v, ground(2, 4));
    assert_eq!(pre.select(&v, ground(0, 4)), Selection::Updated);
    assert!(pre.is_empty());
}

#[test]
fn premove_replays_into_commit() {
    let grid = Grid::new(5, 5);
    let v = view(&grid, Side::Two);
    let mut pre = Premove::default();
    pre.select(&v, wall(3, 0));
    pre.select(&v, ground(2, 4));

    let (ghost, committed) = pre.replay(&v);
    assert_eq!(ghost, Ghost::None);
    assert_eq!(committed, Some(vec![wall(3, 0), ground(2, 4)]));
}

#[test]
fn premove_replay_drops_actions_made_illegal() {
    let grid = Grid::new(5, 5);
    let v = view(&grid, Side::Two);
    let mut pre = Premove::default();
    pre.select(&v, wall(3, 0));
    pre.select(&v, ground(2, 4));

    // The opponent built the same slot meanwhile.
    let mut after = grid.clone();
    after.set(Pos::new(3, 0), WallCell::Built(Side::One));
    let (ghost, committed) = pre.replay(&view(&after, Side::Two));
    assert_eq!(committed, None);
    assert_eq!(ghost, Ghost::PendingGround(Pos::new(2, 4)));
}
