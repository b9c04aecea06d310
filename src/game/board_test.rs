use super::*;

fn built(grid: &mut Grid, slots: &[(i32, i32)]) {
    for &(r, c) in slots {
        grid.set(Pos::new(r, c), WallCell::Built(Side::One));
    }
}

// =============================================================================
// cell_type
// =============================================================================

#[test]
fn cell_type_follows_parity() {
    assert_eq!(cell_type(Pos::new(0, 0)), CellType::Ground);
    assert_eq!(cell_type(Pos::new(4, 2)), CellType::Ground);
    assert_eq!(cell_type(Pos::new(0, 1)), CellType::Wall);
    assert_eq!(cell_type(Pos::new(3, 2)), CellType::Wall);
    assert_eq!(cell_type(Pos::new(1, 1)), CellType::Pillar);
    assert_eq!(cell_type(Pos::new(5, 3)), CellType::Pillar);
}

// =============================================================================
// neighbors
// =============================================================================

#[test]
fn corner_has_two_neighbors() {
    let grid = Grid::new(5, 5);
    let mut n = neighbors(&grid, Pos::new(0, 0));
    n.sort_by_key(|p| (p.row, p.col));
    assert_eq!(n, vec![Pos::new(0, 2), Pos::new(2, 0)]);
}

#[test]
fn center_has_four_neighbors() {
    let grid = Grid::new(5, 5);
    assert_eq!(neighbors(&grid, Pos::new(2, 2)).len(), 4);
}

#[test]
fn built_wall_removes_edge() {
    let mut grid = Grid::new(5, 5);
    built(&mut grid, &[(2, 3)]);
    let n = neighbors(&grid, Pos::new(2, 2));
    assert_eq!(n.len(), 3);
    assert!(!n.contains(&Pos::new(2, 4)));
}

#[test]
fn non_ground_has_no_neighbors() {
    let grid = Grid::new(5, 5);
    assert!(neighbors(&grid, Pos::new(0, 1)).is_empty());
    assert!(neighbors(&grid, Pos::new(1, 1)).is_empty());
    assert!(neighbors(&grid, Pos::new(-2, 0)).is_empty());
}

// =============================================================================
// distance
// =============================================================================

#[test]
fn empty_grid_distance_is_half_manhattan() {
    let grid = Grid::new(7, 9);
    for r1 in (0i32..7).step_by(2) {
        for c1 in (0i32..9).step_by(2) {
            for r2 in (0i32..7).step_by(2) {
                for c2 in (0i32..9).step_by(2) {
                    let expected = u32::try_from(((r1 - r2).abs() + (c1 - c2).abs()) / 2).unwrap();
                    assert_eq!(
                        distance(&grid, Pos::new(r1, c1), Pos::new(r2, c2)),
                        Some(expected),
                        "({r1},{c1}) -> ({r2},{c2})"
                    );
                }
            }
        }
    }
}

#[test]
fn walls_force_a_detour() {
    // Block the direct path east from (0,0) to (0,2).
    let mut grid = Grid::new(5, 5);
    built(&mut grid, &[(0, 1)]);
    assert_eq!(distance(&grid, Pos::new(0, 0), Pos::new(0, 2)), Some(3));
}

#[test]
fn enclosed_cell_is_unreachable() {
    let mut grid = Grid::new(5, 5);
    built(&mut grid, &[(0, 1), (1, 0)]);
    assert_eq!(distance(&grid, Pos::new(0, 0), Pos::new(4, 4)), None);
    assert_eq!(distance(&grid, Pos::new(4, 4), Pos::new(0, 0)), None);
}

#[test]
fn distance_to_self_is_zero() {
    let grid = Grid::new(3, 3);
    assert_eq!(distance(&grid, Pos::new(2, 2), Pos::new(2, 2)), Some(0));
}

#[test]
fn distance_from_wall_slot_is_unreachable() {
    let grid = Grid::new(5, 5);
    assert_eq!(distance(&grid, Pos::new(0, 1), Pos::new(0, 2)), None);
}

// =============================================================================
// reachable_within
// =============================================================================

#[test]
fn reachable_within_respects_bound() {
    let grid = Grid::new(9, 9);
    let start = Pos::new(0, 0);
    assert!(reachable_within(&grid, start, Pos::new(0, 4), 2));
    assert!(reachable_within(&grid, start, Pos::new(2, 2), 2));
    assert!(!reachable_within(&grid, start, Pos::new(0, 6), 2));
    assert!(reachable_within(&grid, start, Pos::new(0, 6), 3));
}

#[test]
fn reachable_within_agrees_with_distance_behind_walls() {
    let mut grid = Grid::new(5, 5);
    built(&mut grid, &[(0, 1)]);
    let (a, b) = (Pos::new(0, 0), Pos::new(0, 2));
    assert!(!reachable_within(&grid, a, b, 2));
    assert!(reachable_within(&grid, a, b, 3));
}

// =============================================================================
// Grid / BoardSettings
// =============================================================================

#[test]
fn wall_count_is_per_side() {
    let mut grid = Grid::new(5, 5);
    grid.set(Pos::new(0, 1), WallCell::Built(Side::One));
    grid.set(Pos::new(1, 0), WallCell::Built(Side::One));
    grid.set(Pos::new(3, 4), WallCell::Built(Side::Two));
    assert_eq!(grid.wall_count(Side::One), 2);
    assert_eq!(grid.wall_count(Side::Two), 1);
}

#[test]
fn out_of_bounds_access_is_ignored() {
    let mut grid = Grid::new(3, 3);
    grid.set(Pos::new(5, 5), WallCell::Built(Side::One));
    assert_eq!(grid.get(Pos::new(5, 5)), None);
    assert_eq!(grid.wall_count(Side::One), 0);
}

#[test]
fn default_settings_are_valid() {
    assert!(BoardSettings::default().validate().is_ok());
}

#[test]
fn even_dimensions_are_rejected() {
    let settings = BoardSettings { dims: [12, 13], ..BoardSettings::default() };
    assert!(settings.validate().is_err());
}

#[test]
fn goal_on_wall_slot_is_rejected() {
    let mut settings = BoardSettings::default();
    settings.goal_pos[0] = Pos::new(12, 11);
    assert!(settings.validate().is_err());
}

#[test]
fn pos_serializes_as_pair() {
    let json = serde_json::to_string(&Pos::new(3, 4)).unwrap();
    assert_eq!(json, "[3,4]");
    let back: Pos = serde_json::from_str("[6,8]").unwrap();
    assert_eq!(back, Pos::new(6, 8));
}

#[test]
fn side_helpers() {
    assert_eq!(Side::One.other(), Side::Two);
    assert_eq!(Side::Two.index(), 1);
    assert_eq!(Side::from_index(0), Some(Side::One));
    assert_eq!(Side::from_index(2), None);
    assert_eq!(serde_json::to_string(&Side::Two).unwrap(), "\"side2\"");
}
