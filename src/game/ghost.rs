//! Ghost and premove selection state machines.
//!
//! DESIGN
//! ======
//! A move is assembled one click at a time. The side on turn drives a
//! `Ghost`: a single pending action that either completes into a committed
//! move or is cancelled. The side waiting for its turn drives a `Premove`:
//! a queue of up to one relocation and two walls, replayed through a fresh
//! `Ghost` the instant the opponent's move lands.
//!
//! Illegal selections never change state and never surface an error; the
//! caller just sees `Selection::Ignored`. Committed moves still go through
//! the authoritative `legality::validate_move` on the server.

use super::board::{Grid, Pos, Side, WallCell};
use super::legality::{ACTION_BUDGET, Action, action_cost, can_build_wall};

/// The committed board as seen by the selecting side.
#[derive(Debug, Clone, Copy)]
pub struct BoardView<'a> {
    pub grid: &'a Grid,
    pub positions: [Pos; 2],
    pub goals: [Pos; 2],
    pub mover: Side,
}

impl BoardView<'_> {
    fn cost(&self, action: Action) -> Option<u32> {
        action_cost(self.grid, &self.positions, &self.goals, self.mover, action)
    }

    fn own_cell(&self) -> Pos {
        self.positions[self.mover.index()]
    }
}

/// Result of feeding one click to a state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Ignored,
    Updated,
    Committed(Vec<Action>),
}

// =============================================================================
// GHOST
// =============================================================================

/// Pending partial move for the side on turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Ghost {
    #[default]
    None,
    PendingWall(Pos),
    PendingGround(Pos),
}

impl Ghost {
    pub fn select(&mut self, view: &BoardView<'_>, target: Action) -> Selection {
        match (*self, target) {
            (Ghost::None, Action::Wall(slot)) => {
                if view.cost(target).is_none() {
                    return Selection::Ignored;
                }
                *self = Ghost::PendingWall(slot);
                Selection::Updated
            }
            (Ghost::None, Action::Ground(cell)) => match view.cost(target) {
                Some(1) => {
                    *self = Ghost::PendingGround(cell);
                    Selection::Updated
                }
                Some(ACTION_BUDGET) => self.commit(vec![target]),
                _ => Selection::Ignored,
            },
            (Ghost::PendingWall(pending), Action::Wall(slot)) if pending == slot => self.cancel(),
            (Ghost::PendingWall(pending), _) => {
                let mut grid = view.grid.clone();
                grid.set(pending, WallCell::Built(view.mover));
                let after = BoardView { grid: &grid, ..*view };
                if after.cost(target) == Some(1) {
                    self.commit(vec![Action::Wall(pending), target])
                } else {
                    Selection::Ignored
                }
            }
            (Ghost::PendingGround(pending), Action::Ground(cell)) if pending == cell => self.cancel(),
            (Ghost::PendingGround(_), Action::Ground(cell)) => match view.cost(target) {
                Some(0) => self.cancel(),
                Some(1) => {
                    *self = Ghost::PendingGround(cell);
                    Selection::Updated
                }
                Some(ACTION_BUDGET) => self.commit(vec![target]),
                _ => Selection::Ignored,
            },
            (Ghost::PendingGround(pending), Action::Wall(slot)) => {
                let mut positions = view.positions;
                positions[view.mover.index()] = pending;
                if can_build_wall(view.grid, &positions, &view.goals, slot) {
                    self.commit(vec![Action::Ground(pending), target])
                } else {
                    Selection::Ignored
                }
            }
        }
    }

    fn cancel(&mut self) -> Selection {
        *self = Ghost::None;
        Selection::Updated
    }

    fn commit(&mut self, actions: Vec<Action>) -> Selection {
        *self = Ghost::None;
        Selection::Committed(actions)
    }
}

// =============================================================================
// PREMOVE
// =============================================================================

/// Actions queued by the side waiting for its turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Premove {
    ground: Option<(Pos, u32)>,
    walls: Vec<Pos>,
}

impl Premove {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ground.is_none() && self.walls.is_empty()
    }

    #[must_use]
    pub fn ground(&self) -> Option<Pos> {
        self.ground.map(|(p, _)| p)
    }

    #[must_use]
    pub fn walls(&self) -> &[Pos] {
        &self.walls
    }

    fn wall_cost(&self) -> u32 {
        u32::try_from(self.walls.len()).unwrap_or(u32::MAX)
    }

    fn spent(&self) -> u32 {
        self.ground.map_or(0, |(_, cost)| cost) + self.wall_cost()
    }

    pub fn clear(&mut self) {
        self.ground = None;
        self.walls.clear();
    }

    /// Queue or unqueue an action. Legality is judged against the committed
    /// board, not the opponent's in-flight ghost.
    pub fn select(&mut self, view: &BoardView<'_>, target: Action) -> Selection {
        match target {
            Action::Ground(cell) if cell == view.own_cell() => {
                if self.is_empty() {
                    return Selection::Ignored;
                }
                self.clear();
                Selection::Updated
            }
            Action::Ground(cell) if self.ground() == Some(cell) => {
                self.ground = None;
                Selection::Updated
            }
            Action::Ground(cell) => {
                match view.cost(target) {
                    Some(cost) if cost > 0 && cost + self.wall_cost() <= ACTION_BUDGET => {
                        self.ground = Some((cell, cost));
                        Selection::Updated
                    }
                    _ => Selection::Ignored,
                }
            }
            Action::Wall(slot) if self.walls.contains(&slot) => {
                self.walls.retain(|w| *w != slot);
                Selection::Updated
            }
            Action::Wall(slot) => {
                if self.spent() + 1 > ACTION_BUDGET || view.cost(target).is_none() {
                    return Selection::Ignored;
                }
                self.walls.push(slot);
                Selection::Updated
            }
        }
    }

    /// Replay the queue through a fresh ghost once the turn passes to us.
    /// Actions that became illegal are dropped. Returns the ghost left behind
    /// and the move it committed, if any.
    #[must_use]
    pub fn replay(self, view: &BoardView<'_>) -> (Ghost, Option<Vec<Action>>) {
        let mut ghost = Ghost::None;
        let queued = self
            .walls
            .iter()
            .map(|w| Action::Wall(*w))
            .chain(self.ground.map(|(p, _)| Action::Ground(p)));
        for action in queued {
            if let Selection::Committed(actions) = ghost.select(view, action) {
                return (Ghost::None, Some(actions));
            }
        }
        (ghost, None)
    }
}

#[cfg(test)]
#[path = "ghost_test.rs"]
mod tests;
