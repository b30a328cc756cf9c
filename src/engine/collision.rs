use super::direction::Direction;
use super::grid::{Cell, Grid};
use super::snake::Snake;

/// What would happen if the snake moved one cell
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum MoveOutcome {
    /// The new head would be outside the grid
    WallDeath,
    /// The new head would land on the snake's own body
    SelfDeath,
    FoodEaten,
    Advance,
}

impl MoveOutcome {
    pub(crate) fn death_cause(self) -> Option<DeathCause> {
        match self {
            MoveOutcome::WallDeath => Some(DeathCause::Wall),
            MoveOutcome::SelfDeath => Some(DeathCause::SelfCollision),
            MoveOutcome::FoodEaten | MoveOutcome::Advance => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum DeathCause {
    Wall,
    SelfCollision,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Probe {
    pub(crate) outcome: MoveOutcome,
    /// The cell the head would move into
    pub(crate) head: Cell,
}

/// Classify moving `snake` one cell in `direction`.
///
/// The whole current body counts for self-collision, including the tail cell
/// that an ordinary move would vacate.
pub(crate) fn probe(snake: &Snake, direction: Direction, food: Option<Cell>, grid: Grid) -> Probe {
    let head = direction.advance(snake.head());
    let outcome = if !grid.is_inside(head) {
        MoveOutcome::WallDeath
    } else if snake.occupies(head) {
        MoveOutcome::SelfDeath
    } else if food == Some(head) {
        MoveOutcome::FoodEaten
    } else {
        MoveOutcome::Advance
    };
    Probe { outcome, head }
}
