//! Bringing a dead snake back: where it reappears and what its body looks like
use super::collision::DeathCause;
use super::direction::Direction;
use super::grid::{Cell, Grid};
use super::snake::Snake;
use crate::consts;

/// The state of the snake at the moment it died, captured once per death
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct DeathRecord {
    /// Position of the head just before the fatal move
    pub(crate) head: Cell,

    /// Direction of the fatal move
    pub(crate) direction: Direction,

    /// Number of cells in the snake when it died
    pub(crate) length: usize,

    /// The snake's cells when it died, head first
    pub(crate) body: Vec<Cell>,

    pub(crate) cause: DeathCause,
}

impl DeathRecord {
    pub(crate) fn capture(snake: &Snake, cause: DeathCause) -> DeathRecord {
        let body = snake.cells().collect::<Vec<_>>();
        DeathRecord {
            head: snake.head(),
            direction: snake.direction(),
            length: body.len(),
            body,
            cause,
        }
    }
}

/// A rebuilt snake, ready to be put back into play
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Revival {
    pub(crate) head: Cell,
    /// All cells of the new snake, head first
    pub(crate) body: Vec<Cell>,
    pub(crate) direction: Direction,
}

/// Compute where a snake that died at `head` while moving in `direction`
/// should reappear: [`REVIVAL_DISTANCE`][consts::REVIVAL_DISTANCE] cells back
/// the way it came, kept [`REVIVAL_MARGIN`][consts::REVIVAL_MARGIN] cells
/// away from every wall.
pub(crate) fn revival_head(head: Cell, direction: Direction, grid: Grid) -> Cell {
    let retreat = direction
        .reverse()
        .advance_by(head, consts::REVIVAL_DISTANCE);
    grid.clamp_interior(retreat, consts::REVIVAL_MARGIN)
}

/// Rebuild the snake described by `death`: a straight line of the same
/// length, headed the same way, with its head at the revival cell.
///
/// Cells at the far end of a long snake may fall outside the grid; they come
/// onto the board as the snake moves forwards.
pub(crate) fn reconstruct(death: &DeathRecord, grid: Grid) -> Revival {
    let head = revival_head(death.head, death.direction, grid);
    let behind = death.direction.reverse();
    let body = std::iter::successors(Some(head), |&c| Some(behind.advance(c)))
        .take(death.length)
        .collect();
    Revival {
        head,
        body,
        direction: death.direction,
    }
}
