use super::direction::Direction;
use super::grid::Cell;
use crate::consts;
use std::collections::VecDeque;

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Snake {
    /// The cells of the snake, head first
    body: VecDeque<Cell>,

    /// The direction in which the snake will move on the next tick
    direction: Direction,

    /// The direction in which the snake last moved
    moved: Direction,
}

impl Snake {
    /// The snake every game starts with: three cells in row 5 with the head
    /// at `(5, 5)`, heading right
    pub(crate) fn initial() -> Snake {
        Snake::straight(
            Cell::new(5, 5),
            Direction::Right,
            consts::INITIAL_SNAKE_LENGTH,
        )
    }

    /// Create a snake of `length` cells in a straight line, with its head at
    /// `head` and its body trailing behind it so that it faces `direction`
    pub(crate) fn straight(head: Cell, direction: Direction, length: usize) -> Snake {
        let behind = direction.reverse();
        Snake::from_cells(
            std::iter::successors(Some(head), |&c| Some(behind.advance(c))).take(length),
            direction,
        )
    }

    pub(crate) fn from_cells<I: IntoIterator<Item = Cell>>(cells: I, direction: Direction) -> Snake {
        Snake {
            body: cells.into_iter().collect(),
            direction,
            moved: direction,
        }
    }

    /// Return the position of the snake's head
    pub(crate) fn head(&self) -> Cell {
        *self.body.front().expect("snake should never be empty")
    }

    pub(crate) fn direction(&self) -> Direction {
        self.direction
    }

    pub(crate) fn len(&self) -> usize {
        self.body.len()
    }

    /// Iterate over the snake's cells, head first
    pub(crate) fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.body.iter().copied()
    }

    pub(crate) fn occupies(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Change the snake's direction to `direction`, unless that would send it
    /// straight back into itself.  Returns `false` if the turn was rejected.
    pub(crate) fn turn(&mut self, direction: Direction) -> bool {
        if direction == self.direction.reverse() || direction == self.moved.reverse() {
            return false;
        }
        self.direction = direction;
        true
    }

    /// Move the head onto `head`, which must be adjacent to the current head
    /// in the current direction.  Unless `grow` is true, the tail moves up as
    /// well.
    pub(crate) fn advance(&mut self, head: Cell, grow: bool) {
        self.body.push_front(head);
        if !grow {
            let _ = self.body.pop_back();
        }
        self.moved = self.direction;
    }
}
