use super::snake::Snake;
use crate::consts;
use rand::{seq::IteratorRandom, Rng};

/// A square on the playing field.  `(0, 0)` is the top-left corner.
///
/// Coordinates are signed so that cells just past an edge can be represented
/// (e.g., the would-be head of a snake about to hit a wall).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct Cell {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

impl Cell {
    pub(crate) const fn new(x: i32, y: i32) -> Cell {
        Cell { x, y }
    }
}

/// Dimensions of the playing field
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Grid {
    pub(crate) width: i32,
    pub(crate) height: i32,
}

impl Grid {
    pub(crate) const fn square(size: i32) -> Grid {
        Grid {
            width: size,
            height: size,
        }
    }

    pub(crate) fn is_inside(self, cell: Cell) -> bool {
        (0..self.width).contains(&cell.x) && (0..self.height).contains(&cell.y)
    }

    /// Iterate over every cell in the grid, row by row
    pub(crate) fn cells(self) -> impl Iterator<Item = Cell> {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Cell::new(x, y)))
    }

    /// Move `cell` onto the nearest cell that is at least `margin` cells away
    /// from every edge
    pub(crate) fn clamp_interior(self, cell: Cell, margin: i32) -> Cell {
        Cell::new(
            cell.x.max(margin).min(self.width - 1 - margin),
            cell.y.max(margin).min(self.height - 1 - margin),
        )
    }

    fn random_cell<R: Rng + ?Sized>(self, rng: &mut R) -> Cell {
        Cell::new(
            rng.random_range(0..self.width),
            rng.random_range(0..self.height),
        )
    }

    /// Choose a cell for food that the snake does not occupy.  Random cells
    /// are tried a bounded number of times; after that, a free cell is picked
    /// uniformly from all the free cells.  Returns `None` if the snake fills
    /// the whole grid.
    pub(crate) fn place_food<R: Rng + ?Sized>(self, snake: &Snake, rng: &mut R) -> Option<Cell> {
        for _ in 0..consts::FOOD_PLACEMENT_RETRIES {
            let cell = self.random_cell(rng);
            if !snake.occupies(cell) {
                return Some(cell);
            }
        }
        self.cells().filter(|&c| !snake.occupies(c)).choose(rng)
    }
}

impl Default for Grid {
    fn default() -> Grid {
        Grid::square(consts::GRID_SIZE)
    }
}
