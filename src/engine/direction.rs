use super::grid::Cell;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Return the change in `(x, y)` produced by moving one cell in this
    /// direction.  `y` grows downwards.
    pub(crate) fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Return the cell one step from `cell` in this direction.  The result is
    /// not checked against any bounds.
    pub(crate) fn advance(self, cell: Cell) -> Cell {
        self.advance_by(cell, 1)
    }

    pub(crate) fn advance_by(self, cell: Cell, distance: i32) -> Cell {
        let (dx, dy) = self.delta();
        Cell::new(cell.x + dx * distance, cell.y + dy * distance)
    }

    pub(crate) fn reverse(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Direction::Up, Cell::new(2, 7), Cell::new(2, 6))]
    #[case(Direction::Down, Cell::new(2, 7), Cell::new(2, 8))]
    #[case(Direction::Left, Cell::new(2, 7), Cell::new(1, 7))]
    #[case(Direction::Right, Cell::new(2, 7), Cell::new(3, 7))]
    #[case(Direction::Up, Cell::new(2, 0), Cell::new(2, -1))]
    #[case(Direction::Left, Cell::new(0, 7), Cell::new(-1, 7))]
    #[case(Direction::Right, Cell::new(19, 7), Cell::new(20, 7))]
    fn test_direction_advance(#[case] d: Direction, #[case] cell: Cell, #[case] r: Cell) {
        assert_eq!(d.advance(cell), r);
    }

    #[rstest]
    #[case(Direction::Up)]
    #[case(Direction::Down)]
    #[case(Direction::Left)]
    #[case(Direction::Right)]
    fn reverse_undoes_advance(#[case] d: Direction) {
        let start = Cell::new(10, 10);
        assert_ne!(d.reverse(), d);
        assert_eq!(d.reverse().reverse(), d);
        assert_eq!(d.reverse().advance(d.advance(start)), start);
    }

    #[test]
    fn advance_by_distance() {
        assert_eq!(
            Direction::Down.advance_by(Cell::new(4, 4), 5),
            Cell::new(4, 9)
        );
        assert_eq!(
            Direction::Left.advance_by(Cell::new(4, 4), 5),
            Cell::new(-1, 4)
        );
    }
}
