//! Coordinates and directions of the fixed snake board.

/// Number of columns on the board.
pub const GRID_WIDTH: i32 = 20;
/// Number of rows on the board.
pub const GRID_HEIGHT: i32 = 20;
/// Total number of cells on the board.
// both dimensions are small positive constants
#[allow(clippy::cast_sign_loss)]
pub const GRID_CELLS: usize = (GRID_WIDTH * GRID_HEIGHT) as usize;

/// A single square of the board. The y-axis grows downwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns true if the cell lies inside the board.
    #[must_use]
    pub fn in_bounds(self) -> bool {
        (0..GRID_WIDTH).contains(&self.x) && (0..GRID_HEIGHT).contains(&self.y)
    }

    /// The neighbouring cell one step in `direction`. May be off the board.
    #[must_use]
    pub fn step(self, direction: Direction) -> Cell {
        let (dx, dy) = direction.value();
        Cell::new(self.x + dx, self.y + dy)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Cell::new(x, y)
    }
}

/// Direction the snake can travel in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    pub const VARIANTS: &'static [Direction] = &[Self::Right, Self::Down, Self::Left, Self::Up];

    /// Offset of one step as `(dx, dy)`.
    #[must_use]
    pub fn value(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Up => (0, -1),
        }
    }

    #[must_use]
    pub fn get_opposite(self) -> Direction {
        match self {
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Up => Direction::Down,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Right => write!(f, "right"),
            Direction::Down => write!(f, "down"),
            Direction::Left => write!(f, "left"),
            Direction::Up => write!(f, "up"),
        }
    }
}
