//! Host-agnostic snake simulation shared by the local preview and the authoritative board.
use std::collections::VecDeque;

use log::{debug, info};
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::grid::{Cell, Direction, GRID_CELLS, GRID_HEIGHT, GRID_WIDTH};

/// Body every new game starts with, head first.
pub const START_BODY: [Cell; 3] = [Cell::new(10, 10), Cell::new(9, 10), Cell::new(8, 10)];
/// Direction every new game starts with.
pub const START_DIRECTION: Direction = Direction::Right;

/// Lifecycle of one board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Board visible but frozen.
    Idle,
    Playing,
    /// Terminal until [`SnakeSimulation::start`] or [`SnakeSimulation::reset`].
    GameOver,
}

/// Why a game ended. Returned by [`SnakeSimulation::advance`] on the tick the game ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOverReason {
    Wall,
    SelfCollision,
    /// The snake covers every cell so no food can be placed. This is the win condition.
    BoardFull,
}

impl std::fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameOverReason::Wall => write!(f, "hit the wall"),
            GameOverReason::SelfCollision => write!(f, "ran into itself"),
            GameOverReason::BoardFull => write!(f, "filled the board"),
        }
    }
}

/// Type of block that can be found on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnakeBlock {
    Empty,
    Food,
    SnakeBody,
    SnakeHead,
}

/// Read-only copy of a board handed to renderers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardSnapshot {
    /// Occupied cells, head first.
    pub body: Vec<Cell>,
    pub food: Cell,
    pub score: u32,
    pub phase: Phase,
}

impl BoardSnapshot {
    /// Rasterizes the snapshot into rows (`grid[y][x]`). Cells off the board are skipped.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn to_grid(&self) -> Vec<Vec<SnakeBlock>> {
        let mut grid = vec![vec![SnakeBlock::Empty; GRID_WIDTH as usize]; GRID_HEIGHT as usize];
        let mut mark = |cell: &Cell, block: SnakeBlock| {
            let (Ok(x), Ok(y)) = (usize::try_from(cell.x), usize::try_from(cell.y)) else {
                return;
            };
            if let Some(slot) = grid.get_mut(y).and_then(|row| row.get_mut(x)) {
                *slot = block;
            }
        };
        if self.phase != Phase::GameOver || !self.body.contains(&self.food) {
            mark(&self.food, SnakeBlock::Food);
        }
        for (i, cell) in self.body.iter().enumerate() {
            mark(
                cell,
                if i == 0 {
                    SnakeBlock::SnakeHead
                } else {
                    SnakeBlock::SnakeBody
                },
            );
        }
        grid
    }

    #[must_use]
    pub fn head(&self) -> Option<Cell> {
        self.body.first().copied()
    }
}

/// Model of a single snake board.
///
/// Time is measured in abstract units: wall-clock milliseconds for the local preview, server
/// ticks for the authoritative board. A move is committed every `move_interval` units.
#[derive(Clone, Debug)]
pub struct SnakeSimulation<R = StdRng> {
    body: VecDeque<Cell>,
    food: Cell,
    direction: Direction,
    pending_direction: Direction,
    score: u32,
    phase: Phase,
    accumulator: u64,
    move_interval: u64,
    rng: R,
}

impl SnakeSimulation<StdRng> {
    /// Creates a board driven by an entropy-seeded generator.
    #[must_use]
    pub fn new(move_interval: u64) -> Self {
        Self::with_rng(move_interval, StdRng::from_entropy())
    }

    /// Creates a board whose food placement is reproducible from `seed`.
    #[must_use]
    pub fn from_seed(move_interval: u64, seed: u64) -> Self {
        Self::with_rng(move_interval, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SnakeSimulation<R> {
    /// Creates a board in the [`Phase::Idle`] starting layout.
    /// A zero `move_interval` is treated as one.
    #[must_use]
    pub fn with_rng(move_interval: u64, rng: R) -> Self {
        let mut sim = Self {
            body: VecDeque::with_capacity(GRID_CELLS),
            food: START_BODY[0],
            direction: START_DIRECTION,
            pending_direction: START_DIRECTION,
            score: 0,
            phase: Phase::Idle,
            accumulator: 0,
            move_interval: move_interval.max(1),
            rng,
        };
        sim.reset();
        sim
    }

    /// Puts the board back into the starting layout and places fresh food.
    pub fn reset(&mut self) {
        self.body.clear();
        self.body.extend(START_BODY);
        self.direction = START_DIRECTION;
        self.pending_direction = START_DIRECTION;
        self.score = 0;
        self.phase = Phase::Idle;
        self.accumulator = 0;
        self.spawn_food();
        debug!("Board reset, food at {:?}", self.food);
    }

    /// Starts (or resumes) play. A finished game is reset first.
    pub fn start(&mut self) {
        if self.phase == Phase::GameOver {
            self.reset();
        }
        self.phase = Phase::Playing;
        self.accumulator = 0;
    }

    /// Freezes a running game. The board keeps its state.
    pub fn stop(&mut self) {
        if self.phase == Phase::Playing {
            self.phase = Phase::Idle;
        }
    }

    /// Requests `direction` for the next committed move. Last request before the move wins.
    pub fn queue_direction(&mut self, direction: Direction) {
        if self.phase != Phase::Playing {
            return;
        }
        if direction == self.direction.get_opposite() {
            debug!("Ignoring reversal from {} to {}", self.direction, direction);
            return;
        }
        self.pending_direction = direction;
    }

    /// Advances the clock by `elapsed` units and commits every move that became due.
    ///
    /// Returns the reason when this call ended the game. Time left over after a game over is
    /// discarded. Direction cannot change within one call so the loop always meets a wall
    /// within [`GRID_WIDTH`] moves.
    pub fn advance(&mut self, elapsed: u64) -> Option<GameOverReason> {
        if self.phase != Phase::Playing {
            return None;
        }
        self.accumulator = self.accumulator.saturating_add(elapsed);
        while self.accumulator >= self.move_interval {
            self.accumulator -= self.move_interval;
            if let Some(reason) = self.commit_move() {
                self.accumulator = 0;
                return Some(reason);
            }
        }
        None
    }

    /// Owned copy of everything a renderer needs.
    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            body: self.body.iter().copied().collect(),
            food: self.food,
            score: self.score,
            phase: self.phase,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Direction applied on the most recent move.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn pending_direction(&self) -> Direction {
        self.pending_direction
    }

    #[must_use]
    pub fn move_interval(&self) -> u64 {
        self.move_interval
    }

    #[must_use]
    pub fn food(&self) -> Cell {
        self.food
    }

    /// The body is never empty so the head always exists.
    #[must_use]
    pub fn head(&self) -> Cell {
        self.body[0]
    }

    fn commit_move(&mut self) -> Option<GameOverReason> {
        self.direction = self.pending_direction;
        let new_head = self.head().step(self.direction);

        if !new_head.in_bounds() {
            return Some(self.end_game(GameOverReason::Wall));
        }
        // the tail still counts as occupied even though it would move away this tick
        if self.body.contains(&new_head) {
            return Some(self.end_game(GameOverReason::SelfCollision));
        }

        self.body.push_front(new_head);
        if new_head == self.food {
            self.score += 1;
            debug!("Food eaten at {:?}, score {}", new_head, self.score);
            if self.body.len() >= GRID_CELLS {
                return Some(self.end_game(GameOverReason::BoardFull));
            }
            self.spawn_food();
        } else {
            self.body.pop_back();
        }
        None
    }

    fn end_game(&mut self, reason: GameOverReason) -> GameOverReason {
        info!("Game over: snake {} with score {}", reason, self.score);
        self.phase = Phase::GameOver;
        reason
    }

    /// Rejection-samples a free cell. Only called while at least one cell is free.
    fn spawn_food(&mut self) {
        debug_assert!(self.body.len() < GRID_CELLS, "no free cell for food");
        loop {
            let candidate = Cell::new(
                self.rng.gen_range(0..GRID_WIDTH),
                self.rng.gen_range(0..GRID_HEIGHT),
            );
            if !self.body.contains(&candidate) {
                self.food = candidate;
                return;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn set_food(&mut self, food: Cell) {
        self.food = food;
    }

    #[cfg(test)]
    pub(crate) fn set_body(&mut self, body: &[Cell], direction: Direction) {
        self.body = body.iter().copied().collect();
        self.direction = direction;
        self.pending_direction = direction;
    }
}
