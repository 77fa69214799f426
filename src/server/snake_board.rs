//! Authoritative board entity: driven by a player's last networked input every server tick and
//! rendered as net objects every snapshot.
use rand::{rngs::StdRng, Rng};

use crate::models::snake::{
    board_host::{drive, BoardHost},
    board_input::{ActivationEdge, BoardInput},
    grid::{Cell, Direction, GRID_CELLS, GRID_HEIGHT, GRID_WIDTH},
    snake_simulation::{BoardSnapshot, GameOverReason, SnakeSimulation},
};

use super::id_allocator::{IdBlock, NetId};

/// Server ticks per second.
pub const TICKS_PER_SECOND: u64 = 50;
/// Server ticks between two snake moves (5 moves per second).
pub const MOVE_INTERVAL_TICKS: u64 = 10;
/// How close the owner must stand to hit the board with the hammer.
pub const INTERACTION_RADIUS: f32 = 200.0;
/// World units per board cell.
pub const CELL_SIZE: f32 = 32.0;
/// Sent to the owner when their game ends.
pub const GAME_OVER_BROADCAST: &str = "Game Over! Hit with Hammer to restart.";
/// Border lasers + food + one pickup per cell the snake can cover.
// GRID_CELLS is 400
#[allow(clippy::cast_possible_truncation)]
pub const BOARD_ID_BLOCK: u32 = 4 + 1 + GRID_CELLS as u32;

pub type PlayerId = usize;

/// Tunables of the authoritative board.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ServerParams {
    pub ticks_per_second: u64,
    pub move_interval_ticks: u64,
    pub interaction_radius: f32,
    pub cell_size: f32,
}

impl Default for ServerParams {
    fn default() -> Self {
        Self {
            ticks_per_second: TICKS_PER_SECOND,
            move_interval_ticks: MOVE_INTERVAL_TICKS,
            interaction_radius: INTERACTION_RADIUS,
            cell_size: CELL_SIZE,
        }
    }
}

/// Point in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(self, other: Position) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Weapon {
    #[default]
    Hammer,
    Gun,
    Shotgun,
    Grenade,
    Laser,
}

/// Last input a player transmitted.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerInput {
    /// -1 left, 0 none, 1 right.
    pub direction: i32,
    pub jump: bool,
    pub hook: bool,
    pub fire: bool,
    pub weapon: Weapon,
    pub position: Position,
}

impl PlayerInput {
    /// Left/right come from walking, up from jump, down from hook, in that priority.
    #[must_use]
    pub fn directional_intent(&self) -> Option<Direction> {
        if self.direction < 0 {
            Some(Direction::Left)
        } else if self.direction > 0 {
            Some(Direction::Right)
        } else if self.jump {
            Some(Direction::Up)
        } else if self.hook {
            Some(Direction::Down)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_hammering(&self) -> bool {
        self.fire && self.weapon == Weapon::Hammer
    }

    #[must_use]
    pub fn to_board_input(&self) -> BoardInput {
        BoardInput::new(self.directional_intent(), self.is_hammering())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickupKind {
    Health,
    Armor,
}

/// Object the server puts into a client snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NetObject {
    Laser {
        id: NetId,
        from: Position,
        to: Position,
        start_tick: u64,
    },
    Pickup {
        id: NetId,
        position: Position,
        kind: PickupKind,
    },
}

impl NetObject {
    #[must_use]
    pub fn id(&self) -> NetId {
        match self {
            NetObject::Laser { id, .. } | NetObject::Pickup { id, .. } => *id,
        }
    }
}

/// A board placed in the world and played by its owner.
#[derive(Debug)]
pub struct AuthoritativeBoard<R = StdRng> {
    sim: SnakeSimulation<R>,
    edge: ActivationEdge,
    owner: PlayerId,
    position: Position,
    owner_position: Position,
    ids: IdBlock,
    params: ServerParams,
    server_tick: u64,
}

impl AuthoritativeBoard<StdRng> {
    #[must_use]
    pub fn new(owner: PlayerId, position: Position, ids: IdBlock, params: ServerParams) -> Self {
        Self::with_simulation(
            owner,
            position,
            ids,
            params,
            SnakeSimulation::new(params.move_interval_ticks),
        )
    }
}

impl<R: Rng> AuthoritativeBoard<R> {
    /// Wraps an existing simulation. The simulation is reset to its starting layout.
    #[must_use]
    pub fn with_simulation(
        owner: PlayerId,
        position: Position,
        ids: IdBlock,
        params: ServerParams,
        mut sim: SnakeSimulation<R>,
    ) -> Self {
        debug_assert!(ids.len() >= BOARD_ID_BLOCK, "id block too small for a board");
        sim.reset();
        Self {
            sim,
            edge: ActivationEdge::default(),
            owner,
            position,
            owner_position: position,
            ids,
            params,
            server_tick: 0,
        }
    }

    /// Applies one server tick of the owner's latest input.
    pub fn apply_player_input(&mut self, input: &PlayerInput) -> Option<GameOverReason> {
        self.owner_position = input.position;
        self.tick(input.to_board_input(), 1)
    }

    #[must_use]
    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn ids(&self) -> IdBlock {
        self.ids
    }

    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        self.sim.snapshot()
    }

    fn owner_in_range(&self) -> bool {
        self.owner_position.distance(self.position) < self.params.interaction_radius
    }

    fn top_left(&self) -> Position {
        let (width, height) = self.board_extent();
        self.position.offset(-width / 2.0, -height / 2.0)
    }

    // board dimensions are small constants
    #[allow(clippy::cast_precision_loss)]
    fn board_extent(&self) -> (f32, f32) {
        (
            GRID_WIDTH as f32 * self.params.cell_size,
            GRID_HEIGHT as f32 * self.params.cell_size,
        )
    }

    #[allow(clippy::cast_precision_loss)]
    fn cell_center(&self, cell: Cell) -> Position {
        let size = self.params.cell_size;
        self.top_left()
            .offset(cell.x as f32 * size + size / 2.0, cell.y as f32 * size + size / 2.0)
    }
}

impl<R: Rng> BoardHost for AuthoritativeBoard<R> {
    type Frame = Vec<NetObject>;

    fn tick(&mut self, input: BoardInput, elapsed: u64) -> Option<GameOverReason> {
        self.server_tick += elapsed;
        let in_range = self.owner_in_range();
        drive(&mut self.sim, &mut self.edge, input, in_range, elapsed)
    }

    fn render(&self) -> Vec<NetObject> {
        let snapshot = self.sim.snapshot();
        let (width, height) = self.board_extent();
        let top_left = self.top_left();
        let top_right = top_left.offset(width, 0.0);
        let bottom_left = top_left.offset(0.0, height);
        let bottom_right = top_left.offset(width, height);
        let border = [
            (top_right, top_left),
            (bottom_right, top_right),
            (bottom_left, bottom_right),
            (top_left, bottom_left),
        ];

        let mut ids = self.ids.iter();
        let mut objects = Vec::with_capacity(border.len() + 1 + snapshot.body.len());
        for ((from, to), id) in border.into_iter().zip(ids.by_ref()) {
            objects.push(NetObject::Laser {
                id,
                from,
                to,
                start_tick: self.server_tick,
            });
        }
        if let Some(id) = ids.next() {
            objects.push(NetObject::Pickup {
                id,
                position: self.cell_center(snapshot.food),
                kind: PickupKind::Health,
            });
        }
        for (cell, id) in snapshot.body.iter().zip(ids) {
            objects.push(NetObject::Pickup {
                id,
                position: self.cell_center(*cell),
                kind: PickupKind::Armor,
            });
        }
        objects
    }
}
