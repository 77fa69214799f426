//! Client-local preview of a snake board, polled once per displayed frame.
use std::time::Instant;

use iced::keyboard::{key::Named, Key};
use log::{debug, info, warn};

use crate::{
    app::Message,
    models::snake::{
        board_host::{drive, BoardHost},
        board_input::{ActivationEdge, BoardInput},
        grid::Direction,
        snake_simulation::{BoardSnapshot, GameOverReason, Phase, SnakeSimulation},
    },
    view_model::ViewModel,
    views::snake::snake_board_screen::SnakeBoardMessage,
};

/// Milliseconds between two committed moves in the preview.
pub const MOVE_INTERVAL_MILLIS: u64 = 100;
/// Milliseconds between two polled frames.
pub const FRAME_MILLIS: u64 = 16;

/// Keys currently held down, as the preview polls them every frame.
#[derive(Clone, Copy, Debug, Default)]
struct HeldKeys {
    direction: Option<Direction>,
    activate: bool,
    /// Set by a press and cleared after the next frame so taps shorter than a frame still count.
    activate_tapped: bool,
}

#[derive(Debug)]
pub struct LocalBoardViewModel {
    sim: SnakeSimulation,
    edge: ActivationEdge,
    held: HeldKeys,
    last_frame: Option<Instant>,
}

impl LocalBoardViewModel {
    #[must_use]
    pub fn new() -> Self {
        Self::with_simulation(SnakeSimulation::new(MOVE_INTERVAL_MILLIS))
    }

    #[must_use]
    pub fn with_simulation(mut sim: SnakeSimulation) -> Self {
        sim.reset();
        Self {
            sim,
            edge: ActivationEdge::default(),
            held: HeldKeys::default(),
            last_frame: None,
        }
    }

    #[must_use]
    pub fn get_phase(&self) -> Phase {
        self.sim.phase()
    }

    #[must_use]
    pub fn get_score(&self) -> u32 {
        self.sim.score()
    }

    fn key_direction(key: &Key) -> Option<Direction> {
        match key {
            Key::Named(Named::ArrowUp) => Some(Direction::Up),
            Key::Named(Named::ArrowDown) => Some(Direction::Down),
            Key::Named(Named::ArrowLeft) => Some(Direction::Left),
            Key::Named(Named::ArrowRight) => Some(Direction::Right),
            Key::Character(c) => match c.as_str() {
                "w" | "W" => Some(Direction::Up),
                "s" | "S" => Some(Direction::Down),
                "a" | "A" => Some(Direction::Left),
                "d" | "D" => Some(Direction::Right),
                _ => None,
            },
            _ => None,
        }
    }

    fn is_activate(key: &Key) -> bool {
        matches!(key, Key::Named(Named::Space))
    }

    fn key_pressed(&mut self, key: &Key) {
        if Self::is_activate(key) {
            self.held.activate = true;
            self.held.activate_tapped = true;
        } else if let Some(direction) = Self::key_direction(key) {
            self.held.direction = Some(direction);
        }
    }

    fn key_released(&mut self, key: &Key) {
        if Self::is_activate(key) {
            self.held.activate = false;
        } else if let Some(direction) = Self::key_direction(key) {
            if self.held.direction == Some(direction) {
                self.held.direction = None;
            }
        }
    }

    fn frame(&mut self, now: Instant) {
        let elapsed = self.last_frame.map_or(0, |last| {
            u64::try_from(now.saturating_duration_since(last).as_millis()).unwrap_or(u64::MAX)
        });
        self.last_frame = Some(now);
        let input = BoardInput::new(
            self.held.direction,
            self.held.activate || self.held.activate_tapped,
        );
        self.held.activate_tapped = false;
        if let Some(reason) = self.tick(input, elapsed) {
            info!("Preview game over: snake {reason}");
        }
    }
}

impl Default for LocalBoardViewModel {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardHost for LocalBoardViewModel {
    type Frame = BoardSnapshot;

    /// The preview window is always within reach of the local player.
    fn tick(&mut self, input: BoardInput, elapsed: u64) -> Option<GameOverReason> {
        drive(&mut self.sim, &mut self.edge, input, true, elapsed)
    }

    fn render(&self) -> BoardSnapshot {
        self.sim.snapshot()
    }
}

impl ViewModel for LocalBoardViewModel {
    fn update(&mut self, message: Message) -> Option<Message> {
        let Message::SnakeBoard(board_message) = message else {
            warn!("Non-board message sent to LocalBoardViewModel: {:#?}", message);
            return None;
        };
        match board_message {
            SnakeBoardMessage::Frame(now) => {
                self.frame(now);
                None
            }
            SnakeBoardMessage::KeyPressed(key) => {
                self.key_pressed(&key);
                None
            }
            SnakeBoardMessage::KeyReleased(key) => {
                self.key_released(&key);
                None
            }
            SnakeBoardMessage::Close => {
                debug!("Closing snake board");
                Some(Message::new_home())
            }
            SnakeBoardMessage::Open => None,
        }
    }
}
