//! Capability a host gives to anything that owns a snake board.
use rand::Rng;

use super::{
    board_input::{ActivationEdge, BoardInput},
    snake_simulation::{GameOverReason, Phase, SnakeSimulation},
};

/// Something the host ticks and renders. Both the local preview and the authoritative board
/// implement this; [`SnakeSimulation`] does not.
pub trait BoardHost {
    /// What the host's renderer consumes.
    type Frame;

    /// Feeds one tick of input and `elapsed` time units into the board.
    fn tick(&mut self, input: BoardInput, elapsed: u64) -> Option<GameOverReason>;

    fn render(&self) -> Self::Frame;
}

/// Input handling shared by every host: a press toggles play, a direction steers.
///
/// Returns the game over reason if the board's clock ended the game on this tick.
pub fn drive<R: Rng>(
    sim: &mut SnakeSimulation<R>,
    edge: &mut ActivationEdge,
    input: BoardInput,
    in_range: bool,
    elapsed: u64,
) -> Option<GameOverReason> {
    if edge.rising(input.activate) && in_range {
        match sim.phase() {
            Phase::Playing => sim.stop(),
            Phase::Idle | Phase::GameOver => sim.start(),
        }
    }
    if let Some(direction) = input.directional_intent {
        sim.queue_direction(direction);
    }
    sim.advance(elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::snake::grid::{Cell, Direction};

    fn press() -> BoardInput {
        BoardInput::new(None, true)
    }

    fn release() -> BoardInput {
        BoardInput::default()
    }

    #[test]
    fn press_toggles_play() {
        let mut sim = SnakeSimulation::from_seed(5, 1);
        let mut edge = ActivationEdge::default();
        drive(&mut sim, &mut edge, press(), true, 0);
        assert_eq!(sim.phase(), Phase::Playing);
        // still held: no second toggle
        drive(&mut sim, &mut edge, press(), true, 0);
        assert_eq!(sim.phase(), Phase::Playing);
        drive(&mut sim, &mut edge, release(), true, 0);
        drive(&mut sim, &mut edge, press(), true, 0);
        assert_eq!(sim.phase(), Phase::Idle);
    }

    #[test]
    fn press_out_of_range_is_ignored_but_consumed() {
        let mut sim = SnakeSimulation::from_seed(5, 1);
        let mut edge = ActivationEdge::default();
        drive(&mut sim, &mut edge, press(), false, 0);
        assert_eq!(sim.phase(), Phase::Idle);
        // walking into range while holding does not count as a press
        drive(&mut sim, &mut edge, press(), true, 0);
        assert_eq!(sim.phase(), Phase::Idle);
    }

    #[test]
    fn press_after_game_over_restarts() {
        let mut sim = SnakeSimulation::from_seed(1, 1);
        let mut edge = ActivationEdge::default();
        drive(&mut sim, &mut edge, press(), true, 0);
        drive(&mut sim, &mut edge, release(), true, 0);
        let mut reason = None;
        for _ in 0..20 {
            reason = reason.or(drive(
                &mut sim,
                &mut edge,
                BoardInput::new(Some(Direction::Up), false),
                true,
                1,
            ));
        }
        assert!(reason.is_some());
        assert_eq!(sim.phase(), Phase::GameOver);
        drive(&mut sim, &mut edge, press(), true, 0);
        assert_eq!(sim.phase(), Phase::Playing);
        assert_eq!(sim.head(), Cell::new(10, 10));
        assert_eq!(sim.score(), 0);
    }
}
