//! Per-tick input handed to a board by whichever host polls the player.
use super::grid::Direction;

/// What the player asked for during one tick or frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoardInput {
    pub directional_intent: Option<Direction>,
    /// Level of the interact button, not an edge. See [`ActivationEdge`].
    pub activate: bool,
}

impl BoardInput {
    #[must_use]
    pub fn new(directional_intent: Option<Direction>, activate: bool) -> Self {
        Self {
            directional_intent,
            activate,
        }
    }
}

/// Turns the held state of the interact button into press events.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActivationEdge {
    was_activating: bool,
}

impl ActivationEdge {
    /// Records `activating` and returns true only on a false -> true transition.
    pub fn rising(&mut self, activating: bool) -> bool {
        let fired = activating && !self.was_activating;
        self.was_activating = activating;
        fired
    }

    #[must_use]
    pub fn was_activating(self) -> bool {
        self.was_activating
    }
}
