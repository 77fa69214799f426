//! View models sit between a [`crate::view::View`] and the board it presents.

use crate::app::Message;

pub trait ViewModel {
    /// Applies `message` to the model. A returned message asks the app to switch screens.
    fn update(&mut self, message: Message) -> Option<Message>;
}
