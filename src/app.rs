use iced::{Element, Subscription};
use log::debug;

use crate::{
    view::View,
    views::{
        home::{Home, HomeMessage},
        snake::snake_board_screen::{SnakeBoardMessage, SnakeBoardScreen},
    },
};

/// State of the preview window.
pub struct State {
    screen: Screen,
}

#[derive(Debug)]
enum Screen {
    Home(Home),
    SnakeBoard(SnakeBoardScreen),
}

impl Screen {
    pub fn new_home() -> Self {
        Screen::Home(Home::new())
    }

    pub fn new_snake_board() -> Self {
        Screen::SnakeBoard(SnakeBoardScreen::new())
    }
}

#[derive(Clone, Debug)]
pub enum Message {
    Home(HomeMessage),
    SnakeBoard(SnakeBoardMessage),
}

impl Message {
    #[must_use]
    pub fn new_home() -> Self {
        Message::Home(HomeMessage::new())
    }

    #[must_use]
    pub fn open_snake_board() -> Self {
        Message::SnakeBoard(SnakeBoardMessage::Open)
    }
}

impl View for Screen {
    fn update(&mut self, message: Message) -> Option<Message> {
        match self {
            Screen::Home(screen) => screen.update(message),
            Screen::SnakeBoard(screen) => screen.update(message),
        }
    }

    fn view(&self) -> Element<'_, Message> {
        match self {
            Screen::Home(screen) => screen.view(),
            Screen::SnakeBoard(screen) => screen.view(),
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        match self {
            Screen::Home(screen) => screen.subscription(),
            Screen::SnakeBoard(screen) => screen.subscription(),
        }
    }
}

impl State {
    #[must_use]
    pub fn new() -> Self {
        Self {
            screen: Screen::new_home(),
        }
    }

    /// Routes `message` to the current screen and swaps screens when it asks for one.
    /// Leaving the board screen drops its simulation.
    pub fn update(state: &mut State, message: Message) {
        if let Some(next) = state.screen.update(message) {
            match next {
                Message::Home(_) => {
                    debug!("Transitioning to home screen");
                    state.screen = Screen::new_home();
                }
                Message::SnakeBoard(_) => {
                    debug!("Opening snake board");
                    state.screen = Screen::new_snake_board();
                }
            }
        }
    }

    #[must_use]
    pub fn view(state: &State) -> Element<'_, Message> {
        state.screen.view()
    }

    #[must_use]
    pub fn subscription(state: &State) -> Subscription<Message> {
        state.screen.subscription()
    }

    #[must_use]
    pub fn is_board_open(&self) -> bool {
        matches!(self.screen, Screen::SnakeBoard(_))
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_opens_and_closes() {
        let mut state = State::new();
        assert!(!state.is_board_open());
        State::update(&mut state, Message::Home(HomeMessage::OpenBoard));
        assert!(state.is_board_open());
        State::update(&mut state, Message::SnakeBoard(SnakeBoardMessage::Close));
        assert!(!state.is_board_open());
    }

    #[test]
    fn board_messages_on_home_are_dropped() {
        let mut state = State::new();
        State::update(&mut state, Message::SnakeBoard(SnakeBoardMessage::Close));
        assert!(!state.is_board_open());
    }
}
