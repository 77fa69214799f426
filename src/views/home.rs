use iced::{
    widget::{button, column, container, text},
    Alignment, Element, Length,
};
use log::debug;

use crate::{app::Message, view::View};

#[derive(Clone, Debug)]
pub enum HomeMessage {
    Default,
    OpenBoard,
}

impl HomeMessage {
    #[must_use]
    pub fn new() -> Self {
        HomeMessage::Default
    }
}

impl Default for HomeMessage {
    fn default() -> Self {
        HomeMessage::new()
    }
}

/// Screen shown while no board is open.
#[derive(Debug)]
pub struct Home {}

impl Home {
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }
}

impl View for Home {
    fn update(&mut self, message: Message) -> Option<Message> {
        if let Message::Home(message) = message {
            match message {
                HomeMessage::OpenBoard => Some(Message::open_snake_board()),
                HomeMessage::Default => None,
            }
        } else {
            debug!("Received message for Home but was: {:#?}", message);
            None
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let open_button = button(
            text("Open snake board")
                .align_x(iced::alignment::Horizontal::Center)
                .align_y(iced::alignment::Vertical::Center),
        )
        .on_press(Message::Home(HomeMessage::OpenBoard))
        .width(200)
        .height(50);

        let content = column![
            text("No snake board open"),
            open_button,
            text("Arrows or WASD steer, Space starts and stops"),
        ]
        .spacing(20)
        .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(iced::alignment::Horizontal::Center)
            .align_y(iced::alignment::Vertical::Center)
            .into()
    }
}

impl Default for Home {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::snake::snake_board_screen::SnakeBoardMessage;

    #[test]
    fn open_board_asks_for_the_board_screen() {
        let mut home = Home::new();
        assert!(matches!(
            home.update(Message::Home(HomeMessage::OpenBoard)),
            Some(Message::SnakeBoard(SnakeBoardMessage::Open))
        ));
        assert!(home.update(Message::Home(HomeMessage::Default)).is_none());
    }
}
