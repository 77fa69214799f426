use iced::{Element, Subscription};

use crate::app::Message;

/// A screen of the preview window.
pub trait View {
    fn update(&mut self, message: Message) -> Option<Message>;

    fn view(&self) -> Element<'_, Message>;

    fn subscription(&self) -> Subscription<Message> {
        Subscription::none()
    }
}
