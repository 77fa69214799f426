use std::time::{Duration, Instant};

use iced::{
    keyboard::{self, Key},
    time,
    widget::{button, column, container, row, text, Column, Row},
    Border, Color, Element, Length, Subscription,
};

use crate::{
    app::Message,
    models::snake::{
        board_host::BoardHost,
        snake_simulation::{Phase, SnakeBlock},
    },
    view::View,
    view_model::ViewModel,
    view_models::snake::local_board_view_model::{LocalBoardViewModel, FRAME_MILLIS},
};

#[derive(Clone, Debug)]
pub enum SnakeBoardMessage {
    /// Opens the board window.
    Open,
    /// Tears the board window down.
    Close,
    Frame(Instant),
    KeyPressed(Key),
    KeyReleased(Key),
}

#[derive(Debug, Default)]
pub struct SnakeBoardScreen {
    view_model: LocalBoardViewModel,
}

impl SnakeBoardScreen {
    #[must_use]
    pub fn new() -> Self {
        Self {
            view_model: LocalBoardViewModel::new(),
        }
    }
}

impl View for SnakeBoardScreen {
    fn update(&mut self, message: Message) -> Option<Message> {
        self.view_model.update(message)
    }

    fn view(&self) -> Element<'_, Message> {
        let snapshot = self.view_model.render();
        let mut grid_view = Column::new();
        let cell_size = 20;

        let make_container = |color: Color| {
            container(text(" ").color(color)) // Empty text to preserve size
                .width(cell_size)
                .height(cell_size)
                .style(move |_: &_| container::Style {
                    border: Border {
                        color: Color::from_rgba(0.0, 0.0, 0.0, 0.1),
                        width: 1.0,
                        ..Default::default()
                    },
                    background: Some(color.into()),
                    ..container::Style::default()
                })
        };

        for grid_row in snapshot.to_grid() {
            let mut row = Row::new();
            for entry in grid_row {
                let cell = match entry {
                    SnakeBlock::Empty => make_container(Color::from_rgb(0.1, 0.1, 0.1)),
                    SnakeBlock::Food => make_container(Color::from_rgb(1.0, 0.0, 0.0)),
                    SnakeBlock::SnakeBody => make_container(Color::from_rgba(0.0, 1.0, 0.0, 0.8)),
                    SnakeBlock::SnakeHead => make_container(Color::from_rgb(0.0, 1.0, 0.0)),
                };
                row = row.push(cell);
            }
            grid_view = grid_view.push(row);
        }

        let close_button = button(text("Close board"))
            .on_press(Message::SnakeBoard(SnakeBoardMessage::Close))
            .width(160)
            .height(40);
        let score = text(format!("Score: {}", snapshot.score)).size(20);

        let prompt = match snapshot.phase {
            Phase::GameOver => column![
                text("GAME OVER")
                    .size(20)
                    .color(Color::from_rgb(1.0, 0.0, 0.0)),
                text("Press Space to restart"),
            ],
            Phase::Idle => column![text("Press Space to start")],
            Phase::Playing => Column::new(),
        }
        .align_x(iced::alignment::Horizontal::Center);

        container(
            column![
                row![close_button, score].spacing(20),
                grid_view,
                prompt,
            ]
            .spacing(10)
            .align_x(iced::alignment::Horizontal::Center),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(iced::alignment::Horizontal::Center)
        .align_y(iced::alignment::Vertical::Center)
        .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        let frames = time::every(Duration::from_millis(FRAME_MILLIS))
            .map(SnakeBoardMessage::Frame)
            .map(Message::SnakeBoard);
        let presses = keyboard::on_key_press(|key, _| {
            Some(Message::SnakeBoard(SnakeBoardMessage::KeyPressed(key)))
        });
        let releases = keyboard::on_key_release(|key, _| {
            Some(Message::SnakeBoard(SnakeBoardMessage::KeyReleased(key)))
        });
        Subscription::batch(vec![frames, presses, releases])
    }
}
