use log::debug;
use snakeboard::app::State;

fn main() {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "snakeboard=debug");
    }
    env_logger::init();
    debug!("Debug on");
    let _ = iced::application("Snake Board", State::update, State::view)
        .window_size(iced::Size::new(600.0, 600.0))
        .subscription(State::subscription)
        .run();
}
