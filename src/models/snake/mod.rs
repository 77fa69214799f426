pub mod board_host;
pub mod board_input;
pub mod grid;
pub mod snake_simulation;
