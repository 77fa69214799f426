pub mod snake_board_screen;
