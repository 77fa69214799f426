pub mod local_board_view_model;
