//! Authoritative side: boards owned by players, ticked by the server.
pub mod board_world;
pub mod id_allocator;
pub mod server_loop;
pub mod snake_board;
