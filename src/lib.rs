#![deny(warnings)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(unsafe_code)]

pub mod app;
pub mod models;
pub mod server;
pub mod view;
pub mod view_model;
pub mod view_models;
pub mod views;
