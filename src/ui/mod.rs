//! Ratatui front-end: a chooser screen plus editors for items and lists.
mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
