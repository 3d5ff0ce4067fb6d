//! Core library for The Choice, a small decision helper: pick a random item
//! from a list, throw a coin, or roll a die.
//!
//! The binary drives either the Ratatui front-end or a one-shot command line;
//! both go through the same stores, settings and chooser exposed here.
pub mod chooser;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod settings;
pub mod ui;

pub use chooser::{Choice, ChoiceMethod, ChoiceRequest, Chooser, CoinSide};
pub use config::Config;
pub use error::{ChooserError, StoreError};
pub use models::{Item, ItemList, ListMembership, Setting};
pub use settings::AppSettings;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
