pub mod catalog;
pub mod config;
pub mod controller;
pub mod endpoints;
pub mod error;
pub mod grid;
pub mod layers;
pub mod models;
pub mod presenter;
pub mod prefs;
pub mod traits;
pub mod utils;

pub use config::{Cli, Config, GridSource};
pub use endpoints::server::ViewerServer;
pub use error::{Error, Result};
