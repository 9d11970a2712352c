pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::Cli;

pub use adapters::{LocalStorage, OpenMeteoClient};
pub use app::api::{create_router, AppState};
pub use config::Settings;
pub use core::{SolarService, WeatherService};
pub use utils::error::{Result, SoleilError};
