pub mod clearsky;
pub mod interpolate;
pub mod irradiance;
pub mod model;
pub mod production;
pub mod pvsystem;
pub mod solar;
pub mod solar_position;
pub mod weather;

pub use crate::domain::ports::{Storage, WeatherProvider};
pub use crate::utils::error::Result;
pub use solar::SolarService;
pub use weather::WeatherService;
