// Adapters layer: concrete implementations of the domain ports.

pub mod openmeteo;
pub mod storage;

pub use openmeteo::OpenMeteoClient;
pub use storage::LocalStorage;
