// Application layer: HTTP API, hourly model job and process entry points.

pub mod api;
pub mod export;
pub mod scheduler;
pub mod server;
