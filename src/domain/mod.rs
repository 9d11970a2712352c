// Domain layer: the installation, weather and result types plus the ports the services depend on.

pub mod model;
pub mod ports;
