pub mod config;
pub mod rollover;
pub mod telemetry;
pub mod workers;
