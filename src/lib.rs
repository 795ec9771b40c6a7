pub mod configuration;
pub mod parser;
pub mod telemetry;
pub mod types;
