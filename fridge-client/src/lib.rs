pub mod app;
pub mod config;
pub mod cooking;
pub mod errors;
pub mod ingestion;
pub mod persistence;
pub mod shell;

pub use config::GatewayConfig;
pub use errors::{GatewayError, GatewayResult};
pub use ingestion::AiGateway;
