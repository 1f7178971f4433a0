//! stashmatch core: catalog entities, registry candidates, configuration.

pub mod config;
pub mod error;
pub mod models;

pub use config::{AppConfig, ApplyConfig, LoggingConfig, MatchConfig};
pub use error::{CoreError, Result};
pub use models::*;
