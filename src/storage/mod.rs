pub mod config;

pub use config::{AccountConfig, Config, ConfigError};
