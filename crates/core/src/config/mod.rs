//! Configuration loading.

pub mod loader;
pub mod types;

pub use loader::{ConfigError, ConfigLoader, default_config_path, default_index_dir};
pub use types::{IndexConfig, LoggingConfig, ResolvedConfig, ResolvedSource};
