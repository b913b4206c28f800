//! Configuration module for the instagram-downloader.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Configuration validation

pub mod loader;
pub mod validation;

pub use loader::{Config, InputConfig, NetworkConfig, OptionsConfig, OutputConfig};
pub use validation::{validate_config, validate_proxy};
