//! Shared types, config, and error definitions for alt-finder.

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, ProviderError, RecommendError};
pub use types::*;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
