//! Conf module: loading, validating and saving the source list.

pub mod error;
pub mod load;

pub use error::ConfigError;
pub use load::{load_sources, save_sources, validate_sources};
