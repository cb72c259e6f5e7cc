pub mod config;
pub mod hash;
pub mod result;

pub use config::types::{ConfigError, FlagConfig, FlagDefinition, Patterns, Settings};
pub use result::TransformationResult;
