//! Configuration for the strata compiler.
//!
//! Settings persist to disk as `config.ron` and can be overridden per run
//! from the command line.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, GenerationConfig, OutputConfig, default_config_dir, read_ron,
};
pub use error::ConfigError;
