//! Ambient helpers shared by the library and the CLI

pub mod logging;

pub use logging::{init_default, init_from_env, init_logging, LoggingConfig};
