//! Structured logging setup
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the binary (or to an embedding application). Output always goes to
//! stderr so that a build script printed on stdout stays clean.
//!
//! ```no_run
//! use buildsmith::util::logging;
//!
//! // BUILDSMITH_LOG_LEVEL=debug BUILDSMITH_LOG_JSON=true
//! logging::init_from_env();
//! tracing::info!(platform = "python", "Detected platform");
//! ```

use std::env;
use std::io;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_LEVEL_ENV: &str = "BUILDSMITH_LOG_LEVEL";
pub const LOG_JSON_ENV: &str = "BUILDSMITH_LOG_JSON";

/// Dependencies that are chatty at debug level.
const QUIET_DEPENDENCIES: &[&str] = &["h2=warn", "hyper=warn", "hyper_util=warn", "reqwest=warn"];

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for events from this crate.
    pub level: Level,

    /// One JSON object per event instead of human-readable lines.
    pub use_json: bool,

    pub include_target: bool,

    /// Include file and line number of the event.
    pub include_location: bool,

    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            use_json: false,
            include_target: false,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Debug output with targets, for `-v` runs.
    pub fn verbose() -> Self {
        Self {
            level: Level::DEBUG,
            include_target: true,
            ..Default::default()
        }
    }

    /// The filter used when `RUST_LOG` is not set.
    pub fn directives(&self) -> Vec<String> {
        let mut directives = vec![format!(
            "{}={}",
            env!("CARGO_CRATE_NAME"),
            self.level.as_str().to_lowercase()
        )];
        directives.extend(QUIET_DEPENDENCIES.iter().map(|d| d.to_string()));
        directives
    }
}

/// Parses a log level name, case-insensitively. Unknown names fall back to
/// `INFO` with a warning on stderr.
pub fn parse_level(level_str: &str) -> Level {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    if env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }
    config
        .directives()
        .iter()
        .filter_map(|d| d.parse::<Directive>().ok())
        .fold(EnvFilter::new(""), |filter, directive| filter.add_directive(directive))
}

/// Installs the global subscriber. Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(&config);
        let layer = fmt::layer()
            .with_writer(io::stderr)
            .with_target(config.include_target)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_thread_ids(config.include_thread_ids)
            .with_thread_names(config.include_thread_ids);

        let registry = tracing_subscriber::registry().with(filter);
        let result = if config.use_json {
            registry.with(layer.json()).try_init()
        } else {
            registry.with(layer).try_init()
        };
        if let Err(err) = result {
            eprintln!("Logging already initialized: {}", err);
        }
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Reads `BUILDSMITH_LOG_LEVEL` and `BUILDSMITH_LOG_JSON`; `RUST_LOG`, when
/// set, replaces the computed filter entirely.
pub fn init_from_env() {
    init_logging(config_from_env());
}

fn config_from_env() -> LoggingConfig {
    let level = env::var(LOG_LEVEL_ENV)
        .ok()
        .map(|v| parse_level(&v))
        .unwrap_or(Level::WARN);

    let use_json = env::var(LOG_JSON_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<bool>().ok())
        .unwrap_or(false);

    LoggingConfig {
        level,
        use_json,
        ..Default::default()
    }
}
