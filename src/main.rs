use buildsmith::cli::commands::{CliArgs, Commands};
use buildsmith::cli::handlers::{
    handle_build_script, handle_detect, handle_platforms, handle_resolve_version,
};
use buildsmith::util::logging::{self, parse_level, LoggingConfig, LOG_LEVEL_ENV};
use buildsmith::VERSION;

use clap::Parser;
use std::env;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("buildsmith v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Detect(detect_args) => handle_detect(detect_args).await,
        Commands::BuildScript(build_args) => handle_build_script(build_args).await,
        Commands::ResolveVersion(resolve_args) => handle_resolve_version(resolve_args),
        Commands::Platforms(platforms_args) => handle_platforms(platforms_args),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let mut config = if args.verbose {
        LoggingConfig::verbose()
    } else if args.quiet {
        LoggingConfig::with_level(Level::ERROR)
    } else if let Some(level_str) = &args.log_level {
        LoggingConfig::with_level(parse_level(level_str))
    } else if let Ok(level_str) = env::var(LOG_LEVEL_ENV) {
        LoggingConfig::with_level(parse_level(&level_str))
    } else {
        LoggingConfig::default()
    };
    config.use_json = env::var(logging::LOG_JSON_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<bool>().ok())
        .unwrap_or(false);

    logging::init_logging(config);
}
