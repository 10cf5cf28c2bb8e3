pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{
    BuildScriptArgs, CliArgs, Commands, DetectArgs, PlatformsArgs, ResolveVersionArgs,
};
pub use output::{OutputFormat, OutputFormatter};
