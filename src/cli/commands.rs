use crate::platform::PlatformId;
use crate::script::is_shell_identifier;
use crate::version::RollForwardPolicy;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Detects an application's platform, picks SDK versions and writes its build script
#[derive(Parser, Debug)]
#[command(
    name = "buildsmith",
    about = "Detect application platforms and compose their build scripts",
    version,
    long_about = "buildsmith inspects a source directory, detects which platforms it uses \
                  (.NET, Node.js, Python, PHP, Hugo, Ruby, Java, Go), resolves the SDK version \
                  for each one and composes a bash script that builds the application."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Detect the platforms of an application",
        long_about = "Runs every platform detector over the source directory and prints the \
                      platforms that matched, in priority order.\n\n\
                      Examples:\n  \
                      buildsmith detect\n  \
                      buildsmith detect ./app --format json\n  \
                      buildsmith detect ./app --multi-platform"
    )]
    Detect(DetectArgs),

    #[command(
        name = "build-script",
        about = "Compose the build script for an application",
        long_about = "Detects the application's platforms, resolves an SDK version for each \
                      and prints the bash build script.\n\n\
                      Examples:\n  \
                      buildsmith build-script ./app\n  \
                      buildsmith build-script ./app --platform python --platform-version 3.9\n  \
                      buildsmith build-script ./app --output build.sh"
    )]
    BuildScript(BuildScriptArgs),

    #[command(
        name = "resolve-version",
        about = "Resolve a version request against a list of versions",
        long_about = "Runs the version resolver on its own, without detection.\n\n\
                      Examples:\n  \
                      buildsmith resolve-version --versions 3.8.18,3.9.7 --spec 3.9\n  \
                      buildsmith resolve-version --versions 6.0.100,6.0.300 --base 6.0.100 --policy latestFeature"
    )]
    ResolveVersion(ResolveVersionArgs),

    #[command(about = "List supported platforms in detection priority order")]
    Platforms(PlatformsArgs),
}

/// Flags shared by every command that runs detection.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to the application source (defaults to current directory)"
    )]
    pub source_path: Option<PathBuf>,

    #[arg(
        short = 'p',
        long,
        value_parser = parse_platform,
        help = "Only run this platform's detector"
    )]
    pub platform: Option<PlatformId>,

    #[arg(long, help = "Allow secondary platforms to join the build")]
    pub multi_platform: bool,

    #[arg(
        long,
        value_name = "LIST",
        value_delimiter = ',',
        value_parser = parse_platform,
        help = "Comma-separated platforms to skip"
    )]
    pub disable: Vec<PlatformId>,
}

#[derive(Args, Debug, Clone)]
pub struct DetectArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Args, Debug, Clone)]
pub struct BuildScriptArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long, value_name = "VERSION", help = "Version requested for the primary platform")]
    pub platform_version: Option<String>,

    #[arg(long, help = "Fetch supported versions from the SDK storage manifest")]
    pub enable_dynamic_install: bool,

    #[arg(long, value_name = "URL", help = "Base URL of the SDK storage manifest")]
    pub sdk_storage_url: Option<String>,

    #[arg(
        long,
        value_name = "LIST",
        help = "Comma-separated versions that must never be selected"
    )]
    pub blocked_versions: Option<String>,

    #[arg(long, value_name = "DIR", help = "Root of the installed SDKs")]
    pub sdk_root: Option<PathBuf>,

    #[arg(long, value_name = "CMD", help = "Command to run before the platform builds")]
    pub pre_build: Option<String>,

    #[arg(long, value_name = "CMD", help = "Command to run after the platform builds")]
    pub post_build: Option<String>,

    #[arg(long, help = "Package the build output into a tarball")]
    pub package: bool,

    #[arg(
        long = "property",
        value_name = "KEY=VALUE",
        value_parser = parse_property,
        help = "Extra environment variable exported by the script (repeatable)"
    )]
    pub properties: Vec<(String, String)>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write the script to a file instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "script",
        help = "Output format"
    )]
    pub format: PlanFormatArg,
}

#[derive(Args, Debug, Clone)]
pub struct ResolveVersionArgs {
    #[arg(
        long,
        value_name = "LIST",
        value_delimiter = ',',
        required = true,
        help = "Comma-separated supported versions"
    )]
    pub versions: Vec<String>,

    #[arg(long, value_name = "VERSION", help = "Default version (defaults to the highest)")]
    pub default: Option<String>,

    #[arg(
        long,
        value_name = "SPEC",
        conflicts_with_all = ["policy", "base"],
        help = "Exact version or range, e.g. 3.9.7, ^16, >=7.4"
    )]
    pub spec: Option<String>,

    #[arg(
        long,
        value_parser = parse_policy,
        requires = "base",
        help = "Roll-forward policy applied to --base"
    )]
    pub policy: Option<RollForwardPolicy>,

    #[arg(long, value_name = "VERSION", help = "Base version for --policy")]
    pub base: Option<String>,

    #[arg(long, value_name = "LIST", help = "Comma-separated blocked versions")]
    pub blocked: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct PlatformsArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

/// `script` prints only the bash text; the others print the whole plan.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFormatArg {
    Script,
    Json,
    Yaml,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_platform(s: &str) -> Result<PlatformId, String> {
    s.parse::<PlatformId>().map_err(|e| e.to_string())
}

fn parse_policy(s: &str) -> Result<RollForwardPolicy, String> {
    s.parse()
}

fn parse_property(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if !is_shell_identifier(key) {
        return Err(format!("'{}' is not a valid environment variable name", key));
    }
    Ok((key.to_string(), value.to_string()))
}
