//! Command handlers. Each returns the process exit code.

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::commands::{
    BuildScriptArgs, DetectArgs, PlanFormatArg, PlatformsArgs, ResolveVersionArgs, SourceArgs,
};
use super::output::{OutputFormat, OutputFormatter};
use crate::config::DetectionOptions;
use crate::error::{BuildError, ConfigError};
use crate::pipeline::BuildOrchestrator;
use crate::platform::{DetectorRegistry, PlatformId};
use crate::script::BuildOptions;
use crate::source::SourceView;
use crate::version::{
    parse_block_list, resolve, select_default, sort_versions, PlatformVersionInfo,
    VersionSource, VersionSpecifier,
};

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;

fn source_root(path: &Option<PathBuf>) -> Result<PathBuf> {
    let root = match path {
        Some(path) => path.clone(),
        None => env::current_dir().context("Failed to determine current directory")?,
    };
    if !root.is_dir() {
        bail!("Source path is not a directory: {}", root.display());
    }
    root.canonicalize()
        .with_context(|| format!("Failed to resolve source path {}", root.display()))
}

/// Environment options with the command-line flags applied on top.
fn detection_options(source: &SourceArgs) -> Result<DetectionOptions, ConfigError> {
    let mut options = DetectionOptions::from_env()?;
    if source.platform.is_some() {
        options.platform = source.platform;
    }
    if source.multi_platform {
        options.enable_multi_platform_build = true;
    }
    for platform in &source.disable {
        if !options.disabled_platforms.contains(platform) {
            options.disabled_platforms.push(*platform);
        }
    }
    options.validate()?;
    Ok(options)
}

fn report(err: &BuildError) -> i32 {
    error!(error = %err, "Build failed");
    eprintln!("{}", err.help_message());
    EXIT_FAILURE
}

fn report_anyhow(err: &anyhow::Error) -> i32 {
    eprintln!("Error: {:#}", err);
    EXIT_FAILURE
}

fn write_output(output: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, output)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!(path = %path.display(), "Wrote output");
        }
        None => print!("{}", output),
    }
    Ok(())
}

/// Cancels `token` when the process receives Ctrl-C.
fn cancel_on_interrupt(token: &CancellationToken) {
    let token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling");
            token.cancel();
        }
    });
}

pub async fn handle_detect(args: &DetectArgs) -> i32 {
    let root = match source_root(&args.source.source_path) {
        Ok(root) => root,
        Err(e) => return report_anyhow(&e),
    };
    let options = match detection_options(&args.source) {
        Ok(options) => options,
        Err(e) => return report(&BuildError::Config(e)),
    };
    debug!(root = %root.display(), "Detecting platforms");

    let view = SourceView::for_directory(&root);
    let outcome = match DetectorRegistry::with_defaults().detect(
        &view,
        &options,
        &CancellationToken::new(),
    ) {
        Ok(outcome) => outcome,
        Err(e) => return report(&BuildError::from(e)),
    };

    let formatter = OutputFormatter::new(OutputFormat::from(args.format));
    match formatter
        .format_detection(&outcome)
        .and_then(|output| write_output(&output, None))
    {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => report_anyhow(&e),
    }
}

fn build_options(args: &BuildScriptArgs, options: &DetectionOptions) -> BuildOptions {
    let mut build = BuildOptions {
        sdk_install_root: options.installed_sdk_root.clone(),
        pre_build_command: args.pre_build.clone(),
        post_build_command: args.post_build.clone(),
        should_package: args.package,
        ..Default::default()
    };
    build.properties.extend(args.properties.iter().cloned());
    build
}

pub async fn handle_build_script(args: &BuildScriptArgs) -> i32 {
    let root = match source_root(&args.source.source_path) {
        Ok(root) => root,
        Err(e) => return report_anyhow(&e),
    };
    let mut options = match detection_options(&args.source) {
        Ok(options) => options,
        Err(e) => return report(&BuildError::Config(e)),
    };
    if args.platform_version.is_some() {
        options.platform_version = args.platform_version.clone();
    }
    if args.enable_dynamic_install {
        options.enable_dynamic_install = true;
    }
    if let Some(url) = &args.sdk_storage_url {
        options.sdk_storage_base_url = url.clone();
    }
    if let Some(blocked) = &args.blocked_versions {
        options.blocked_versions = parse_block_list(blocked);
    }
    if let Some(sdk_root) = &args.sdk_root {
        options.installed_sdk_root = sdk_root.clone();
    }
    debug!("{}", options);

    let cancel = CancellationToken::new();
    cancel_on_interrupt(&cancel);

    let view = SourceView::for_directory(&root);
    let orchestrator = BuildOrchestrator::new().with_build_options(build_options(args, &options));
    let plan = match orchestrator.build(&view, &options, &cancel).await {
        Ok(plan) => plan,
        Err(e) => return report(&e),
    };
    for decision in &plan.decisions {
        info!(
            platform = %decision.platform,
            version = %decision.version,
            source = ?decision.source,
            "Building platform"
        );
    }

    let rendered = match args.format {
        PlanFormatArg::Script => Ok(plan.script.text.clone()),
        PlanFormatArg::Json => OutputFormatter::new(OutputFormat::Json).format_plan(&plan),
        PlanFormatArg::Yaml => OutputFormatter::new(OutputFormat::Yaml).format_plan(&plan),
    };
    match rendered.and_then(|output| write_output(&output, args.output.as_deref())) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => report_anyhow(&e),
    }
}

fn resolve_version(args: &ResolveVersionArgs) -> Result<(VersionSpecifier, String)> {
    let mut versions: Vec<String> = args
        .versions
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    if versions.is_empty() {
        bail!("--versions must list at least one version");
    }
    sort_versions(&mut versions);

    let default_version = match &args.default {
        Some(default) => default.clone(),
        None => select_default(&versions, None)
            .context("--versions must list at least one version")?,
    };
    let info = PlatformVersionInfo {
        supported_versions: versions.into_iter().collect(),
        default_version,
        source: VersionSource::OnDisk,
    };

    let specifier = match (&args.spec, args.policy, &args.base) {
        (Some(spec), _, _) => VersionSpecifier::from_request(spec),
        (None, Some(policy), Some(base)) => VersionSpecifier::policy(base.clone(), policy),
        _ => VersionSpecifier::Unspecified,
    };
    let blocked = args
        .blocked
        .as_deref()
        .map(parse_block_list)
        .unwrap_or_default();

    let version = resolve(&specifier, &info, &blocked)?;
    Ok((specifier, version))
}

pub fn handle_resolve_version(args: &ResolveVersionArgs) -> i32 {
    let result = resolve_version(args).and_then(|(specifier, version)| {
        OutputFormatter::new(OutputFormat::Human).format_resolution(&specifier, &version)
    });
    match result.and_then(|output| write_output(&output, None)) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => report_anyhow(&e),
    }
}

pub fn handle_platforms(args: &PlatformsArgs) -> i32 {
    let formatter = OutputFormatter::new(OutputFormat::from(args.format));
    match formatter
        .format_platforms(PlatformId::all_variants())
        .and_then(|output| write_output(&output, None))
    {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => report_anyhow(&e),
    }
}
