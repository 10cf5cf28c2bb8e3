//! .NET detection (C#, F#)

use crate::config::DetectionOptions;
use crate::platform::attributes::*;
use crate::platform::{DetectionResult, PlatformDetector, PlatformId};
use crate::source::SourceView;
use crate::version::{RollForwardPolicy, VersionSpecifier};
use tracing::debug;

const PROJECT_EXTENSIONS: &[&str] = &["csproj", "fsproj"];
const BLAZOR_WASM_SDK: &str = "Microsoft.NET.Sdk.BlazorWebAssembly";
const BLAZOR_WASM_PACKAGE: &str = "Microsoft.AspNetCore.Components.WebAssembly";

pub struct DotNetDetector;

#[derive(Debug, Default, PartialEq)]
struct ProjectInfo {
    target_framework: Option<String>,
    output_type: Option<String>,
    is_blazor_wasm: bool,
}

fn find_project_file(view: &SourceView) -> Option<String> {
    let at_depth = |depth: usize| -> Vec<String> {
        PROJECT_EXTENSIONS
            .iter()
            .flat_map(|ext| view.find_files_with_extension(ext, depth))
            .collect()
    };

    let mut root_projects = at_depth(1);
    root_projects.sort();
    if let Some(first) = root_projects.into_iter().next() {
        return Some(first);
    }

    let nested = at_depth(2);
    match nested.as_slice() {
        [only] => Some(only.clone()),
        [] => None,
        many => {
            debug!(count = many.len(), "Multiple nested .NET projects, none selected");
            None
        }
    }
}

fn parse_project(content: &str) -> ProjectInfo {
    let Ok(document) = roxmltree::Document::parse(content) else {
        return ProjectInfo::default();
    };
    let root = document.root_element();

    let property = |name: &str| {
        root.descendants()
            .find(|n| n.has_tag_name(name))
            .and_then(|n| n.text())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    };

    let target_framework = property("TargetFramework").or_else(|| {
        property("TargetFrameworks")
            .and_then(|list| list.split(';').next().map(|t| t.trim().to_string()))
    });

    let sdk_is_wasm = root
        .attribute("Sdk")
        .map(|sdk| sdk.eq_ignore_ascii_case(BLAZOR_WASM_SDK))
        .unwrap_or(false);
    let references_wasm = root.descendants().any(|n| {
        n.has_tag_name("PackageReference")
            && n.attribute("Include")
                .map(|name| name.eq_ignore_ascii_case(BLAZOR_WASM_PACKAGE))
                .unwrap_or(false)
    });

    ProjectInfo {
        target_framework,
        output_type: property("OutputType"),
        is_blazor_wasm: sdk_is_wasm || references_wasm,
    }
}

/// Maps a target framework moniker to a runtime version:
/// `netcoreapp3.1` is `3.1`, `net8.0` and `net8.0-windows` are `8.0`.
/// .NET Framework (`net48`) and `netstandard` monikers have no runtime.
pub fn runtime_version_from_tfm(tfm: &str) -> Option<String> {
    let tfm = tfm.trim().to_lowercase();
    let version = tfm
        .strip_prefix("netcoreapp")
        .or_else(|| tfm.strip_prefix("net").filter(|_| !tfm.starts_with("netstandard")))?;
    let version = version.split('-').next()?;

    let mut parts = version.split('.');
    let major = parts.next().filter(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))?;
    let minor = parts.next().filter(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))?;
    Some(format!("{}.{}", major, minor))
}

fn read_global_json(view: &SourceView, max_bytes: usize) -> Option<(String, Option<String>)> {
    let content = view.read_if_exists("global.json", max_bytes)?;
    let json: serde_json::Value = serde_json::from_str(&content).ok()?;
    let sdk = json.get("sdk")?;
    let version = sdk.get("version")?.as_str()?.trim().to_string();
    if version.is_empty() {
        return None;
    }
    let roll_forward = sdk
        .get("rollForward")
        .and_then(|r| r.as_str())
        .map(|r| r.trim().to_string());
    Some((version, roll_forward))
}

impl PlatformDetector for DotNetDetector {
    fn id(&self) -> PlatformId {
        PlatformId::DotNet
    }

    fn detect(&self, view: &SourceView, options: &DetectionOptions) -> Option<DetectionResult> {
        let project_file = find_project_file(view)?;
        let project = view
            .read_if_exists(&project_file, options.max_file_read_bytes)
            .map(|content| parse_project(&content))
            .unwrap_or_default();

        let runtime_version = project
            .target_framework
            .as_deref()
            .and_then(runtime_version_from_tfm);

        debug!(
            project = %project_file,
            target_framework = ?project.target_framework,
            "Detected .NET project"
        );

        let mut result = DetectionResult::new(PlatformId::DotNet)
            .with_version(runtime_version)
            .with_attribute(PROJECT_FILE, &project_file)
            .with_attribute(
                OUTPUT_TYPE,
                project.output_type.as_deref().unwrap_or("Exe"),
            )
            .with_attribute(IS_BLAZOR_WASM, project.is_blazor_wasm);

        if let Some((sdk_version, roll_forward)) =
            read_global_json(view, options.max_file_read_bytes)
        {
            result = result.with_attribute(GLOBAL_JSON_SDK_VERSION, sdk_version);
            if let Some(roll_forward) = roll_forward {
                result = result.with_attribute(GLOBAL_JSON_ROLL_FORWARD, roll_forward);
            }
        }

        Some(result)
    }

    /// Version requests address the SDK set: `global.json` pins an SDK with a
    /// roll-forward policy, and a bare runtime version means "the newest SDK
    /// of that runtime line".
    fn version_specifier(
        &self,
        detection: &DetectionResult,
        options: &DetectionOptions,
        is_primary: bool,
    ) -> VersionSpecifier {
        if let Some(requested) = options.requested_version(PlatformId::DotNet, is_primary) {
            return VersionSpecifier::from_request(requested);
        }

        if let Some(sdk_version) = detection.attribute(GLOBAL_JSON_SDK_VERSION) {
            let policy = detection
                .attribute(GLOBAL_JSON_ROLL_FORWARD)
                .and_then(|p| p.parse().ok())
                .unwrap_or(RollForwardPolicy::LatestPatch);
            return VersionSpecifier::policy(sdk_version, policy);
        }

        match detection.detected_version.as_deref() {
            Some(runtime) => {
                VersionSpecifier::policy(format!("{}.100", runtime), RollForwardPolicy::LatestFeature)
            }
            None => VersionSpecifier::Unspecified,
        }
    }
}
