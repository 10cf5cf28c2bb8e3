//! Platform detection: which runtime platform(s) a source tree targets.
//!
//! Each supported platform has one [`PlatformDetector`], registered in
//! priority order in the [`DetectorRegistry`]. Detectors only look at file
//! presence and simple content patterns through a [`SourceView`].

pub mod detectors;
mod id;
mod id_enum_macro;
mod registry;

pub use id::PlatformId;
pub use registry::{DetectionOutcome, DetectorRegistry};

use crate::config::DetectionOptions;
use crate::source::SourceView;
use crate::version::VersionSpecifier;
use serde::Serialize;
use std::collections::BTreeMap;

/// Well-known attribute keys recorded by detectors.
pub mod attributes {
    pub const MANIFEST_FILE: &str = "manifest_file";
    pub const PROJECT_FILE: &str = "project_file";
    pub const OUTPUT_TYPE: &str = "output_type";
    pub const IS_BLAZOR_WASM: &str = "is_blazor_wasm";
    pub const GLOBAL_JSON_SDK_VERSION: &str = "global_json_sdk_version";
    pub const GLOBAL_JSON_ROLL_FORWARD: &str = "global_json_roll_forward";
    pub const PACKAGE_MANAGER: &str = "package_manager";
    pub const HAS_BUILD_SCRIPT: &str = "has_build_script";
    pub const HAS_BUILD_AZURE_SCRIPT: &str = "has_build_azure_script";
    pub const HAS_LERNA_CONFIG: &str = "has_lerna_config";
    pub const REQUIREMENTS_FILE: &str = "requirements_file";
    pub const HAS_PYPROJECT: &str = "has_pyproject";
    pub const HAS_SETUP_PY: &str = "has_setup_py";
    pub const IS_CONDA: &str = "is_conda";
    pub const CONDA_ENVIRONMENT_FILE: &str = "conda_environment_file";
    pub const HAS_NOTEBOOKS: &str = "has_notebooks";
    pub const IS_DJANGO: &str = "is_django";
    pub const HAS_COMPOSER: &str = "has_composer";
    pub const CONFIG_FILE: &str = "config_file";
    pub const HAS_GEMFILE: &str = "has_gemfile";
    pub const BUNDLER_VERSION: &str = "bundler_version";
    pub const IS_JEKYLL: &str = "is_jekyll";
    pub const USES_MAVEN: &str = "uses_maven";
    pub const USES_MAVEN_WRAPPER: &str = "uses_maven_wrapper";
    pub const MODULE_PATH: &str = "module_path";
}

/// Start pages that mark a tree as a static IIS site rather than a
/// script-platform application.
const IIS_START_PAGES: &[&str] = &[
    "default.htm",
    "default.html",
    "default.asp",
    "index.htm",
    "index.html",
    "iisstart.htm",
];

pub(crate) fn has_iis_start_page(view: &SourceView) -> bool {
    view.list_top_level()
        .iter()
        .any(|name| IIS_START_PAGES.contains(&name.to_lowercase().as_str()))
}

/// One platform matched in a source tree, with the facts its detector found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionResult {
    pub platform: PlatformId,
    pub detected_version: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

impl DetectionResult {
    pub fn new(platform: PlatformId) -> Self {
        Self {
            platform,
            detected_version: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.detected_version = version.filter(|v| !v.trim().is_empty());
        self
    }

    pub fn with_attribute(mut self, key: &str, value: impl ToString) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// True when the attribute is present and equal to `"true"`.
    pub fn flag(&self, key: &str) -> bool {
        self.attribute(key) == Some("true")
    }
}

/// Decides whether a source tree belongs to one platform.
pub trait PlatformDetector: Send + Sync {
    fn id(&self) -> PlatformId;

    /// `None` means "not this platform"; detectors never fail.
    fn detect(&self, view: &SourceView, options: &DetectionOptions) -> Option<DetectionResult>;

    /// The version request for a detected platform: an explicit override
    /// first, then whatever the detector read from the source tree.
    fn version_specifier(
        &self,
        detection: &DetectionResult,
        options: &DetectionOptions,
        is_primary: bool,
    ) -> VersionSpecifier {
        options
            .requested_version(self.id(), is_primary)
            .or(detection.detected_version.as_deref())
            .map(VersionSpecifier::from_request)
            .unwrap_or(VersionSpecifier::Unspecified)
    }
}
