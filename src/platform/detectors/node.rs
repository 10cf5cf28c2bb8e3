//! Node.js detection (npm, yarn, pnpm)

use crate::config::DetectionOptions;
use crate::platform::attributes::*;
use crate::platform::{has_iis_start_page, DetectionResult, PlatformDetector, PlatformId};
use crate::source::SourceView;
use tracing::debug;

const MANIFEST_FILES: &[&str] = &["package.json", "package-lock.json", "yarn.lock"];
const ENTRY_POINTS: &[&str] = &["server.js", "app.js"];

pub struct NodeDetector;

fn package_manager(view: &SourceView) -> &'static str {
    if view.is_file("yarn.lock") {
        "yarn"
    } else if view.is_file("pnpm-lock.yaml") {
        "pnpm"
    } else {
        "npm"
    }
}

impl PlatformDetector for NodeDetector {
    fn id(&self) -> PlatformId {
        PlatformId::Node
    }

    fn detect(&self, view: &SourceView, options: &DetectionOptions) -> Option<DetectionResult> {
        let manifest = MANIFEST_FILES.iter().find(|f| view.is_file(f)).copied();
        if manifest.is_none() {
            let has_entry_point = ENTRY_POINTS.iter().any(|f| view.is_file(f));
            if !has_entry_point {
                return None;
            }
            if has_iis_start_page(view) {
                debug!("Node entry point found next to an IIS start page, not a Node app");
                return None;
            }
        }

        let package_json: Option<serde_json::Value> = view
            .read_if_exists("package.json", options.max_file_read_bytes)
            .and_then(|content| serde_json::from_str(&content).ok());

        let engine_version = package_json
            .as_ref()
            .and_then(|json| json.pointer("/engines/node"))
            .and_then(|v| v.as_str())
            .map(|v| v.trim().to_string());

        let has_script = |name: &str| {
            package_json
                .as_ref()
                .and_then(|json| json.get("scripts"))
                .and_then(|scripts| scripts.get(name))
                .and_then(|s| s.as_str())
                .map(|s| !s.trim().is_empty())
                .unwrap_or(false)
        };

        let mut result = DetectionResult::new(PlatformId::Node)
            .with_version(engine_version)
            .with_attribute(PACKAGE_MANAGER, package_manager(view))
            .with_attribute(HAS_BUILD_SCRIPT, has_script("build"))
            .with_attribute(HAS_BUILD_AZURE_SCRIPT, has_script("build:azure"))
            .with_attribute(HAS_LERNA_CONFIG, view.is_file("lerna.json"));
        if let Some(manifest) = manifest {
            result = result.with_attribute(MANIFEST_FILE, manifest);
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::detectors::test_support::view;

    #[test]
    fn test_package_json_with_engines_and_scripts() {
        let package = r#"{
            "name": "web",
            "engines": { "node": ">=16 <19" },
            "scripts": { "build": "tsc -p .", "start": "node dist/index.js" }
        }"#;
        let view = view(&[("package.json", package), ("yarn.lock", "")]);
        let result = NodeDetector.detect(&view, &DetectionOptions::default()).unwrap();

        assert_eq!(result.detected_version.as_deref(), Some(">=16 <19"));
        assert_eq!(result.attribute(PACKAGE_MANAGER), Some("yarn"));
        assert_eq!(result.attribute(MANIFEST_FILE), Some("package.json"));
        assert!(result.flag(HAS_BUILD_SCRIPT));
        assert!(!result.flag(HAS_BUILD_AZURE_SCRIPT));
        assert!(!result.flag(HAS_LERNA_CONFIG));
    }

    #[test]
    fn test_pnpm_and_lerna() {
        let view = view(&[
            ("package.json", r#"{"scripts": {"build:azure": "lerna run build"}}"#),
            ("pnpm-lock.yaml", ""),
            ("lerna.json", "{}"),
        ]);
        let result = NodeDetector.detect(&view, &DetectionOptions::default()).unwrap();

        assert_eq!(result.attribute(PACKAGE_MANAGER), Some("pnpm"));
        assert!(result.flag(HAS_BUILD_AZURE_SCRIPT));
        assert!(result.flag(HAS_LERNA_CONFIG));
        assert_eq!(result.detected_version, None);
    }

    #[test]
    fn test_entry_point_without_manifest() {
        let view = view(&[("server.js", "require('http')")]);
        let result = NodeDetector.detect(&view, &DetectionOptions::default()).unwrap();
        assert_eq!(result.attribute(PACKAGE_MANAGER), Some("npm"));
        assert_eq!(result.attribute(MANIFEST_FILE), None);
    }

    #[test]
    fn test_iis_start_page_suppresses_entry_point() {
        let view = view(&[("app.js", ""), ("index.html", "<html/>")]);
        assert!(NodeDetector.detect(&view, &DetectionOptions::default()).is_none());
    }

    #[test]
    fn test_malformed_package_json_still_matches() {
        let view = view(&[("package.json", "{ not json")]);
        let result = NodeDetector.detect(&view, &DetectionOptions::default()).unwrap();
        assert_eq!(result.detected_version, None);
        assert!(!result.flag(HAS_BUILD_SCRIPT));
    }

    #[test]
    fn test_no_node_files() {
        let view = view(&[("index.js", ""), ("README.md", "")]);
        assert!(NodeDetector.detect(&view, &DetectionOptions::default()).is_none());
    }
}
