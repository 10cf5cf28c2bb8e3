use crate::config::DetectionOptions;
use crate::platform::attributes::*;
use crate::platform::{DetectionResult, PlatformDetector, PlatformId};
use crate::source::SourceView;
use regex::Regex;

pub struct GolangDetector;

/// The `go 1.21` directive of a `go.mod`.
fn go_directive(content: &str) -> Option<String> {
    Regex::new(r"(?m)^go\s+(\d+(?:\.\d+)*)\s*$")
        .ok()?
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn module_path(content: &str) -> Option<String> {
    Regex::new(r"(?m)^module\s+(\S+)")
        .ok()?
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_matches('"').to_string())
}

impl PlatformDetector for GolangDetector {
    fn id(&self) -> PlatformId {
        PlatformId::Golang
    }

    fn detect(&self, view: &SourceView, options: &DetectionOptions) -> Option<DetectionResult> {
        if !view.is_file("go.mod") {
            return None;
        }
        let content = view
            .read_if_exists("go.mod", options.max_file_read_bytes)
            .unwrap_or_default();

        let mut result = DetectionResult::new(PlatformId::Golang)
            .with_version(go_directive(&content))
            .with_attribute(MANIFEST_FILE, "go.mod");
        if let Some(module) = module_path(&content) {
            result = result.with_attribute(MODULE_PATH, module);
        }
        Some(result)
    }
}
