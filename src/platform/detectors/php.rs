use crate::config::DetectionOptions;
use crate::platform::attributes::*;
use crate::platform::{DetectionResult, PlatformDetector, PlatformId};
use crate::source::SourceView;

const SOURCE_SEARCH_DEPTH: usize = 2;

pub struct PhpDetector;

impl PlatformDetector for PhpDetector {
    fn id(&self) -> PlatformId {
        PlatformId::Php
    }

    fn detect(&self, view: &SourceView, options: &DetectionOptions) -> Option<DetectionResult> {
        let has_composer = view.is_file("composer.json");
        if !has_composer && !view.has_files_with_extension("php", SOURCE_SEARCH_DEPTH) {
            return None;
        }

        let version = view
            .read_if_exists("composer.json", options.max_file_read_bytes)
            .and_then(|content| serde_json::from_str::<serde_json::Value>(&content).ok())
            .and_then(|json| {
                json.pointer("/require/php")
                    .and_then(|v| v.as_str())
                    .map(|v| v.trim().to_string())
            });

        let mut result = DetectionResult::new(PlatformId::Php)
            .with_version(version)
            .with_attribute(HAS_COMPOSER, has_composer);
        if has_composer {
            result = result.with_attribute(MANIFEST_FILE, "composer.json");
        }
        Some(result)
    }
}
