use crate::config::DetectionOptions;
use crate::platform::attributes::*;
use crate::platform::{DetectionResult, PlatformDetector, PlatformId};
use crate::source::SourceView;

const SOURCE_SEARCH_DEPTH: usize = 8;
const VERSION_PROPERTIES: &[&str] = &["maven.compiler.release", "maven.compiler.source", "java.version"];

pub struct JavaDetector;

/// Java version from the `<properties>` of a `pom.xml`.
fn pom_java_version(content: &str) -> Option<String> {
    let document = roxmltree::Document::parse(content).ok()?;
    let properties = document
        .root_element()
        .children()
        .find(|n| n.has_tag_name("properties"))?;

    VERSION_PROPERTIES.iter().find_map(|name| {
        properties
            .children()
            .find(|n| n.has_tag_name(*name))
            .and_then(|n| n.text())
            .map(str::trim)
            .filter(|v| !v.is_empty() && !v.starts_with("${"))
            .map(str::to_string)
    })
}

impl PlatformDetector for JavaDetector {
    fn id(&self) -> PlatformId {
        PlatformId::Java
    }

    fn detect(&self, view: &SourceView, options: &DetectionOptions) -> Option<DetectionResult> {
        let has_sources = view.has_files_with_extension("java", SOURCE_SEARCH_DEPTH)
            || view.has_files_with_extension("jsp", SOURCE_SEARCH_DEPTH);
        if !has_sources {
            return None;
        }

        let uses_maven = view.is_file("pom.xml");
        let version = view
            .read_if_exists("pom.xml", options.max_file_read_bytes)
            .and_then(|content| pom_java_version(&content));

        let mut result = DetectionResult::new(PlatformId::Java)
            .with_version(version)
            .with_attribute(USES_MAVEN, uses_maven)
            .with_attribute(USES_MAVEN_WRAPPER, view.is_file("mvnw"));
        if uses_maven {
            result = result.with_attribute(MANIFEST_FILE, "pom.xml");
        }
        Some(result)
    }
}
