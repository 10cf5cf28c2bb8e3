//! Ruby detection (Bundler, Rack, Jekyll)

use crate::config::DetectionOptions;
use crate::platform::attributes::*;
use crate::platform::{has_iis_start_page, DetectionResult, PlatformDetector, PlatformId};
use crate::source::SourceView;
use regex::Regex;

const SIGNAL_FILES: &[&str] = &["Gemfile", "Gemfile.lock", "config.ru", "_config.yml"];

pub struct RubyDetector;

/// Rewrites a Bundler pessimistic constraint into range syntax:
/// `~> 2.7` allows any `2.x` from 2.7, `~> 2.7.1` any `2.7.x` from 2.7.1.
fn normalize_requirement(requirement: &str) -> String {
    let requirement = requirement.trim();
    match requirement.strip_prefix("~>") {
        Some(version) => {
            let version = version.trim();
            if version.split('.').count() >= 3 {
                format!("~{}", version)
            } else {
                format!("^{}", version)
            }
        }
        None => requirement.to_string(),
    }
}

/// `ruby "3.2.2"` or `ruby '~> 2.7'` in a Gemfile.
fn gemfile_ruby_version(content: &str) -> Option<String> {
    Regex::new(r#"(?m)^\s*ruby\s+['"]([^'"]+)['"]"#)
        .ok()?
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| normalize_requirement(m.as_str()))
}

/// The indented line following a section header such as `RUBY VERSION`.
fn lock_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let mut lines = content.lines();
    lines.find(|line| line.trim() == header)?;
    lines.next().map(str::trim).filter(|line| !line.is_empty())
}

/// `ruby 2.7.1p83` under `RUBY VERSION` in a Gemfile.lock.
fn lockfile_ruby_version(content: &str) -> Option<String> {
    let line = lock_section(content, "RUBY VERSION")?;
    let version = line.strip_prefix("ruby")?.trim();
    let version = version.split('p').next()?.trim();
    (!version.is_empty()).then(|| version.to_string())
}

fn bundler_version(content: &str) -> Option<String> {
    lock_section(content, "BUNDLED WITH").map(str::to_string)
}

impl PlatformDetector for RubyDetector {
    fn id(&self) -> PlatformId {
        PlatformId::Ruby
    }

    fn detect(&self, view: &SourceView, options: &DetectionOptions) -> Option<DetectionResult> {
        if !SIGNAL_FILES.iter().any(|f| view.is_file(f)) || has_iis_start_page(view) {
            return None;
        }

        let max_bytes = options.max_file_read_bytes;
        let gemfile = view.read_if_exists("Gemfile", max_bytes);
        let lockfile = view.read_if_exists("Gemfile.lock", max_bytes);

        let version = gemfile
            .as_deref()
            .and_then(gemfile_ruby_version)
            .or_else(|| lockfile.as_deref().and_then(lockfile_ruby_version));

        let mut result = DetectionResult::new(PlatformId::Ruby)
            .with_version(version)
            .with_attribute(HAS_GEMFILE, gemfile.is_some())
            .with_attribute(IS_JEKYLL, view.is_file("_config.yml"));
        if let Some(bundler) = lockfile.as_deref().and_then(bundler_version) {
            result = result.with_attribute(BUNDLER_VERSION, bundler);
        }
        Some(result)
    }
}
