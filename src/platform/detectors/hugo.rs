//! Hugo static site detection.
//!
//! A plain `config.toml` is common to many tools, so a config file only counts
//! when its top level carries a key Hugo understands.

use crate::config::DetectionOptions;
use crate::platform::attributes::*;
use crate::platform::{DetectionResult, PlatformDetector, PlatformId};
use crate::source::SourceView;
use tracing::debug;

const CONFIG_STEMS: &[&str] = &["config", "hugo"];
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];
const CONFIG_DIR: &str = "config";

const HUGO_KEYS: &[&str] = &[
    "archetypedir",
    "baseurl",
    "contentdir",
    "languagecode",
    "layoutdir",
    "staticdir",
    "theme",
    "title",
];

pub struct HugoDetector;

fn top_level_keys(file_name: &str, content: &str) -> Vec<String> {
    let extension = file_name.rsplit('.').next().unwrap_or_default();
    match extension {
        "toml" => toml::from_str::<toml::Table>(content)
            .map(|table| table.keys().cloned().collect())
            .unwrap_or_default(),
        "yaml" | "yml" => serde_yaml::from_str::<serde_yaml::Mapping>(content)
            .map(|map| {
                map.keys()
                    .filter_map(|k| k.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default(),
        "json" => serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(content)
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn is_config_name(name: &str) -> bool {
    CONFIG_STEMS.iter().any(|stem| {
        CONFIG_EXTENSIONS
            .iter()
            .any(|ext| name == format!("{}.{}", stem, ext))
    })
}

fn is_hugo_config(view: &SourceView, relative_path: &str, max_bytes: usize) -> bool {
    let Some(content) = view.read_if_exists(relative_path, max_bytes) else {
        return false;
    };
    top_level_keys(relative_path, &content)
        .iter()
        .any(|key| HUGO_KEYS.contains(&key.to_lowercase().as_str()))
}

/// Config files to inspect: those at the root, then those in `config/` and
/// one directory below it (e.g. `config/_default/config.toml`).
fn candidate_configs(view: &SourceView) -> Vec<String> {
    let mut candidates: Vec<String> = view
        .list_top_level()
        .into_iter()
        .filter(|name| is_config_name(name))
        .collect();

    if view.is_dir(CONFIG_DIR) {
        let in_dir = |dir: &str| -> Vec<String> {
            view.list_dir(dir)
                .into_iter()
                .filter(|name| CONFIG_EXTENSIONS.iter().any(|ext| name.ends_with(&format!(".{}", ext))))
                .map(|name| format!("{}/{}", dir, name))
                .collect()
        };
        candidates.extend(in_dir(CONFIG_DIR));
        for sub in view.list_subdirectories(CONFIG_DIR) {
            candidates.extend(in_dir(&format!("{}/{}", CONFIG_DIR, sub)));
        }
    }

    candidates
}

impl PlatformDetector for HugoDetector {
    fn id(&self) -> PlatformId {
        PlatformId::Hugo
    }

    fn detect(&self, view: &SourceView, options: &DetectionOptions) -> Option<DetectionResult> {
        let config = candidate_configs(view)
            .into_iter()
            .find(|path| is_hugo_config(view, path, options.max_file_read_bytes))?;

        debug!(config = %config, "Detected Hugo site");
        Some(DetectionResult::new(PlatformId::Hugo).with_attribute(CONFIG_FILE, config))
    }
}
