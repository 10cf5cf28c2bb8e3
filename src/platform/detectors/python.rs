//! Python detection (pip, pyproject, conda, notebooks)

use crate::config::DetectionOptions;
use crate::platform::attributes::*;
use crate::platform::{DetectionResult, PlatformDetector, PlatformId};
use crate::source::SourceView;
use tracing::debug;

const REQUIREMENTS_TXT: &str = "requirements.txt";
const CONDA_FILES: &[&str] = &["environment.yml", "environment.yaml"];
const CONDA_KEYS: &[&str] = &["channels", "dependencies"];
const SOURCE_SEARCH_DEPTH: usize = 2;

pub struct PythonDetector;

fn conda_environment_file(view: &SourceView, max_bytes: usize) -> Option<&'static str> {
    CONDA_FILES.iter().copied().find(|file| {
        view.read_if_exists(file, max_bytes)
            .and_then(|content| serde_yaml::from_str::<serde_yaml::Value>(&content).ok())
            .and_then(|yaml| {
                yaml.as_mapping()
                    .map(|map| CONDA_KEYS.iter().any(|key| map.contains_key(*key)))
            })
            .unwrap_or(false)
    })
}

/// `python-3.9.7` from `runtime.txt`.
fn runtime_txt_version(content: &str) -> Option<String> {
    let line = content.lines().next()?.trim();
    let version = line.strip_prefix("python-").unwrap_or(line).trim();
    (!version.is_empty()).then(|| version.to_string())
}

/// First non-comment line of `.python-version`.
fn python_version_file(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}

/// `[project] requires-python` when it pins a single numeric version.
fn pyproject_requires_python(content: &str) -> Option<String> {
    let table: toml::Table = toml::from_str(content).ok()?;
    let requires = table.get("project")?.get("requires-python")?.as_str()?.trim();
    let version = requires.strip_prefix("==").unwrap_or(requires).trim();
    let numeric = !version.is_empty()
        && version.split('.').all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));
    numeric.then(|| version.to_string())
}

fn detect_version(view: &SourceView, max_bytes: usize) -> Option<String> {
    view.read_if_exists("runtime.txt", max_bytes)
        .and_then(|c| runtime_txt_version(&c))
        .or_else(|| {
            view.read_if_exists(".python-version", max_bytes)
                .and_then(|c| python_version_file(&c))
        })
        .or_else(|| {
            view.read_if_exists("pyproject.toml", max_bytes)
                .and_then(|c| pyproject_requires_python(&c))
        })
}

impl PlatformDetector for PythonDetector {
    fn id(&self) -> PlatformId {
        PlatformId::Python
    }

    fn detect(&self, view: &SourceView, options: &DetectionOptions) -> Option<DetectionResult> {
        let max_bytes = options.max_file_read_bytes;
        let has_requirements = view.is_file(REQUIREMENTS_TXT);
        let has_pyproject = view.is_file("pyproject.toml");
        let has_setup_py = view.is_file("setup.py");
        let conda_file = conda_environment_file(view, max_bytes);
        let has_notebooks = view.has_files_with_extension("ipynb", SOURCE_SEARCH_DEPTH);

        let matched = has_requirements
            || has_pyproject
            || has_setup_py
            || conda_file.is_some()
            || has_notebooks
            || view.has_files_with_extension("py", SOURCE_SEARCH_DEPTH);
        if !matched {
            return None;
        }

        let version = detect_version(view, max_bytes);
        debug!(version = ?version, conda = conda_file.is_some(), "Detected Python app");

        let mut result = DetectionResult::new(PlatformId::Python)
            .with_version(version)
            .with_attribute(HAS_PYPROJECT, has_pyproject)
            .with_attribute(HAS_SETUP_PY, has_setup_py)
            .with_attribute(IS_CONDA, conda_file.is_some())
            .with_attribute(HAS_NOTEBOOKS, has_notebooks)
            .with_attribute(IS_DJANGO, view.is_file("manage.py"));
        if has_requirements {
            result = result.with_attribute(REQUIREMENTS_FILE, REQUIREMENTS_TXT);
        }
        if let Some(file) = conda_file {
            result = result.with_attribute(CONDA_ENVIRONMENT_FILE, file);
        }
        Some(result)
    }
}
