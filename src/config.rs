//! Run configuration for detection and version resolution

use crate::error::ConfigError;
use crate::platform::PlatformId;
use crate::version::parse_block_list;
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_SDK_STORAGE_BASE_URL: &str = "https://oryx-cdn.microsoft.io";
pub const DEFAULT_INSTALLED_SDK_ROOT: &str = "/opt";
pub const DEFAULT_MANIFEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_FILE_READ_BYTES: usize = 1_048_576; // 1MB
pub const DEFAULT_SECONDARY_PLATFORMS: &[PlatformId] = &[PlatformId::Node, PlatformId::Hugo];

/// Options for one detection/build run. Never mutated once the run starts.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOptions {
    /// Run only this platform's detector; a non-match is an error.
    pub platform: Option<PlatformId>,
    /// Version requested for the pinned (or otherwise primary) platform.
    pub platform_version: Option<String>,
    /// Per-platform version requests, e.g. from `PYTHON_VERSION`.
    pub version_overrides: BTreeMap<PlatformId, String>,
    /// Per-platform default used when nothing is requested and the version
    /// is available, e.g. from `PYTHON_DEFAULT_VERSION`.
    pub default_versions: BTreeMap<PlatformId, String>,
    /// Fetch supported versions from the remote manifest instead of only
    /// enumerating installed SDKs.
    pub enable_dynamic_install: bool,
    /// Versions that must never be selected, whatever their source.
    pub blocked_versions: Vec<String>,
    pub sdk_storage_base_url: String,
    pub installed_sdk_root: PathBuf,
    pub manifest_timeout_secs: u64,
    /// Allow more than one platform in a single build.
    pub enable_multi_platform_build: bool,
    /// Platforms allowed to join a build as secondary platforms.
    pub secondary_platforms: Vec<PlatformId>,
    pub disabled_platforms: Vec<PlatformId>,
    /// Upper bound on bytes read from any single source file.
    pub max_file_read_bytes: usize,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            platform: None,
            platform_version: None,
            version_overrides: BTreeMap::new(),
            default_versions: BTreeMap::new(),
            enable_dynamic_install: false,
            blocked_versions: Vec::new(),
            sdk_storage_base_url: DEFAULT_SDK_STORAGE_BASE_URL.to_string(),
            installed_sdk_root: PathBuf::from(DEFAULT_INSTALLED_SDK_ROOT),
            manifest_timeout_secs: DEFAULT_MANIFEST_TIMEOUT_SECS,
            enable_multi_platform_build: false,
            secondary_platforms: DEFAULT_SECONDARY_PLATFORMS.to_vec(),
            disabled_platforms: Vec::new(),
            max_file_read_bytes: DEFAULT_MAX_FILE_READ_BYTES,
        }
    }
}

fn env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match env::var(key) {
        Ok(v) if v.trim().is_empty() => Ok(None),
        Ok(v) => match v.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            _ => Err(ConfigError::ParseError {
                field: key.to_string(),
                error: format!("expected true or false, got '{}'", v),
            }),
        },
        Err(_) => Ok(None),
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(v) if v.trim().is_empty() => Ok(None),
        Ok(v) => v
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::ParseError {
                field: key.to_string(),
                error: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses a comma-separated list of platform names.
pub fn parse_platform_list(value: &str) -> Result<Vec<PlatformId>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

impl DetectionOptions {
    /// Reads options from the environment on top of the defaults.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `BUILDSMITH_PLATFORM` | `platform` |
    /// | `BUILDSMITH_PLATFORM_VERSION` | `platform_version` |
    /// | `{PLATFORM}_VERSION` (e.g. `NODE_VERSION`) | `version_overrides` |
    /// | `{PLATFORM}_DEFAULT_VERSION` | `default_versions` |
    /// | `BUILDSMITH_ENABLE_DYNAMIC_INSTALL` | `enable_dynamic_install` |
    /// | `BUILDSMITH_BLOCKED_VERSIONS` | `blocked_versions` |
    /// | `BUILDSMITH_SDK_STORAGE_BASE_URL` | `sdk_storage_base_url` |
    /// | `BUILDSMITH_INSTALLED_SDK_ROOT` | `installed_sdk_root` |
    /// | `BUILDSMITH_MANIFEST_TIMEOUT` | `manifest_timeout_secs` |
    /// | `BUILDSMITH_ENABLE_MULTIPLATFORM_BUILD` | `enable_multi_platform_build` |
    /// | `BUILDSMITH_SECONDARY_PLATFORMS` | `secondary_platforms` |
    /// | `DISABLE_{PLATFORM}_BUILD` | `disabled_platforms` |
    /// | `BUILDSMITH_MAX_FILE_SIZE` | `max_file_read_bytes` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut options = Self::default();

        if let Some(platform) = env_string("BUILDSMITH_PLATFORM") {
            options.platform = Some(platform.parse()?);
        }
        options.platform_version = env_string("BUILDSMITH_PLATFORM_VERSION");

        for id in PlatformId::all_variants() {
            if let Some(version) = env_string(&format!("{}_VERSION", id.env_prefix())) {
                options.version_overrides.insert(*id, version);
            }
            if let Some(version) = env_string(&format!("{}_DEFAULT_VERSION", id.env_prefix())) {
                options.default_versions.insert(*id, version);
            }
            if env_bool(&format!("DISABLE_{}_BUILD", id.env_prefix()))? == Some(true) {
                options.disabled_platforms.push(*id);
            }
        }

        if let Some(enabled) = env_bool("BUILDSMITH_ENABLE_DYNAMIC_INSTALL")? {
            options.enable_dynamic_install = enabled;
        }
        if let Some(blocked) = env_string("BUILDSMITH_BLOCKED_VERSIONS") {
            options.blocked_versions = parse_block_list(&blocked);
        }
        if let Some(url) = env_string("BUILDSMITH_SDK_STORAGE_BASE_URL") {
            options.sdk_storage_base_url = url;
        }
        if let Some(root) = env_string("BUILDSMITH_INSTALLED_SDK_ROOT") {
            options.installed_sdk_root = PathBuf::from(root);
        }
        if let Some(timeout) = env_parse::<u64>("BUILDSMITH_MANIFEST_TIMEOUT")? {
            options.manifest_timeout_secs = timeout;
        }
        if let Some(enabled) = env_bool("BUILDSMITH_ENABLE_MULTIPLATFORM_BUILD")? {
            options.enable_multi_platform_build = enabled;
        }
        if let Some(list) = env_string("BUILDSMITH_SECONDARY_PLATFORMS") {
            options.secondary_platforms = parse_platform_list(&list)?;
        }
        if let Some(max) = env_parse::<usize>("BUILDSMITH_MAX_FILE_SIZE")? {
            options.max_file_read_bytes = max;
        }

        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.manifest_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Manifest timeout must be at least 1 second".to_string(),
            ));
        }
        if self.manifest_timeout_secs > 300 {
            return Err(ConfigError::ValidationFailed(
                "Manifest timeout cannot exceed 5 minutes".to_string(),
            ));
        }

        if !(self.sdk_storage_base_url.starts_with("http://")
            || self.sdk_storage_base_url.starts_with("https://"))
        {
            return Err(ConfigError::ValidationFailed(format!(
                "SDK storage base URL must be http(s): {}",
                self.sdk_storage_base_url
            )));
        }

        if self.max_file_read_bytes < 1024 {
            return Err(ConfigError::ValidationFailed(
                "Max file size must be at least 1KB".to_string(),
            ));
        }
        if self.max_file_read_bytes > 10_485_760 {
            return Err(ConfigError::ValidationFailed(
                "Max file size cannot exceed 10MB".to_string(),
            ));
        }

        if let Some(platform) = self.platform {
            if self.disabled_platforms.contains(&platform) {
                return Err(ConfigError::ValidationFailed(format!(
                    "Platform '{}' is pinned but also disabled",
                    platform
                )));
            }
        }

        Ok(())
    }

    pub fn is_enabled(&self, platform: PlatformId) -> bool {
        !self.disabled_platforms.contains(&platform)
    }

    /// Explicit version requested for `platform`. `platform_version` applies
    /// to the pinned platform, or to the primary platform when nothing is
    /// pinned.
    pub fn requested_version(&self, platform: PlatformId, is_primary: bool) -> Option<&str> {
        if let Some(version) = self.version_overrides.get(&platform) {
            return Some(version.as_str());
        }
        let applies = match self.platform {
            Some(pinned) => pinned == platform,
            None => is_primary,
        };
        if applies {
            self.platform_version.as_deref()
        } else {
            None
        }
    }
}

impl fmt::Display for DetectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Detection Options:")?;
        writeln!(
            f,
            "  Platform: {}",
            self.platform.map(|p| p.name()).unwrap_or("auto")
        )?;
        if let Some(ref version) = self.platform_version {
            writeln!(f, "  Platform Version: {}", version)?;
        }
        for (platform, version) in &self.version_overrides {
            writeln!(f, "  {} Version: {}", platform.display_name(), version)?;
        }
        for (platform, version) in &self.default_versions {
            writeln!(f, "  {} Default Version: {}", platform.display_name(), version)?;
        }
        writeln!(f, "  Dynamic Install: {}", self.enable_dynamic_install)?;
        writeln!(f, "  Blocked Versions: {}", self.blocked_versions.join(", "))?;
        writeln!(f, "  SDK Storage: {}", self.sdk_storage_base_url)?;
        writeln!(f, "  Installed SDK Root: {}", self.installed_sdk_root.display())?;
        writeln!(f, "  Manifest Timeout: {}s", self.manifest_timeout_secs)?;
        writeln!(f, "  Multi-platform Build: {}", self.enable_multi_platform_build)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let options = DetectionOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.manifest_timeout_secs, DEFAULT_MANIFEST_TIMEOUT_SECS);
        assert_eq!(options.installed_sdk_root, PathBuf::from("/opt"));
        assert!(!options.enable_dynamic_install);
        assert_eq!(options.secondary_platforms, vec![PlatformId::Node, PlatformId::Hugo]);
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = [
            EnvGuard::set("BUILDSMITH_PLATFORM", "python"),
            EnvGuard::set("BUILDSMITH_PLATFORM_VERSION", "3.9"),
            EnvGuard::set("NODE_VERSION", "16"),
            EnvGuard::set("PYTHON_DEFAULT_VERSION", "3.11"),
            EnvGuard::set("BUILDSMITH_ENABLE_DYNAMIC_INSTALL", "true"),
            EnvGuard::set("BUILDSMITH_BLOCKED_VERSIONS", "2.0.0, 3.1 ,,"),
            EnvGuard::set("BUILDSMITH_MANIFEST_TIMEOUT", "30"),
            EnvGuard::set("DISABLE_RUBY_BUILD", "true"),
        ];

        let options = DetectionOptions::from_env().unwrap();

        assert_eq!(options.platform, Some(PlatformId::Python));
        assert_eq!(options.platform_version.as_deref(), Some("3.9"));
        assert_eq!(
            options.version_overrides.get(&PlatformId::Node).map(String::as_str),
            Some("16")
        );
        assert_eq!(
            options.default_versions.get(&PlatformId::Python).map(String::as_str),
            Some("3.11")
        );
        assert!(!options.version_overrides.contains_key(&PlatformId::Python));
        assert!(options.enable_dynamic_install);
        assert_eq!(options.blocked_versions, vec!["2.0.0", "3.1"]);
        assert_eq!(options.manifest_timeout_secs, 30);
        assert!(!options.is_enabled(PlatformId::Ruby));
        assert!(options.is_enabled(PlatformId::Python));
    }

    #[test]
    #[serial]
    fn test_unknown_platform_in_env_is_rejected() {
        let _guard = EnvGuard::set("BUILDSMITH_PLATFORM", "pyton");

        let err = DetectionOptions::from_env().unwrap_err();
        assert!(err.to_string().contains("Did you mean 'python'"));
    }

    #[test]
    #[serial]
    fn test_invalid_bool_is_rejected() {
        let _guard = EnvGuard::set("BUILDSMITH_ENABLE_MULTIPLATFORM_BUILD", "sometimes");

        let err = DetectionOptions::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let options = DetectionOptions {
            manifest_timeout_secs: 0,
            ..Default::default()
        };
        assert!(options.validate().is_err());

        let options = DetectionOptions {
            sdk_storage_base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(options.validate().is_err());

        let options = DetectionOptions {
            platform: Some(PlatformId::Php),
            disabled_platforms: vec![PlatformId::Php],
            ..Default::default()
        };
        assert!(options.validate().unwrap_err().to_string().contains("disabled"));
    }

    #[test]
    fn test_requested_version_precedence() {
        let mut options = DetectionOptions {
            platform_version: Some("3.9".to_string()),
            ..Default::default()
        };
        assert_eq!(options.requested_version(PlatformId::Python, true), Some("3.9"));
        assert_eq!(options.requested_version(PlatformId::Node, false), None);

        options.platform = Some(PlatformId::Node);
        assert_eq!(options.requested_version(PlatformId::Python, true), None);
        assert_eq!(options.requested_version(PlatformId::Node, false), Some("3.9"));

        options
            .version_overrides
            .insert(PlatformId::Node, "18.1.0".to_string());
        assert_eq!(options.requested_version(PlatformId::Node, false), Some("18.1.0"));
    }

    #[test]
    fn test_parse_platform_list() {
        assert_eq!(
            parse_platform_list("nodejs, hugo,").unwrap(),
            vec![PlatformId::Node, PlatformId::Hugo]
        );
        assert!(parse_platform_list("nodejs,cobol").is_err());
    }

    #[test]
    fn test_display() {
        let display = DetectionOptions::default().to_string();
        assert!(display.contains("Detection Options:"));
        assert!(display.contains("Platform: auto"));
    }
}
