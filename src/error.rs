//! Error taxonomy shared by detection, version resolution, script composition
//! and orchestration.

use crate::platform::PlatformId;
use std::path::PathBuf;
use thiserror::Error;

const MAX_LISTED_VERSIONS: usize = 12;

/// Renders a version set for an error message, truncated after a dozen entries.
pub fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        return "none".to_string();
    }
    if available.len() <= MAX_LISTED_VERSIONS {
        return available.join(", ");
    }
    format!(
        "{}, ... ({} more)",
        available[..MAX_LISTED_VERSIONS].join(", "),
        available.len() - MAX_LISTED_VERSIONS
    )
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(". Did you mean '{}'?", s))
        .unwrap_or_default()
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    #[error("Unknown platform '{name}'{}", suggestion_hint(.suggestion))]
    UnknownPlatform {
        name: String,
        suggestion: Option<String>,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetectionError {
    #[error("Platform '{platform}' was requested but not detected in {}", .root.display())]
    PinnedPlatformNotDetected { platform: PlatformId, root: PathBuf },

    #[error("Platform '{platform}' was requested but is disabled by configuration")]
    PinnedPlatformDisabled { platform: PlatformId },

    #[error("Could not detect any platform in {}", .root.display())]
    PlatformNotRecognized { root: PathBuf },

    #[error("Detection cancelled")]
    Cancelled,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Version information for '{platform}' is unavailable: {reason}")]
    Unavailable { platform: PlatformId, reason: String },

    #[error("No installed versions of '{platform}' found under {}", .root.display())]
    NoVersionsInstalled { platform: PlatformId, root: PathBuf },

    #[error("Version lookup cancelled")]
    Cancelled,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Version '{requested}' is not supported. Available versions: {}", format_available(.available))]
    VersionNotSupported {
        requested: String,
        available: Vec<String>,
    },

    #[error("Version '{requested}' is blocked by the configured block-list")]
    VersionBlocked { requested: String },

    #[error("Default version '{default}' is blocked by the configured block-list")]
    DefaultVersionBlocked { default: String },

    #[error("No version satisfies roll-forward policy '{policy}' from base '{base}'. Available versions: {}", format_available(.available))]
    PolicyUnsatisfied {
        base: String,
        policy: String,
        available: Vec<String>,
    },

    #[error("No version satisfies '{range}'. Available versions: {}", format_available(.available))]
    RangeUnsatisfied {
        range: String,
        available: Vec<String>,
    },

    #[error("Invalid version specifier '{specifier}': {reason}")]
    InvalidSpecifier { specifier: String, reason: String },

    #[error("Version information unavailable: {reason}")]
    VersionInfoUnavailable { reason: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompositionError {
    #[error("Fragment '{fragment}' of platform '{platform}' requires parameter '{parameter}' which was not provided")]
    MissingParameter {
        platform: PlatformId,
        fragment: String,
        parameter: String,
    },

    #[error("Fragment '{fragment}' of platform '{platform}' contains an unterminated placeholder")]
    UnterminatedPlaceholder {
        platform: PlatformId,
        fragment: String,
    },

    #[error("No script composer is registered for platform '{platform}'")]
    NoComposer { platform: PlatformId },

    #[error("Build property '{name}' is not a valid shell variable name")]
    InvalidPropertyName { name: String },

    #[error("Composition cancelled")]
    Cancelled,
}

/// Failure of a whole orchestration run. Partial results are never returned
/// alongside an error.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Detection(DetectionError),

    #[error("Failed to resolve a version for '{platform}': {source}")]
    Resolution {
        platform: PlatformId,
        #[source]
        source: ResolutionError,
    },

    #[error(transparent)]
    Composition(CompositionError),

    #[error("Build cancelled during {stage}")]
    Cancelled { stage: &'static str },
}

impl From<DetectionError> for BuildError {
    fn from(err: DetectionError) -> Self {
        match err {
            DetectionError::Cancelled => BuildError::Cancelled { stage: "detection" },
            other => BuildError::Detection(other),
        }
    }
}

impl From<CompositionError> for BuildError {
    fn from(err: CompositionError) -> Self {
        match err {
            CompositionError::Cancelled => BuildError::Cancelled {
                stage: "composition",
            },
            other => BuildError::Composition(other),
        }
    }
}

impl BuildError {
    /// True for failures caused by something outside the caller's input, where
    /// retrying the whole run may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BuildError::Resolution {
                source: ResolutionError::VersionInfoUnavailable { .. },
                ..
            }
        )
    }

    /// Returns a user-friendly error message with troubleshooting hints
    pub fn help_message(&self) -> String {
        match self {
            BuildError::Config(err) => format!(
                "Error: Invalid configuration\n\n\
                Help: Check the BUILDSMITH_* environment variables and command-line flags.\n\n\
                Details: {}",
                err
            ),
            BuildError::Detection(DetectionError::PlatformNotRecognized { root }) => format!(
                "Error: Could not detect the platform of the application\nPath: {}\n\n\
                Help: None of the supported platforms matched. Try:\n\
                - Check that the path points at the application root\n\
                - Pin the platform explicitly: --platform <name> (see `buildsmith platforms`)",
                root.display()
            ),
            BuildError::Detection(DetectionError::PinnedPlatformNotDetected { platform, root }) => {
                format!(
                    "Error: Platform '{}' was requested but its files were not found\nPath: {}\n\n\
                    Help: Check that the source directory contains a {} application, \
                    or remove the explicit platform to auto-detect.",
                    platform,
                    root.display(),
                    platform.display_name()
                )
            }
            BuildError::Detection(err) => format!("Error: {}", err),
            BuildError::Resolution { platform, source } => {
                let hint = match source {
                    ResolutionError::VersionBlocked { .. }
                    | ResolutionError::DefaultVersionBlocked { .. } => {
                        "Request a different version or remove it from BUILDSMITH_BLOCKED_VERSIONS."
                    }
                    ResolutionError::VersionInfoUnavailable { .. } => {
                        "The version manifest could not be fetched. Check network connectivity \
                        and BUILDSMITH_SDK_STORAGE_BASE_URL, or disable dynamic install to use \
                        installed SDKs."
                    }
                    ResolutionError::InvalidSpecifier { .. } => {
                        "Use an exact version (e.g. 3.9.7) or a range (e.g. ^16, >=7.4)."
                    }
                    _ => "Request one of the available versions, or omit the version to use the default.",
                };
                format!(
                    "Error: Could not resolve a {} version\n\n\
                    Help: {}\n\n\
                    Details: {}",
                    platform.display_name(),
                    hint,
                    source
                )
            }
            BuildError::Composition(err @ CompositionError::InvalidPropertyName { .. }) => format!(
                "Error: {}\n\n\
                Help: Property names must start with a letter or underscore and contain only \
                letters, digits and underscores.",
                err
            ),
            BuildError::Composition(err) => format!(
                "Error: Internal error while composing the build script\n\n\
                Details: {}",
                err
            ),
            BuildError::Cancelled { stage } => format!("Build cancelled during {}", stage),
        }
    }
}
