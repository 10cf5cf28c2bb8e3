use super::detectors::*;
use super::{DetectionResult, PlatformDetector, PlatformId};
use crate::config::DetectionOptions;
use crate::error::DetectionError;
use crate::source::SourceView;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Platforms found in a source tree. `results` is in priority order and its
/// first entry is the primary platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionOutcome {
    pub results: Vec<DetectionResult>,
    /// Platforms that matched but were left out of the build.
    pub shadowed: Vec<PlatformId>,
}

impl DetectionOutcome {
    pub fn primary(&self) -> Option<&DetectionResult> {
        self.results.first()
    }

    pub fn platforms(&self) -> Vec<PlatformId> {
        self.results.iter().map(|r| r.platform).collect()
    }
}

/// Static table of platform detectors, kept in detection priority order.
#[derive(Clone)]
pub struct DetectorRegistry {
    detectors: Vec<Arc<dyn PlatformDetector>>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DotNetDetector));
        registry.register(Arc::new(NodeDetector));
        registry.register(Arc::new(PythonDetector));
        registry.register(Arc::new(PhpDetector));
        registry.register(Arc::new(HugoDetector));
        registry.register(Arc::new(RubyDetector));
        registry.register(Arc::new(JavaDetector));
        registry.register(Arc::new(GolangDetector));
        registry
    }

    /// Adds a detector, replacing any existing one for the same platform.
    pub fn register(&mut self, detector: Arc<dyn PlatformDetector>) {
        self.detectors.retain(|d| d.id() != detector.id());
        self.detectors.push(detector);
        self.detectors.sort_by_key(|d| d.id().priority());
    }

    pub fn get(&self, platform: PlatformId) -> Option<&Arc<dyn PlatformDetector>> {
        self.detectors.iter().find(|d| d.id() == platform)
    }

    pub fn platforms(&self) -> Vec<PlatformId> {
        self.detectors.iter().map(|d| d.id()).collect()
    }

    /// Runs the detectors over `view` and applies the disambiguation rules:
    ///
    /// 1. A pinned platform runs alone and must match.
    /// 2. Otherwise every enabled detector runs, in priority order.
    /// 3. With several matches the first is primary. Later matches join only
    ///    when multi-platform builds are enabled and they are allowed as
    ///    secondary platforms; the rest are shadowed.
    /// 4. No match at all is an error.
    pub fn detect(
        &self,
        view: &SourceView,
        options: &DetectionOptions,
        cancel: &CancellationToken,
    ) -> Result<DetectionOutcome, DetectionError> {
        if let Some(pinned) = options.platform {
            return self.detect_pinned(pinned, view, options, cancel);
        }

        let mut matches = Vec::new();
        for detector in &self.detectors {
            if cancel.is_cancelled() {
                return Err(DetectionError::Cancelled);
            }
            let platform = detector.id();
            if !options.is_enabled(platform) {
                debug!(platform = %platform, "Platform disabled, skipping detector");
                continue;
            }
            match detector.detect(view, options) {
                Some(result) => {
                    debug!(platform = %platform, version = ?result.detected_version, "Detector matched");
                    matches.push(result);
                }
                None => debug!(platform = %platform, "Detector did not match"),
            }
        }

        let mut matches = matches.into_iter();
        let Some(primary) = matches.next() else {
            return Err(DetectionError::PlatformNotRecognized {
                root: view.root().to_path_buf(),
            });
        };

        let mut results = vec![primary];
        let mut shadowed = Vec::new();
        for result in matches {
            let joins = options.enable_multi_platform_build
                && options.secondary_platforms.contains(&result.platform);
            if joins {
                results.push(result);
            } else {
                shadowed.push(result.platform);
            }
        }

        let outcome = DetectionOutcome { results, shadowed };
        info!(
            platforms = ?outcome.platforms(),
            primary = %outcome.results[0].platform,
            "Detected platforms"
        );
        if !outcome.shadowed.is_empty() {
            info!(
                primary = %outcome.results[0].platform,
                shadowed = ?outcome.shadowed,
                "Additional platforms matched but are not part of the build"
            );
        }
        Ok(outcome)
    }

    fn detect_pinned(
        &self,
        pinned: PlatformId,
        view: &SourceView,
        options: &DetectionOptions,
        cancel: &CancellationToken,
    ) -> Result<DetectionOutcome, DetectionError> {
        if !options.is_enabled(pinned) {
            return Err(DetectionError::PinnedPlatformDisabled { platform: pinned });
        }
        if cancel.is_cancelled() {
            return Err(DetectionError::Cancelled);
        }

        let result = self
            .get(pinned)
            .and_then(|detector| detector.detect(view, options))
            .ok_or_else(|| DetectionError::PinnedPlatformNotDetected {
                platform: pinned,
                root: view.root().to_path_buf(),
            })?;

        info!(platform = %pinned, "Detected pinned platform");
        Ok(DetectionOutcome {
            results: vec![result],
            shadowed: Vec::new(),
        })
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
