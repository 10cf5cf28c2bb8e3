use super::context::BuildContext;
use super::phase_trait::WorkflowPhase;
use super::phases::{ComposePhase, DetectPhase, ResolvePhase};
use crate::config::DetectionOptions;
use crate::error::BuildError;
use crate::platform::{DetectorRegistry, PlatformId};
use crate::script::{BuildOptions, BuildScript, ComposerRegistry, PlatformDecision};
use crate::source::SourceView;
use crate::version::{DefaultProviderSource, ProviderSource};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Result of a successful build run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPlan {
    pub script: BuildScript,
    pub decisions: Vec<PlatformDecision>,
    /// Platforms that matched but were not built.
    pub shadowed: Vec<PlatformId>,
}

/// Chains detection, version resolution and script composition.
pub struct BuildOrchestrator {
    detectors: Arc<DetectorRegistry>,
    composers: Arc<ComposerRegistry>,
    providers: Arc<dyn ProviderSource>,
    build_options: BuildOptions,
}

impl BuildOrchestrator {
    pub fn new() -> Self {
        Self {
            detectors: Arc::new(DetectorRegistry::with_defaults()),
            composers: Arc::new(ComposerRegistry::with_defaults()),
            providers: Arc::new(DefaultProviderSource::default()),
            build_options: BuildOptions::default(),
        }
    }

    pub fn with_provider_source(mut self, providers: Arc<dyn ProviderSource>) -> Self {
        self.providers = providers;
        self
    }

    pub fn with_build_options(mut self, build_options: BuildOptions) -> Self {
        self.build_options = build_options;
        self
    }

    pub fn with_detectors(mut self, detectors: Arc<DetectorRegistry>) -> Self {
        self.detectors = detectors;
        self
    }

    pub fn with_composers(mut self, composers: Arc<ComposerRegistry>) -> Self {
        self.composers = composers;
        self
    }

    pub fn build_options(&self) -> &BuildOptions {
        &self.build_options
    }

    /// Runs every phase over `view`. Any failure ends the run and no partial
    /// plan is returned.
    pub async fn build(
        &self,
        view: &SourceView,
        options: &DetectionOptions,
        cancel: &CancellationToken,
    ) -> Result<BuildPlan, BuildError> {
        options.validate()?;

        let start = Instant::now();
        info!(root = %view.root().display(), "Starting build orchestration");

        let mut context = BuildContext::new(
            view,
            options,
            &self.build_options,
            &self.detectors,
            &self.composers,
            self.providers.as_ref(),
            cancel,
        );

        let phases: [Box<dyn WorkflowPhase>; 3] = [
            Box::new(DetectPhase),
            Box::new(ResolvePhase),
            Box::new(ComposePhase),
        ];

        for phase in phases {
            let name = phase.name();
            if cancel.is_cancelled() {
                debug!(phase = name, "Cancelled before phase");
                return Err(BuildError::Cancelled { stage: name });
            }

            let phase_start = Instant::now();
            phase.execute(&mut context).await?;
            info!(
                phase = name,
                duration_ms = phase_start.elapsed().as_millis() as u64,
                "Phase complete"
            );
        }

        let shadowed = context
            .outcome
            .map(|outcome| outcome.shadowed)
            .unwrap_or_default();
        let script = context.script.ok_or(BuildError::Cancelled { stage: "composition" })?;

        info!(
            platforms = script.decisions.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Build orchestration complete"
        );

        Ok(BuildPlan {
            decisions: script.decisions.clone(),
            script,
            shadowed,
        })
    }
}

impl Default for BuildOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DetectionError, ResolutionError};
    use crate::fs::MockFileSystem;
    use crate::version::VersionSource;

    fn fixture() -> (SourceView, Arc<dyn ProviderSource>) {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("requirements.txt", "flask==3.0");
        fs.add_file("runtime.txt", "python-3.9.7");
        fs.add_dir("/opt/python/3.8.18");
        fs.add_dir("/opt/python/3.9.7");
        fs.add_dir("/opt/python/3.11.4");
        let view = SourceView::new(fs.clone(), "/mock");
        let providers: Arc<dyn ProviderSource> = Arc::new(DefaultProviderSource::new(fs));
        (view, providers)
    }

    #[tokio::test]
    async fn test_build_produces_plan() {
        let (view, providers) = fixture();
        let plan = BuildOrchestrator::new()
            .with_provider_source(providers)
            .build(&view, &DetectionOptions::default(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            plan.decisions,
            vec![PlatformDecision {
                platform: PlatformId::Python,
                version: "3.9.7".to_string(),
                source: VersionSource::OnDisk,
            }]
        );
        assert!(plan.script.text.contains("# python 3.9.7"));
        assert!(plan.shadowed.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_version_names_available_set() {
        let (view, providers) = fixture();
        let options = DetectionOptions {
            platform_version: Some("2.7.18".to_string()),
            ..Default::default()
        };
        let err = BuildOrchestrator::new()
            .with_provider_source(providers)
            .build(&view, &options, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            BuildError::Resolution {
                platform: PlatformId::Python,
                source: ResolutionError::VersionNotSupported { available, .. },
            } => assert_eq!(available, vec!["3.8.18", "3.9.7", "3.11.4"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_cancelled_before_first_phase() {
        let (view, providers) = fixture();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = BuildOrchestrator::new()
            .with_provider_source(providers)
            .build(&view, &DetectionOptions::default(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::Cancelled { stage: "detection" }));
    }

    #[tokio::test]
    async fn test_detection_failure_short_circuits() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("README.md", "# notes");
        let view = SourceView::new(fs, "/mock");
        let err = BuildOrchestrator::new()
            .build(&view, &DetectionOptions::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Detection(DetectionError::PlatformNotRecognized { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_options_are_rejected() {
        let (view, providers) = fixture();
        let options = DetectionOptions {
            manifest_timeout_secs: 0,
            ..Default::default()
        };
        let err = BuildOrchestrator::new()
            .with_provider_source(providers)
            .build(&view, &options, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::Config(_)));
    }
}
