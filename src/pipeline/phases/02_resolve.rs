use crate::error::{BuildError, ProviderError, ResolutionError};
use crate::pipeline::context::BuildContext;
use crate::pipeline::phase_trait::WorkflowPhase;
use crate::platform::PlatformId;
use crate::version::{resolve, ResolvedVersion, VersionSpecifier};
use async_trait::async_trait;
use tracing::{debug, info};

pub struct ResolvePhase;

fn provider_failure(platform: PlatformId, err: ProviderError) -> BuildError {
    match err {
        ProviderError::Cancelled => BuildError::Cancelled { stage: "resolution" },
        ProviderError::Unavailable { reason, .. } => BuildError::Resolution {
            platform,
            source: ResolutionError::VersionInfoUnavailable { reason },
        },
        other @ ProviderError::NoVersionsInstalled { .. } => BuildError::Resolution {
            platform,
            source: ResolutionError::VersionInfoUnavailable {
                reason: other.to_string(),
            },
        },
    }
}

#[async_trait]
impl WorkflowPhase for ResolvePhase {
    fn name(&self) -> &'static str {
        "resolution"
    }

    async fn execute(&self, context: &mut BuildContext<'_>) -> Result<(), BuildError> {
        let detections = context
            .outcome
            .as_ref()
            .map(|outcome| outcome.results.clone())
            .unwrap_or_default();

        let mut resolved = Vec::with_capacity(detections.len());
        for (index, detection) in detections.iter().enumerate() {
            let platform = detection.platform;
            let specifier = context
                .detectors
                .get(platform)
                .map(|detector| detector.version_specifier(detection, context.options, index == 0))
                .unwrap_or(VersionSpecifier::Unspecified);
            debug!(platform = %platform, specifier = %specifier, "Selected version specifier");

            let provider = context.providers.provider_for(platform, context.options);
            let info = provider
                .version_info(context.cancel)
                .await
                .map_err(|err| provider_failure(platform, err))?;

            let version = resolve(&specifier, &info, &context.options.blocked_versions)
                .map_err(|source| BuildError::Resolution { platform, source })?;
            info!(platform = %platform, version = %version, source = ?info.source, "Resolved platform version");

            resolved.push(ResolvedVersion {
                platform,
                version,
                source: info.source,
                specifier,
            });
        }

        context.resolved = resolved;
        Ok(())
    }
}
