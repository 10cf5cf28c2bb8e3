use super::{PlatformVersionInfo, VersionProvider, VersionSource};
use crate::error::ProviderError;
use crate::platform::PlatformId;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A fixed version set, for callers that already know what is available.
#[derive(Debug, Clone)]
pub struct StaticVersionProvider {
    platform: PlatformId,
    info: PlatformVersionInfo,
}

impl StaticVersionProvider {
    pub fn new(platform: PlatformId, versions: &[&str], default_version: &str) -> Self {
        Self {
            platform,
            info: PlatformVersionInfo {
                supported_versions: versions.iter().map(|v| v.to_string()).collect(),
                default_version: default_version.to_string(),
                source: VersionSource::OnDisk,
            },
        }
    }

    pub fn with_source(mut self, source: VersionSource) -> Self {
        self.info.source = source;
        self
    }
}

#[async_trait]
impl VersionProvider for StaticVersionProvider {
    fn platform(&self) -> PlatformId {
        self.platform
    }

    async fn version_info(
        &self,
        cancel: &CancellationToken,
    ) -> Result<PlatformVersionInfo, ProviderError> {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        Ok(self.info.clone())
    }
}
