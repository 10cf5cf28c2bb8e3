use super::{select_default, PlatformVersionInfo, VersionProvider, VersionSource};
use crate::error::ProviderError;
use crate::fs::FileSystem;
use crate::platform::PlatformId;
use crate::version::sdk_version::{sort_versions, SdkVersion};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Versions of an SDK installed under a root directory with one
/// subdirectory per version, e.g. `/opt/python/3.9.7`.
pub struct OnDiskVersionProvider {
    platform: PlatformId,
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    preferred_default: Option<String>,
    cached: OnceCell<Result<PlatformVersionInfo, ProviderError>>,
}

impl OnDiskVersionProvider {
    pub fn new(platform: PlatformId, fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            fs,
            root: root.into(),
            preferred_default: None,
            cached: OnceCell::new(),
        }
    }

    /// Default to this version when it is installed.
    pub fn with_default_version(mut self, version: impl Into<String>) -> Self {
        self.preferred_default = Some(version.into());
        self
    }

    fn enumerate(&self) -> Result<PlatformVersionInfo, ProviderError> {
        let not_installed = || ProviderError::NoVersionsInstalled {
            platform: self.platform,
            root: self.root.clone(),
        };

        let entries = self.fs.read_dir(&self.root).map_err(|_| not_installed())?;
        let mut versions: Vec<String> = entries
            .into_iter()
            .filter(|e| e.is_dir())
            .map(|e| e.name)
            .filter(|name| SdkVersion::parse(name).is_ok())
            .collect();
        sort_versions(&mut versions);

        let default_version = select_default(&versions, self.preferred_default.as_deref())
            .ok_or_else(not_installed)?;

        debug!(
            platform = %self.platform,
            root = %self.root.display(),
            count = versions.len(),
            default = %default_version,
            "Enumerated installed versions"
        );

        Ok(PlatformVersionInfo {
            supported_versions: versions.into_iter().collect(),
            default_version,
            source: VersionSource::OnDisk,
        })
    }
}

#[async_trait]
impl VersionProvider for OnDiskVersionProvider {
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
        self.cached
            .get_or_init(|| async { self.enumerate() })
            .await
            .clone()
    }
}
