//! Sources of the versions a platform supports.
//!
//! A provider is created for one run and memoizes what it learns, so a run
//! never asks the same source twice and separate runs never share results.

mod dynamic;
mod fallback;
mod fixed;
mod on_disk;

pub use dynamic::DynamicVersionProvider;
pub use fallback::FallbackVersionProvider;
pub use fixed::StaticVersionProvider;
pub use on_disk::OnDiskVersionProvider;

use crate::config::DetectionOptions;
use crate::error::ProviderError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::platform::PlatformId;
use crate::version::sdk_version::{versions_equal, SdkVersion};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VersionSource {
    OnDisk,
    Dynamic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformVersionInfo {
    pub supported_versions: BTreeSet<String>,
    pub default_version: String,
    pub source: VersionSource,
}

#[async_trait]
pub trait VersionProvider: Send + Sync {
    fn platform(&self) -> PlatformId;

    /// Supported versions and the default. Computed on first call and
    /// memoized for the lifetime of the provider.
    async fn version_info(
        &self,
        cancel: &CancellationToken,
    ) -> Result<PlatformVersionInfo, ProviderError>;
}

/// Default version for an ascending version list: the preferred version if
/// it is listed, else the highest stable version, else the highest version.
pub fn select_default(sorted: &[String], preferred: Option<&str>) -> Option<String> {
    preferred
        .and_then(|preferred| sorted.iter().find(|v| versions_equal(v, preferred)))
        .or_else(|| {
            sorted
                .iter()
                .rev()
                .find(|v| SdkVersion::parse(v).map(|v| !v.is_prerelease()).unwrap_or(false))
        })
        .or_else(|| sorted.last())
        .cloned()
}

/// Creates the version provider for a platform at the start of a run.
pub trait ProviderSource: Send + Sync {
    fn provider_for(
        &self,
        platform: PlatformId,
        options: &DetectionOptions,
    ) -> Box<dyn VersionProvider>;
}

/// Installed SDKs only, or the remote manifest backed by installed SDKs when
/// dynamic install is enabled.
pub struct DefaultProviderSource {
    fs: Arc<dyn FileSystem>,
}

impl DefaultProviderSource {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

impl Default for DefaultProviderSource {
    fn default() -> Self {
        Self::new(Arc::new(RealFileSystem::new()))
    }
}

impl ProviderSource for DefaultProviderSource {
    fn provider_for(
        &self,
        platform: PlatformId,
        options: &DetectionOptions,
    ) -> Box<dyn VersionProvider> {
        let preferred = options.default_versions.get(&platform);
        let mut on_disk = OnDiskVersionProvider::new(
            platform,
            self.fs.clone(),
            options.installed_sdk_root.join(platform.sdk_dir()),
        );
        if let Some(version) = preferred {
            on_disk = on_disk.with_default_version(version.clone());
        }

        if !options.enable_dynamic_install {
            return Box::new(on_disk);
        }

        let mut dynamic = DynamicVersionProvider::new(platform, &options.sdk_storage_base_url)
            .with_timeout(Duration::from_secs(options.manifest_timeout_secs));
        if let Some(version) = preferred {
            dynamic = dynamic.with_default_version(version.clone());
        }
        Box::new(FallbackVersionProvider::new(
            Box::new(dynamic),
            Some(Box::new(on_disk)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    #[test]
    fn test_select_default() {
        let sorted: Vec<String> = ["3.8.18", "3.9.7", "3.12.0-rc1"]
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(select_default(&sorted, None).as_deref(), Some("3.9.7"));
        assert_eq!(select_default(&sorted, Some("3.8.18")).as_deref(), Some("3.8.18"));
        assert_eq!(select_default(&sorted, Some("2.7")).as_deref(), Some("3.9.7"));
        assert_eq!(select_default(&[], None), None);
    }

    #[tokio::test]
    async fn test_default_source_uses_installed_sdks() {
        let fs = MockFileSystem::with_root("/sdks".into());
        fs.add_dir("nodejs/16.20.2");
        fs.add_dir("nodejs/18.17.1");
        let source = DefaultProviderSource::new(Arc::new(fs));
        let options = DetectionOptions {
            installed_sdk_root: "/sdks".into(),
            ..Default::default()
        };

        let provider = source.provider_for(PlatformId::Node, &options);
        let info = provider.version_info(&CancellationToken::new()).await.unwrap();

        assert_eq!(provider.platform(), PlatformId::Node);
        assert_eq!(info.source, VersionSource::OnDisk);
        assert_eq!(info.default_version, "18.17.1");
    }

    #[tokio::test]
    async fn test_dynamic_falls_back_to_installed_sdks() {
        let fs = MockFileSystem::with_root("/sdks".into());
        fs.add_dir("python/3.9.7");
        let source = DefaultProviderSource::new(Arc::new(fs));
        let options = DetectionOptions {
            installed_sdk_root: "/sdks".into(),
            enable_dynamic_install: true,
            // Nothing listens on port 9; the fetch fails fast.
            sdk_storage_base_url: "http://127.0.0.1:9".to_string(),
            manifest_timeout_secs: 2,
            ..Default::default()
        };

        let provider = source.provider_for(PlatformId::Python, &options);
        let info = provider.version_info(&CancellationToken::new()).await.unwrap();

        assert_eq!(info.source, VersionSource::OnDisk);
        assert!(info.supported_versions.contains("3.9.7"));
    }
}
