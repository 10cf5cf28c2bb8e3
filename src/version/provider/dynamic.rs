use super::{select_default, PlatformVersionInfo, VersionProvider, VersionSource};
use crate::error::ProviderError;
use crate::platform::PlatformId;
use crate::version::sdk_version::sort_versions;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const LISTING_QUERY: &str = "restype=container&comp=list&include=metadata";

/// Versions published in a remote SDK storage container.
///
/// The container listing is an XML document of blobs, each carrying its
/// version in `Metadata/Version`:
///
/// ```xml
/// <EnumerationResults>
///   <Blobs>
///     <Blob>
///       <Name>python-3.9.7.tar.gz</Name>
///       <Metadata><Version>3.9.7</Version></Metadata>
///     </Blob>
///   </Blobs>
/// </EnumerationResults>
/// ```
///
/// At most one request is made per provider instance; its outcome, success
/// or failure, is kept for the rest of the run.
pub struct DynamicVersionProvider {
    platform: PlatformId,
    base_url: String,
    timeout: Duration,
    preferred_default: Option<String>,
    cached: OnceCell<Result<PlatformVersionInfo, ProviderError>>,
}

impl DynamicVersionProvider {
    pub fn new(platform: PlatformId, base_url: &str) -> Self {
        Self {
            platform,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            preferred_default: None,
            cached: OnceCell::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Default to this version when the manifest lists it.
    pub fn with_default_version(mut self, version: impl Into<String>) -> Self {
        self.preferred_default = Some(version.into());
        self
    }

    pub fn manifest_url(&self) -> String {
        format!("{}/{}?{}", self.base_url, self.platform.name(), LISTING_QUERY)
    }

    fn unavailable(&self, reason: impl Into<String>) -> ProviderError {
        ProviderError::Unavailable {
            platform: self.platform,
            reason: reason.into(),
        }
    }

    async fn fetch(&self) -> Result<PlatformVersionInfo, ProviderError> {
        let url = self.manifest_url();
        info!(platform = %self.platform, url = %url, "Fetching version manifest");

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| self.unavailable(format!("failed to create HTTP client: {}", e)))?;

        let response = client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                self.unavailable(format!("request to {} timed out after {:?}", url, self.timeout))
            } else {
                self.unavailable(format!("request to {} failed: {}", url, e))
            }
        })?;

        if !response.status().is_success() {
            return Err(self.unavailable(format!(
                "manifest request to {} returned HTTP {}",
                url,
                response.status()
            )));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                self.unavailable(format!("reading {} timed out after {:?}", url, self.timeout))
            } else {
                self.unavailable(format!("failed to read manifest body: {}", e))
            }
        })?;

        let versions = parse_manifest(&body).map_err(|e| self.unavailable(e))?;
        self.build_info(versions)
    }

    fn build_info(&self, versions: BTreeSet<String>) -> Result<PlatformVersionInfo, ProviderError> {
        let mut sorted: Vec<String> = versions.iter().cloned().collect();
        sort_versions(&mut sorted);

        let default_version = select_default(&sorted, self.preferred_default.as_deref())
            .ok_or_else(|| self.unavailable("manifest lists no versions"))?;

        debug!(
            platform = %self.platform,
            count = versions.len(),
            default = %default_version,
            "Parsed version manifest"
        );

        Ok(PlatformVersionInfo {
            supported_versions: versions,
            default_version,
            source: VersionSource::Dynamic,
        })
    }
}

/// Distinct `Metadata/Version` values of a container listing.
pub fn parse_manifest(body: &str) -> Result<BTreeSet<String>, String> {
    let document =
        roxmltree::Document::parse(body).map_err(|e| format!("malformed manifest: {}", e))?;

    let versions: BTreeSet<String> = document
        .descendants()
        .filter(|node| node.has_tag_name("Version"))
        .filter(|node| {
            node.parent_element()
                .map(|parent| parent.has_tag_name("Metadata"))
                .unwrap_or(false)
        })
        .filter_map(|node| node.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect();

    if versions.is_empty() {
        return Err("manifest lists no versions".to_string());
    }
    Ok(versions)
}

#[async_trait]
impl VersionProvider for DynamicVersionProvider {
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
            .get_or_init(|| async {
                tokio::select! {
                    _ = cancel.cancelled() => Err(ProviderError::Cancelled),
                    result = self.fetch() => result,
                }
            })
            .await
            .clone()
    }
}
