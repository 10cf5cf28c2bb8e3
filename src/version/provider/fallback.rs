use super::{PlatformVersionInfo, VersionProvider};
use crate::error::ProviderError;
use crate::platform::PlatformId;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Asks `primary` first and `fallback` only when the primary source is
/// unreachable. Cancellation is never treated as a reason to fall back. When
/// both fail, the error carries both reasons.
pub struct FallbackVersionProvider {
    primary: Box<dyn VersionProvider>,
    fallback: Option<Box<dyn VersionProvider>>,
}

impl FallbackVersionProvider {
    pub fn new(
        primary: Box<dyn VersionProvider>,
        fallback: Option<Box<dyn VersionProvider>>,
    ) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl VersionProvider for FallbackVersionProvider {
    fn platform(&self) -> PlatformId {
        self.primary.platform()
    }

    async fn version_info(
        &self,
        cancel: &CancellationToken,
    ) -> Result<PlatformVersionInfo, ProviderError> {
        match self.primary.version_info(cancel).await {
            Err(ProviderError::Unavailable { platform, reason }) => match &self.fallback {
                Some(fallback) => {
                    warn!(
                        platform = %platform,
                        reason = %reason,
                        "Version manifest unavailable, using installed SDKs"
                    );
                    match fallback.version_info(cancel).await {
                        Err(ProviderError::Cancelled) => Err(ProviderError::Cancelled),
                        Err(fallback_err) => Err(ProviderError::Unavailable {
                            platform,
                            reason: format!("{}; fallback also failed: {}", reason, fallback_err),
                        }),
                        ok => ok,
                    }
                }
                None => Err(ProviderError::Unavailable { platform, reason }),
            },
            other => other,
        }
    }
}
