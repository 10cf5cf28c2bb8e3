//! State threaded through the build phases

use crate::config::DetectionOptions;
use crate::platform::{DetectionOutcome, DetectorRegistry};
use crate::script::{BuildOptions, BuildScript, ComposerRegistry};
use crate::source::SourceView;
use crate::version::{ProviderSource, ResolvedVersion};
use tokio_util::sync::CancellationToken;

/// Owns everything one build run reads and produces. Each phase fills in
/// the fields the next one needs.
pub struct BuildContext<'a> {
    pub view: &'a SourceView,
    pub options: &'a DetectionOptions,
    pub build_options: &'a BuildOptions,
    pub detectors: &'a DetectorRegistry,
    pub composers: &'a ComposerRegistry,
    pub providers: &'a dyn ProviderSource,
    pub cancel: &'a CancellationToken,

    /// Set by the detect phase.
    pub outcome: Option<DetectionOutcome>,
    /// One entry per detected platform, in the same order as `outcome`.
    pub resolved: Vec<ResolvedVersion>,
    /// Set by the compose phase.
    pub script: Option<BuildScript>,
}

impl<'a> BuildContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        view: &'a SourceView,
        options: &'a DetectionOptions,
        build_options: &'a BuildOptions,
        detectors: &'a DetectorRegistry,
        composers: &'a ComposerRegistry,
        providers: &'a dyn ProviderSource,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            view,
            options,
            build_options,
            detectors,
            composers,
            providers,
            cancel,
            outcome: None,
            resolved: Vec::new(),
            script: None,
        }
    }
}
