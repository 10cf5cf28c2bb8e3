//! buildsmith - platform detection and build script composition
//!
//! Given an application's source directory, buildsmith works out which
//! language platforms it uses, picks an SDK version for each one and
//! composes a bash script that builds the application.
//!
//! # Core Concepts
//!
//! - **Detection**: each [`platform::PlatformDetector`] inspects a read-only
//!   [`SourceView`] and reports whether its platform is present, along with
//!   the version the application asks for and other attributes.
//! - **Version resolution**: a [`version::VersionProvider`] lists the
//!   versions a platform supports (installed SDKs or a remote manifest) and
//!   [`version::resolve`] matches the request against them, honoring
//!   roll-forward policies and the block-list.
//! - **Composition**: each [`script::ScriptComposer`] fills its fragment
//!   table from the detection result and the resolved version.
//! - **Orchestration**: [`BuildOrchestrator`] chains the three and returns a
//!   [`BuildPlan`].
//!
//! # Example Usage
//!
//! ```no_run
//! use buildsmith::{BuildOrchestrator, DetectionOptions, SourceView};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), buildsmith::BuildError> {
//! let view = SourceView::for_directory("/src/app");
//! let plan = BuildOrchestrator::new()
//!     .build(&view, &DetectionOptions::default(), &CancellationToken::new())
//!     .await?;
//!
//! for decision in &plan.decisions {
//!     println!("{} {}", decision.platform, decision.version);
//! }
//! println!("{}", plan.script.text);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod pipeline;
pub mod platform;
pub mod script;
pub mod source;
pub mod util;
pub mod version;

pub use config::DetectionOptions;
pub use error::{BuildError, CompositionError, ConfigError, DetectionError, ProviderError, ResolutionError};
pub use pipeline::{BuildOrchestrator, BuildPlan};
pub use platform::{DetectionOutcome, DetectionResult, DetectorRegistry, PlatformDetector, PlatformId};
pub use script::{BuildOptions, BuildScript, ComposerRegistry, ScriptComposer};
pub use source::SourceView;
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};
pub use version::{ResolvedVersion, RollForwardPolicy, VersionSpecifier};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
