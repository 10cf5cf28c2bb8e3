//! Version requests, the versions a platform supports, and matching one
//! against the other.

mod blocklist;
mod policy;
pub mod provider;
mod resolver;
mod sdk_version;
mod specifier;

pub use blocklist::{is_blocked, parse_block_list};
pub use policy::select as select_by_policy;
pub use provider::{
    select_default, DefaultProviderSource, DynamicVersionProvider, FallbackVersionProvider,
    OnDiskVersionProvider, PlatformVersionInfo, ProviderSource, StaticVersionProvider,
    VersionProvider, VersionSource,
};
pub use resolver::{parse_range, resolve, ResolvedVersion};
pub use sdk_version::{sort_versions, versions_equal, ParseVersionError, SdkVersion};
pub use specifier::{RollForwardPolicy, VersionSpecifier};
