//! Read-only, cached view over an application source tree

mod view;

pub use view::{SourceView, IGNORED_DIRS};
