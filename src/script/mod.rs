//! Build script composition.
//!
//! Each platform contributes an ordered table of named fragments whose
//! `{{name}}` placeholders are filled from the detection result, the
//! resolved version and the build options. The registry stitches the
//! fragments of every platform in the build into one bash script.

mod builder;
mod composer;
mod fragment;
mod options;
pub mod platforms;

pub use builder::{is_shell_identifier, shell_quote, ShellScriptBuilder};
pub use composer::{
    common_parameters, render_fragments, BuildScript, ComposerRegistry, PlatformDecision,
    ScriptComposer,
};
pub use fragment::{names, FragmentTemplate, Parameters, ScriptFragment};
pub use options::{BuildOptions, DEFAULT_DOTNET_CONFIGURATION, DEFAULT_OUTPUT_DIR, DEFAULT_SOURCE_DIR};
