use std::collections::BTreeMap;
use std::path::PathBuf;

pub const DEFAULT_SOURCE_DIR: &str = "$SOURCE_DIR";
pub const DEFAULT_OUTPUT_DIR: &str = "$DESTINATION_DIR";
pub const DEFAULT_DOTNET_CONFIGURATION: &str = "Release";

/// Options that shape the generated build script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub source_dir: String,
    pub output_dir: String,
    /// Root holding installed SDKs, one directory per platform and version.
    pub sdk_install_root: PathBuf,
    pub pre_build_command: Option<String>,
    pub post_build_command: Option<String>,
    /// Defaults to `pythonenv{major}.{minor}` of the resolved version.
    pub python_virtualenv_name: Option<String>,
    pub dotnet_configuration: String,
    /// Archive the build output into the destination directory.
    pub should_package: bool,
    /// Extra variables exported at the top of the script.
    pub properties: BTreeMap<String, String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            source_dir: DEFAULT_SOURCE_DIR.to_string(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            sdk_install_root: PathBuf::from(crate::config::DEFAULT_INSTALLED_SDK_ROOT),
            pre_build_command: None,
            post_build_command: None,
            python_virtualenv_name: None,
            dotnet_configuration: DEFAULT_DOTNET_CONFIGURATION.to_string(),
            should_package: false,
            properties: BTreeMap::new(),
        }
    }
}
