use crate::platform::attributes::*;
use crate::platform::{DetectionResult, PlatformId};
use crate::script::composer::{common_parameters, ScriptComposer};
use crate::script::fragment::{names, FragmentTemplate, Parameters};
use crate::script::options::BuildOptions;
use crate::version::ResolvedVersion;

const DEFAULT_BINARY_NAME: &str = "app";

const FRAGMENTS: &[FragmentTemplate] = &[
    FragmentTemplate::required(
        names::RUNTIME_ENVIRONMENT,
        r#"export GOROOT="{{sdk_root}}"
export PATH="$GOROOT/bin:$PATH"
go version"#,
    ),
    FragmentTemplate::required(
        names::DEPENDENCY_INSTALL,
        r#"cd "$SOURCE_DIR"
go mod download"#,
    ),
    FragmentTemplate::required(
        names::BUILD,
        r#"cd "$SOURCE_DIR"
go build -o "$DESTINATION_DIR/{{binary_name}}" ."#,
    ),
    FragmentTemplate::guarded(names::POST_BUILD, "{{package_command}}", "package_command"),
];

pub struct GolangComposer;

/// Last path segment of the module, e.g. `api` for `github.com/acme/api`.
fn binary_name(detection: &DetectionResult) -> String {
    detection
        .attribute(MODULE_PATH)
        .and_then(|module| module.rsplit('/').next())
        .filter(|name| {
            !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        })
        .unwrap_or(DEFAULT_BINARY_NAME)
        .to_string()
}

impl ScriptComposer for GolangComposer {
    fn platform(&self) -> PlatformId {
        PlatformId::Golang
    }

    fn fragments(&self) -> &'static [FragmentTemplate] {
        FRAGMENTS
    }

    fn parameters(
        &self,
        detection: &DetectionResult,
        version: &ResolvedVersion,
        options: &BuildOptions,
    ) -> Parameters {
        let mut parameters = common_parameters(version, options);
        parameters.set("binary_name", binary_name(detection));
        parameters
    }
}
