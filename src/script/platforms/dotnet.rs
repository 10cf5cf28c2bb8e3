use crate::platform::attributes::*;
use crate::platform::{DetectionResult, PlatformId};
use crate::script::composer::{common_parameters, ScriptComposer};
use crate::script::fragment::{names, FragmentTemplate, Parameters};
use crate::script::options::BuildOptions;
use crate::version::ResolvedVersion;

const FRAGMENTS: &[FragmentTemplate] = &[
    FragmentTemplate::required(
        names::RUNTIME_ENVIRONMENT,
        r#"export DOTNET_ROOT="{{sdk_root}}"
export PATH="$DOTNET_ROOT:$PATH"
export DOTNET_CLI_TELEMETRY_OPTOUT=1
export DOTNET_SKIP_FIRST_TIME_EXPERIENCE=1
dotnet --version"#,
    ),
    FragmentTemplate::guarded(
        names::PACKAGE_MANAGER,
        "dotnet workload install {{workload}}",
        "workload",
    ),
    FragmentTemplate::required(
        names::DEPENDENCY_INSTALL,
        r#"cd "$SOURCE_DIR"
dotnet restore "{{project_file}}""#,
    ),
    FragmentTemplate::required(
        names::BUILD,
        r#"cd "$SOURCE_DIR"
dotnet {{build_verb}} "{{project_file}}" --no-restore -c {{configuration}} -o "$DESTINATION_DIR""#,
    ),
    FragmentTemplate::guarded(names::POST_BUILD, "{{package_command}}", "package_command"),
];

pub struct DotNetComposer;

/// Class libraries have nothing to publish; they are only built.
fn build_verb(detection: &DetectionResult) -> &'static str {
    match detection.attribute(OUTPUT_TYPE) {
        Some(kind) if kind.eq_ignore_ascii_case("library") => "build",
        _ => "publish",
    }
}

impl ScriptComposer for DotNetComposer {
    fn platform(&self) -> PlatformId {
        PlatformId::DotNet
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
        parameters
            .set_opt("project_file", detection.attribute(PROJECT_FILE))
            .set("configuration", options.dotnet_configuration.clone())
            .set("build_verb", build_verb(detection));
        if detection.flag(IS_BLAZOR_WASM) {
            parameters.set("workload", "wasm-tools");
        }
        parameters
    }
}
