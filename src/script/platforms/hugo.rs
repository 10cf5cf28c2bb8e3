use crate::platform::{DetectionResult, PlatformId};
use crate::script::composer::{common_parameters, ScriptComposer};
use crate::script::fragment::{names, FragmentTemplate, Parameters};
use crate::script::options::BuildOptions;
use crate::version::ResolvedVersion;

const FRAGMENTS: &[FragmentTemplate] = &[
    FragmentTemplate::required(
        names::RUNTIME_ENVIRONMENT,
        r#"export HUGO_VERSION="{{version}}"
export PATH="{{sdk_root}}:$PATH"
hugo version"#,
    ),
    FragmentTemplate::required(
        names::BUILD,
        r#"cd "$SOURCE_DIR"
hugo --minify --destination "{{site_dir}}""#,
    ),
    FragmentTemplate::guarded(names::POST_BUILD, "{{package_command}}", "package_command"),
];

pub struct HugoComposer;

impl ScriptComposer for HugoComposer {
    fn platform(&self) -> PlatformId {
        PlatformId::Hugo
    }

    fn fragments(&self) -> &'static [FragmentTemplate] {
        FRAGMENTS
    }

    fn parameters(
        &self,
        _detection: &DetectionResult,
        version: &ResolvedVersion,
        options: &BuildOptions,
    ) -> Parameters {
        let mut parameters = common_parameters(version, options);
        parameters.set("site_dir", "$SOURCE_DIR/public");
        parameters
    }
}
