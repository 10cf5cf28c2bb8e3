use crate::platform::attributes::*;
use crate::platform::{DetectionResult, PlatformId};
use crate::script::composer::{common_parameters, ScriptComposer};
use crate::script::fragment::{names, FragmentTemplate, Parameters};
use crate::script::options::BuildOptions;
use crate::version::ResolvedVersion;

const FRAGMENTS: &[FragmentTemplate] = &[
    FragmentTemplate::required(
        names::RUNTIME_ENVIRONMENT,
        r#"export PHP_VERSION="{{version}}"
export PATH="{{sdk_root}}/bin:$PATH"
php --version"#,
    ),
    FragmentTemplate::guarded(
        names::DEPENDENCY_INSTALL,
        r#"cd "$SOURCE_DIR"
{{install_command}}"#,
        "install_command",
    ),
    FragmentTemplate::guarded(names::POST_BUILD, "{{package_command}}", "package_command"),
];

pub struct PhpComposer;

impl ScriptComposer for PhpComposer {
    fn platform(&self) -> PlatformId {
        PlatformId::Php
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
        if detection.flag(HAS_COMPOSER) {
            parameters.set(
                "install_command",
                "composer install --no-dev --prefer-dist --no-interaction --optimize-autoloader",
            );
        }
        parameters
    }
}
