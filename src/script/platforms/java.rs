use crate::platform::attributes::*;
use crate::platform::{DetectionResult, PlatformId};
use crate::script::composer::{common_parameters, ScriptComposer};
use crate::script::fragment::{names, FragmentTemplate, Parameters};
use crate::script::options::BuildOptions;
use crate::version::ResolvedVersion;

const FRAGMENTS: &[FragmentTemplate] = &[
    FragmentTemplate::required(
        names::RUNTIME_ENVIRONMENT,
        r#"export JAVA_HOME="{{sdk_root}}"
export PATH="$JAVA_HOME/bin:$PATH"
java -version"#,
    ),
    FragmentTemplate::guarded(
        names::BUILD,
        r#"cd "$SOURCE_DIR"
{{build_command}}
cp target/*.jar "$DESTINATION_DIR"/ 2>/dev/null || true"#,
        "build_command",
    ),
    FragmentTemplate::guarded(names::POST_BUILD, "{{package_command}}", "package_command"),
];

pub struct JavaComposer;

impl ScriptComposer for JavaComposer {
    fn platform(&self) -> PlatformId {
        PlatformId::Java
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
        if detection.flag(USES_MAVEN_WRAPPER) {
            parameters.set("build_command", "chmod +x mvnw\n./mvnw clean package -DskipTests");
        } else if detection.flag(USES_MAVEN) {
            parameters.set("build_command", "mvn clean package -DskipTests");
        }
        parameters
    }
}
