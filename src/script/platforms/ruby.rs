use crate::platform::attributes::*;
use crate::platform::{DetectionResult, PlatformId};
use crate::script::composer::{common_parameters, ScriptComposer};
use crate::script::fragment::{names, FragmentTemplate, Parameters};
use crate::script::options::BuildOptions;
use crate::version::ResolvedVersion;

const FRAGMENTS: &[FragmentTemplate] = &[
    FragmentTemplate::required(
        names::RUNTIME_ENVIRONMENT,
        r#"export RUBY_VERSION="{{version}}"
export PATH="{{sdk_root}}/bin:$PATH"
ruby --version"#,
    ),
    FragmentTemplate::guarded(names::PACKAGE_MANAGER, "{{bundler_install}}", "bundler_install"),
    FragmentTemplate::guarded(
        names::DEPENDENCY_INSTALL,
        r#"cd "$SOURCE_DIR"
bundle config set --local path vendor/bundle
bundle install"#,
        "bundler_install",
    ),
    FragmentTemplate::guarded(
        names::BUILD,
        r#"cd "$SOURCE_DIR"
{{build_command}}"#,
        "build_command",
    ),
    FragmentTemplate::guarded(names::POST_BUILD, "{{package_command}}", "package_command"),
];

pub struct RubyComposer;

impl ScriptComposer for RubyComposer {
    fn platform(&self) -> PlatformId {
        PlatformId::Ruby
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
        let has_gemfile = detection.flag(HAS_GEMFILE);

        if has_gemfile {
            let install = match detection.attribute(BUNDLER_VERSION) {
                Some(bundler) => format!("gem install bundler -v {}", bundler),
                None => "gem install bundler".to_string(),
            };
            parameters.set("bundler_install", install);
        }
        if detection.flag(IS_JEKYLL) {
            let jekyll = if has_gemfile { "bundle exec jekyll" } else { "jekyll" };
            parameters.set(
                "build_command",
                format!("{} build --destination \"$SOURCE_DIR/_site\"", jekyll),
            );
        }
        parameters
    }
}
