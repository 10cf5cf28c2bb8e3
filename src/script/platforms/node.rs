use crate::platform::attributes::*;
use crate::platform::{DetectionResult, PlatformId};
use crate::script::composer::{common_parameters, ScriptComposer};
use crate::script::fragment::{names, FragmentTemplate, Parameters};
use crate::script::options::BuildOptions;
use crate::version::ResolvedVersion;

const FRAGMENTS: &[FragmentTemplate] = &[
    FragmentTemplate::required(
        names::RUNTIME_ENVIRONMENT,
        r#"export NODE_VERSION="{{version}}"
export PATH="{{sdk_root}}/bin:$PATH"
node --version"#,
    ),
    FragmentTemplate::guarded(
        names::PACKAGE_MANAGER,
        "{{package_manager_setup}}",
        "package_manager_setup",
    ),
    FragmentTemplate::guarded(
        names::DEPENDENCY_INSTALL,
        r#"cd "$SOURCE_DIR"
{{install_command}}"#,
        "install_command",
    ),
    FragmentTemplate::guarded(
        names::BUILD,
        r#"cd "$SOURCE_DIR"
{{build_command}}"#,
        "build_command",
    ),
    FragmentTemplate::guarded(names::POST_BUILD, "{{package_command}}", "package_command"),
];

pub struct NodeComposer;

impl ScriptComposer for NodeComposer {
    fn platform(&self) -> PlatformId {
        PlatformId::Node
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
        let manager = detection.attribute(PACKAGE_MANAGER).unwrap_or("npm");
        let mut parameters = common_parameters(version, options);

        match manager {
            "yarn" => {
                parameters.set("package_manager_setup", "npm install -g yarn");
            }
            "pnpm" => {
                parameters.set("package_manager_setup", "npm install -g pnpm");
            }
            _ => {}
        }

        if detection.attribute(MANIFEST_FILE).is_some() {
            let install = match manager {
                "yarn" => "yarn install --prefer-offline",
                "pnpm" => "pnpm install",
                _ => "npm install",
            };
            parameters.set("install_command", install);
        }

        let build = if detection.flag(HAS_BUILD_AZURE_SCRIPT) {
            Some(format!("{} run build:azure", manager))
        } else if detection.flag(HAS_BUILD_SCRIPT) {
            Some(format!("{} run build", manager))
        } else if detection.flag(HAS_LERNA_CONFIG) {
            Some("npx lerna run build".to_string())
        } else {
            None
        };
        parameters.set_opt("build_command", build);
        parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::{VersionSource, VersionSpecifier};

    fn resolved() -> ResolvedVersion {
        ResolvedVersion {
            platform: PlatformId::Node,
            version: "18.17.1".to_string(),
            source: VersionSource::OnDisk,
            specifier: VersionSpecifier::Unspecified,
        }
    }

    #[test]
    fn test_yarn_project_with_build_script() {
        let detection = DetectionResult::new(PlatformId::Node)
            .with_attribute(MANIFEST_FILE, "package.json")
            .with_attribute(PACKAGE_MANAGER, "yarn")
            .with_attribute(HAS_BUILD_SCRIPT, true);
        let fragments = NodeComposer
            .compose(&detection, &resolved(), &BuildOptions::default())
            .unwrap();

        let emitted: Vec<&str> = fragments.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            emitted,
            vec![
                names::RUNTIME_ENVIRONMENT,
                names::PACKAGE_MANAGER,
                names::DEPENDENCY_INSTALL,
                names::BUILD
            ]
        );
        assert!(fragments[2].text.contains("yarn install"));
        assert!(fragments[3].text.contains("yarn run build"));
    }

    #[test]
    fn test_npm_has_no_package_manager_fragment() {
        let detection = DetectionResult::new(PlatformId::Node)
            .with_attribute(MANIFEST_FILE, "package.json")
            .with_attribute(HAS_BUILD_AZURE_SCRIPT, true)
            .with_attribute(HAS_BUILD_SCRIPT, true);
        let fragments = NodeComposer
            .compose(&detection, &resolved(), &BuildOptions::default())
            .unwrap();

        assert!(fragments.iter().all(|f| f.name != names::PACKAGE_MANAGER));
        assert!(fragments.last().unwrap().text.contains("npm run build:azure"));
    }

    #[test]
    fn test_packaging_adds_post_build() {
        let options = BuildOptions {
            should_package: true,
            ..Default::default()
        };
        let fragments = NodeComposer
            .compose(&DetectionResult::new(PlatformId::Node), &resolved(), &options)
            .unwrap();
        let last = fragments.last().unwrap();
        assert_eq!(last.name, names::POST_BUILD);
        assert!(last.text.contains("nodejs-output.tar.gz"));
    }
}
