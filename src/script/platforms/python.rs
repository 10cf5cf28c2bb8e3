use crate::platform::attributes::*;
use crate::platform::{DetectionResult, PlatformId};
use crate::script::builder::ShellScriptBuilder;
use crate::script::composer::{common_parameters, ScriptComposer};
use crate::script::fragment::{names, FragmentTemplate, Parameters};
use crate::script::options::BuildOptions;
use crate::version::{ResolvedVersion, SdkVersion};

const FRAGMENTS: &[FragmentTemplate] = &[
    FragmentTemplate::required(
        names::RUNTIME_ENVIRONMENT,
        r#"export PYTHON_VERSION="{{version}}"
export PATH="{{sdk_root}}/bin:$PATH"
python --version"#,
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

pub struct PythonComposer;

fn virtualenv_name(version: &str, options: &BuildOptions) -> String {
    if let Some(name) = &options.python_virtualenv_name {
        return name.clone();
    }
    match SdkVersion::parse(version) {
        Ok(v) => format!("pythonenv{}.{}", v.major(), v.minor()),
        Err(_) => "pythonenv".to_string(),
    }
}

fn install_command(detection: &DetectionResult, version: &str, virtualenv: &str) -> Option<String> {
    let mut script = ShellScriptBuilder::new();

    if detection.flag(IS_CONDA) {
        let environment_file = detection
            .attribute(CONDA_ENVIRONMENT_FILE)
            .unwrap_or("environment.yml");
        script.add_command(format!(
            "conda env create --file {} --prefix ./{}",
            environment_file, virtualenv
        ));
        return Some(script.build());
    }

    let install = if let Some(requirements) = detection.attribute(REQUIREMENTS_FILE) {
        format!("pip install --no-cache-dir -r {}", requirements)
    } else if detection.flag(HAS_PYPROJECT) || detection.flag(HAS_SETUP_PY) {
        "pip install --no-cache-dir .".to_string()
    } else if detection.flag(HAS_NOTEBOOKS) {
        // Notebooks alone get a conda env with a kernel for the resolved Python.
        script.add_command(format!(
            "conda create --yes --prefix ./{} python={} ipykernel",
            virtualenv, version
        ));
        return Some(script.build());
    } else {
        return None;
    };

    script
        .add_command(format!("python -m venv {}", virtualenv))
        .add_command(format!("source {}/bin/activate", virtualenv))
        .add_command("pip install --upgrade pip")
        .add_command(install);
    Some(script.build())
}

impl ScriptComposer for PythonComposer {
    fn platform(&self) -> PlatformId {
        PlatformId::Python
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
        let virtualenv = virtualenv_name(&version.version, options);
        let mut parameters = common_parameters(version, options);
        parameters.set_opt("install_command", install_command(detection, &version.version, &virtualenv));
        if detection.flag(IS_DJANGO) {
            parameters.set("build_command", "python manage.py collectstatic --noinput");
        }
        parameters.set("virtualenv_name", virtualenv);
        parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::{VersionSource, VersionSpecifier};

    fn resolved(version: &str) -> ResolvedVersion {
        ResolvedVersion {
            platform: PlatformId::Python,
            version: version.to_string(),
            source: VersionSource::OnDisk,
            specifier: VersionSpecifier::Unspecified,
        }
    }

    #[test]
    fn test_requirements_install_uses_virtualenv() {
        let detection =
            DetectionResult::new(PlatformId::Python).with_attribute(REQUIREMENTS_FILE, "requirements.txt");
        let fragments = PythonComposer
            .compose(&detection, &resolved("3.10.4"), &BuildOptions::default())
            .unwrap();

        let emitted: Vec<&str> = fragments.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(emitted, vec![names::RUNTIME_ENVIRONMENT, names::DEPENDENCY_INSTALL]);
        assert!(fragments[1].text.contains("python -m venv pythonenv3.10"));
        assert!(fragments[1].text.contains("pip install --no-cache-dir -r requirements.txt"));
    }

    #[test]
    fn test_custom_virtualenv_and_django() {
        let detection = DetectionResult::new(PlatformId::Python)
            .with_attribute(HAS_PYPROJECT, true)
            .with_attribute(IS_DJANGO, true);
        let options = BuildOptions {
            python_virtualenv_name: Some("venv".to_string()),
            ..Default::default()
        };
        let fragments = PythonComposer
            .compose(&detection, &resolved("3.11"), &options)
            .unwrap();

        assert!(fragments[1].text.contains("source venv/bin/activate"));
        assert!(fragments[1].text.contains("pip install --no-cache-dir ."));
        assert_eq!(fragments[2].name, names::BUILD);
        assert!(fragments[2].text.contains("collectstatic"));
    }

    #[test]
    fn test_conda_environment() {
        let detection = DetectionResult::new(PlatformId::Python)
            .with_attribute(IS_CONDA, true)
            .with_attribute(CONDA_ENVIRONMENT_FILE, "environment.yml")
            .with_attribute(REQUIREMENTS_FILE, "requirements.txt");
        let fragments = PythonComposer
            .compose(&detection, &resolved("3.9.7"), &BuildOptions::default())
            .unwrap();
        assert!(fragments[1]
            .text
            .contains("conda env create --file environment.yml --prefix ./pythonenv3.9"));
        assert!(!fragments[1].text.contains("pip install"));
    }

    #[test]
    fn test_notebooks_only_get_conda_kernel() {
        let detection = DetectionResult::new(PlatformId::Python).with_attribute(HAS_NOTEBOOKS, true);
        let fragments = PythonComposer
            .compose(&detection, &resolved("3.11.4"), &BuildOptions::default())
            .unwrap();

        assert_eq!(fragments[1].name, names::DEPENDENCY_INSTALL);
        assert!(fragments[1]
            .text
            .contains("conda create --yes --prefix ./pythonenv3.11 python=3.11.4 ipykernel"));
    }

    #[test]
    fn test_notebooks_with_requirements_use_pip() {
        let detection = DetectionResult::new(PlatformId::Python)
            .with_attribute(HAS_NOTEBOOKS, true)
            .with_attribute(REQUIREMENTS_FILE, "requirements.txt");
        let fragments = PythonComposer
            .compose(&detection, &resolved("3.11.4"), &BuildOptions::default())
            .unwrap();

        assert!(fragments[1].text.contains("-r requirements.txt"));
        assert!(!fragments[1].text.contains("conda"));
    }

    #[test]
    fn test_scripts_only_skip_dependency_install() {
        let fragments = PythonComposer
            .compose(
                &DetectionResult::new(PlatformId::Python),
                &resolved("3.10.4"),
                &BuildOptions::default(),
            )
            .unwrap();
        assert_eq!(fragments.len(), 1);
    }
}
