use super::builder::{is_shell_identifier, shell_quote, ShellScriptBuilder};
use super::fragment::{FragmentTemplate, Parameters, ScriptFragment};
use super::options::BuildOptions;
use super::platforms::*;
use crate::error::CompositionError;
use crate::platform::{DetectionResult, PlatformId};
use crate::version::{ResolvedVersion, VersionSource};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Turns a detected, version-resolved platform into script fragments.
pub trait ScriptComposer: Send + Sync {
    fn platform(&self) -> PlatformId;

    /// The platform's fragment table, in emission order.
    fn fragments(&self) -> &'static [FragmentTemplate];

    /// Every value the platform's templates may reference.
    fn parameters(
        &self,
        detection: &DetectionResult,
        version: &ResolvedVersion,
        options: &BuildOptions,
    ) -> Parameters;

    fn compose(
        &self,
        detection: &DetectionResult,
        version: &ResolvedVersion,
        options: &BuildOptions,
    ) -> Result<Vec<ScriptFragment>, CompositionError> {
        let parameters = self.parameters(detection, version, options);
        render_fragments(self.platform(), self.fragments(), &parameters, &CancellationToken::new())
    }
}

/// Renders the enabled fragments of a table in order.
pub fn render_fragments(
    platform: PlatformId,
    templates: &[FragmentTemplate],
    parameters: &Parameters,
    cancel: &CancellationToken,
) -> Result<Vec<ScriptFragment>, CompositionError> {
    let mut fragments = Vec::new();
    for template in templates {
        if cancel.is_cancelled() {
            return Err(CompositionError::Cancelled);
        }
        if !template.is_enabled(parameters) {
            debug!(platform = %platform, fragment = template.name, "Skipping fragment");
            continue;
        }
        fragments.push(template.render(platform, parameters)?);
    }
    Ok(fragments)
}

/// Parameters every platform provides.
pub fn common_parameters(version: &ResolvedVersion, options: &BuildOptions) -> Parameters {
    let sdk_root = options
        .sdk_install_root
        .join(version.platform.sdk_dir())
        .join(&version.version);

    let mut parameters = Parameters::new();
    parameters
        .set("version", version.version.clone())
        .set("sdk_root", sdk_root.to_string_lossy());
    if options.should_package {
        parameters.set(
            "package_command",
            format!(
                "tar -czf \"$DESTINATION_DIR/{}-output.tar.gz\" -C \"$DESTINATION_DIR\" --exclude \"*.tar.gz\" .",
                version.platform.name()
            ),
        );
    }
    parameters
}

/// The platform and version a build script was composed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformDecision {
    pub platform: PlatformId,
    pub version: String,
    pub source: VersionSource,
}

/// A complete build script. Identical inputs always give identical text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildScript {
    pub fragments: Vec<ScriptFragment>,
    pub decisions: Vec<PlatformDecision>,
    pub text: String,
}

/// Static table of script composers, one per platform.
#[derive(Clone)]
pub struct ComposerRegistry {
    composers: Vec<Arc<dyn ScriptComposer>>,
}

impl ComposerRegistry {
    pub fn new() -> Self {
        Self {
            composers: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DotNetComposer));
        registry.register(Arc::new(NodeComposer));
        registry.register(Arc::new(PythonComposer));
        registry.register(Arc::new(PhpComposer));
        registry.register(Arc::new(HugoComposer));
        registry.register(Arc::new(RubyComposer));
        registry.register(Arc::new(JavaComposer));
        registry.register(Arc::new(GolangComposer));
        registry
    }

    pub fn register(&mut self, composer: Arc<dyn ScriptComposer>) {
        self.composers.retain(|c| c.platform() != composer.platform());
        self.composers.push(composer);
        self.composers.sort_by_key(|c| c.platform().priority());
    }

    pub fn get(&self, platform: PlatformId) -> Option<&Arc<dyn ScriptComposer>> {
        self.composers.iter().find(|c| c.platform() == platform)
    }

    pub fn composers(&self) -> &[Arc<dyn ScriptComposer>] {
        &self.composers
    }

    /// Composes the full script for `platforms`, which must already be in
    /// priority order with the primary platform first.
    pub fn compose_script(
        &self,
        platforms: &[(DetectionResult, ResolvedVersion)],
        options: &BuildOptions,
        cancel: &CancellationToken,
    ) -> Result<BuildScript, CompositionError> {
        if let Some(name) = options.properties.keys().find(|name| !is_shell_identifier(name)) {
            return Err(CompositionError::InvalidPropertyName { name: name.clone() });
        }

        let mut sections = Vec::new();
        for (detection, version) in platforms {
            let composer = self
                .get(detection.platform)
                .ok_or(CompositionError::NoComposer {
                    platform: detection.platform,
                })?;
            let parameters = composer.parameters(detection, version, options);
            let fragments =
                render_fragments(composer.platform(), composer.fragments(), &parameters, cancel)?;
            debug!(
                platform = %detection.platform,
                fragments = fragments.len(),
                "Composed platform fragments"
            );
            sections.push((version, fragments));
        }

        let text = assemble(&sections, options);
        let decisions = sections
            .iter()
            .map(|(version, _)| PlatformDecision {
                platform: version.platform,
                version: version.version.clone(),
                source: version.source,
            })
            .collect();
        let fragments = sections
            .into_iter()
            .flat_map(|(_, fragments)| fragments)
            .collect();

        Ok(BuildScript {
            fragments,
            decisions,
            text,
        })
    }
}

impl Default for ComposerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn assemble(sections: &[(&ResolvedVersion, Vec<ScriptFragment>)], options: &BuildOptions) -> String {
    let mut script = ShellScriptBuilder::new();
    script.add_command("#!/bin/bash").add_command("set -e").add_blank_line();

    script
        .add_export("SOURCE_DIR", &options.source_dir)
        .add_export("DESTINATION_DIR", &options.output_dir);
    for (name, value) in &options.properties {
        script.add_export(name, value);
    }
    script.add_mkdir("$DESTINATION_DIR").add_blank_line();

    if let Some(pre_build) = &options.pre_build_command {
        script
            .add_comment("Pre-build command")
            .add_command(format!("cd {}", shell_quote("$SOURCE_DIR")))
            .add_command(pre_build.clone())
            .add_blank_line();
    }

    for (version, fragments) in sections {
        script.add_comment(&format!("{} {}", version.platform, version.version));
        for fragment in fragments {
            script.add_command(fragment.text.clone()).add_blank_line();
        }
    }

    if let Some(post_build) = &options.post_build_command {
        script
            .add_comment("Post-build command")
            .add_command(format!("cd {}", shell_quote("$SOURCE_DIR")))
            .add_command(post_build.clone())
            .add_blank_line();
    }

    let mut text = script.build().trim_end().to_string();
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::VersionSpecifier;

    fn resolved(platform: PlatformId, version: &str) -> ResolvedVersion {
        ResolvedVersion {
            platform,
            version: version.to_string(),
            source: VersionSource::OnDisk,
            specifier: VersionSpecifier::Unspecified,
        }
    }

    #[test]
    fn test_registry_covers_every_platform() {
        let registry = ComposerRegistry::with_defaults();
        for platform in PlatformId::all_variants() {
            assert!(registry.get(*platform).is_some(), "no composer for {platform}");
        }
    }

    #[test]
    fn test_script_layout() {
        let options = BuildOptions {
            pre_build_command: Some("echo pre".to_string()),
            post_build_command: Some("echo post".to_string()),
            ..Default::default()
        };
        let platforms = vec![(
            DetectionResult::new(PlatformId::Golang),
            resolved(PlatformId::Golang, "1.21.5"),
        )];
        let script = ComposerRegistry::with_defaults()
            .compose_script(&platforms, &options, &CancellationToken::new())
            .unwrap();

        let text = &script.text;
        assert!(text.starts_with("#!/bin/bash\nset -e\n"));
        assert!(text.contains("export SOURCE_DIR=\"$SOURCE_DIR\""));
        let pre = text.find("echo pre").unwrap();
        let banner = text.find("# golang 1.21.5").unwrap();
        let post = text.find("echo post").unwrap();
        assert!(pre < banner && banner < post);
        assert_eq!(
            script.decisions,
            vec![PlatformDecision {
                platform: PlatformId::Golang,
                version: "1.21.5".to_string(),
                source: VersionSource::OnDisk,
            }]
        );
    }

    #[test]
    fn test_properties_are_exported() {
        let mut options = BuildOptions::default();
        options
            .properties
            .insert("APP_ENV".to_string(), "production".to_string());
        let platforms = vec![(
            DetectionResult::new(PlatformId::Hugo),
            resolved(PlatformId::Hugo, "0.119.0"),
        )];
        let script = ComposerRegistry::with_defaults()
            .compose_script(&platforms, &options, &CancellationToken::new())
            .unwrap();
        assert!(script.text.contains("export APP_ENV=\"production\""));
    }

    #[test]
    fn test_missing_composer() {
        let platforms = vec![(
            DetectionResult::new(PlatformId::Ruby),
            resolved(PlatformId::Ruby, "3.2.2"),
        )];
        let err = ComposerRegistry::new()
            .compose_script(&platforms, &BuildOptions::default(), &CancellationToken::new())
            .unwrap_err();
        assert_eq!(
            err,
            CompositionError::NoComposer {
                platform: PlatformId::Ruby
            }
        );
    }

    #[test]
    fn test_cancelled_before_first_fragment() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let platforms = vec![(
            DetectionResult::new(PlatformId::Php),
            resolved(PlatformId::Php, "8.2.10"),
        )];
        let err = ComposerRegistry::with_defaults()
            .compose_script(&platforms, &BuildOptions::default(), &cancel)
            .unwrap_err();
        assert_eq!(err, CompositionError::Cancelled);
    }
}
