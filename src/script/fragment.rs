//! Named script fragments and `{{name}}` placeholder rendering.

use crate::error::CompositionError;
use crate::platform::PlatformId;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

const PLACEHOLDER_PATTERN: &str = r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}";

/// Fragment names, in the order platforms emit them.
pub mod names {
    pub const RUNTIME_ENVIRONMENT: &str = "runtime-environment";
    pub const PACKAGE_MANAGER: &str = "package-manager";
    pub const DEPENDENCY_INSTALL: &str = "dependency-install";
    pub const BUILD: &str = "build";
    pub const POST_BUILD: &str = "post-build";
}

/// Values substituted into fragment templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    values: BTreeMap<String, String>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    /// Sets `name` only when `value` is present.
    pub fn set_opt(&mut self, name: &str, value: Option<impl Into<String>>) -> &mut Self {
        if let Some(value) = value {
            self.set(name, value);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

/// A fragment as declared in a platform's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentTemplate {
    pub name: &'static str,
    pub template: &'static str,
    /// When set, the fragment is only emitted if this parameter is present.
    pub guard: Option<&'static str>,
}

impl FragmentTemplate {
    pub const fn required(name: &'static str, template: &'static str) -> Self {
        Self {
            name,
            template,
            guard: None,
        }
    }

    pub const fn guarded(name: &'static str, template: &'static str, guard: &'static str) -> Self {
        Self {
            name,
            template,
            guard: Some(guard),
        }
    }

    pub fn is_enabled(&self, parameters: &Parameters) -> bool {
        self.guard.map(|g| parameters.contains(g)).unwrap_or(true)
    }

    /// Placeholder names used by the template, in order of first use.
    pub fn placeholders(&self) -> Vec<String> {
        let Ok(re) = Regex::new(PLACEHOLDER_PATTERN) else {
            return Vec::new();
        };
        let mut names: Vec<String> = Vec::new();
        for caps in re.captures_iter(self.template) {
            let name = caps[1].to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    pub fn render(
        &self,
        platform: PlatformId,
        parameters: &Parameters,
    ) -> Result<ScriptFragment, CompositionError> {
        let unterminated = || CompositionError::UnterminatedPlaceholder {
            platform,
            fragment: self.name.to_string(),
        };
        let re = Regex::new(PLACEHOLDER_PATTERN).map_err(|_| unterminated())?;

        let mut text = String::with_capacity(self.template.len());
        let mut last = 0;
        for caps in re.captures_iter(self.template) {
            let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
            let name = &caps[1];
            let value = parameters
                .get(name)
                .ok_or_else(|| CompositionError::MissingParameter {
                    platform,
                    fragment: self.name.to_string(),
                    parameter: name.to_string(),
                })?;
            let literal = &self.template[last..whole.start];
            if literal.contains("{{") {
                return Err(unterminated());
            }
            text.push_str(literal);
            text.push_str(value);
            last = whole.end;
        }
        let tail = &self.template[last..];
        if tail.contains("{{") {
            return Err(unterminated());
        }
        text.push_str(tail);

        Ok(ScriptFragment {
            name: self.name.to_string(),
            text: text.trim_end().to_string(),
        })
    }
}

/// A rendered fragment of the build script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptFragment {
    pub name: String,
    pub text: String,
}
