use super::sdk_version::SdkVersion;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How far a requested SDK version may roll forward when it is not available.
///
/// Names follow the `rollForward` values of a .NET `global.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RollForwardPolicy {
    Disable,
    Patch,
    Feature,
    Minor,
    Major,
    LatestPatch,
    LatestFeature,
    LatestMinor,
    LatestMajor,
}

impl RollForwardPolicy {
    pub const ALL: [RollForwardPolicy; 9] = [
        RollForwardPolicy::Disable,
        RollForwardPolicy::Patch,
        RollForwardPolicy::Feature,
        RollForwardPolicy::Minor,
        RollForwardPolicy::Major,
        RollForwardPolicy::LatestPatch,
        RollForwardPolicy::LatestFeature,
        RollForwardPolicy::LatestMinor,
        RollForwardPolicy::LatestMajor,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RollForwardPolicy::Disable => "disable",
            RollForwardPolicy::Patch => "patch",
            RollForwardPolicy::Feature => "feature",
            RollForwardPolicy::Minor => "minor",
            RollForwardPolicy::Major => "major",
            RollForwardPolicy::LatestPatch => "latestPatch",
            RollForwardPolicy::LatestFeature => "latestFeature",
            RollForwardPolicy::LatestMinor => "latestMinor",
            RollForwardPolicy::LatestMajor => "latestMajor",
        }
    }
}

impl fmt::Display for RollForwardPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RollForwardPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| {
                format!(
                    "unknown roll-forward policy '{}'; expected one of: {}",
                    s,
                    Self::ALL.map(|p| p.name()).join(", ")
                )
            })
    }
}

/// A request for a platform version, before it is matched against the
/// versions a provider supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum VersionSpecifier {
    /// Use the provider's default version.
    Unspecified,
    /// Exactly this version, compared numerically (`2.0` matches `2.0.0`).
    Exact { version: String },
    /// Start at `base` and roll forward according to `policy`.
    PolicyBased {
        base: String,
        policy: RollForwardPolicy,
    },
    /// An npm-style range such as `^16`, `>=7.4 <8` or `3.8`.
    Range { expression: String },
}

impl VersionSpecifier {
    pub fn exact(version: impl Into<String>) -> Self {
        VersionSpecifier::Exact {
            version: version.into(),
        }
    }

    pub fn policy(base: impl Into<String>, policy: RollForwardPolicy) -> Self {
        VersionSpecifier::PolicyBased {
            base: base.into(),
            policy,
        }
    }

    pub fn range(expression: impl Into<String>) -> Self {
        VersionSpecifier::Range {
            expression: expression.into(),
        }
    }

    /// Classifies a version as written by a user or found in a manifest.
    ///
    /// A complete version (three or more numeric components) is exact;
    /// anything shorter or containing operators is a range; blank is
    /// unspecified.
    pub fn from_request(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return VersionSpecifier::Unspecified;
        }
        match SdkVersion::parse(trimmed) {
            Ok(version) if version.precision() >= 3 => VersionSpecifier::exact(trimmed),
            _ => VersionSpecifier::range(trimmed),
        }
    }
}

impl fmt::Display for VersionSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpecifier::Unspecified => f.write_str("default"),
            VersionSpecifier::Exact { version } => write!(f, "{}", version),
            VersionSpecifier::PolicyBased { base, policy } => write!(f, "{} ({})", base, policy),
            VersionSpecifier::Range { expression } => write!(f, "{}", expression),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_names_parse_case_insensitively() {
        for policy in RollForwardPolicy::ALL {
            assert_eq!(policy.name().parse::<RollForwardPolicy>(), Ok(policy));
            assert_eq!(
                policy.name().to_uppercase().parse::<RollForwardPolicy>(),
                Ok(policy)
            );
        }
        assert!("sideways".parse::<RollForwardPolicy>().is_err());
    }

    #[test]
    fn test_policy_serde_is_camel_case() {
        let json = serde_json::to_string(&RollForwardPolicy::LatestMinor).unwrap();
        assert_eq!(json, "\"latestMinor\"");
    }

    #[test]
    fn test_from_request() {
        assert_eq!(VersionSpecifier::from_request("  "), VersionSpecifier::Unspecified);
        assert_eq!(
            VersionSpecifier::from_request("2.0.0"),
            VersionSpecifier::exact("2.0.0")
        );
        assert_eq!(
            VersionSpecifier::from_request("7.0.100-preview.1"),
            VersionSpecifier::exact("7.0.100-preview.1")
        );
        assert_eq!(
            VersionSpecifier::from_request("3.8"),
            VersionSpecifier::range("3.8")
        );
        assert_eq!(
            VersionSpecifier::from_request(">=14 <17"),
            VersionSpecifier::range(">=14 <17")
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            VersionSpecifier::policy("6.0.100", RollForwardPolicy::LatestMinor).to_string(),
            "6.0.100 (latestMinor)"
        );
        assert_eq!(VersionSpecifier::Unspecified.to_string(), "default");
    }
}
