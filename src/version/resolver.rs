use super::blocklist::is_blocked;
use super::policy;
use super::provider::{PlatformVersionInfo, VersionSource};
use super::sdk_version::{sort_versions, versions_equal, SdkVersion};
use super::specifier::VersionSpecifier;
use crate::error::ResolutionError;
use crate::platform::PlatformId;
use semver::VersionReq;
use serde::Serialize;
use tracing::debug;

/// The concrete version chosen for a platform, with how it was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedVersion {
    pub platform: PlatformId,
    pub version: String,
    pub source: VersionSource,
    pub specifier: VersionSpecifier,
}

fn available(info: &PlatformVersionInfo) -> Vec<String> {
    let mut versions: Vec<String> = info.supported_versions.iter().cloned().collect();
    sort_versions(&mut versions);
    versions
}

/// Supported, parseable, non-blocked versions.
fn candidates(info: &PlatformVersionInfo, blocked: &[String]) -> Vec<SdkVersion> {
    info.supported_versions
        .iter()
        .filter(|v| !is_blocked(v, blocked))
        .filter_map(|v| SdkVersion::parse(v).ok())
        .collect()
}

/// Matches `spec` against the versions in `info`, never returning a version
/// listed in `blocked`. A request that only blocked versions would satisfy
/// fails with `VersionBlocked` rather than as unsatisfiable.
///
/// The result depends only on the arguments, so the same inputs always give
/// the same answer regardless of where the version set came from.
pub fn resolve(
    spec: &VersionSpecifier,
    info: &PlatformVersionInfo,
    blocked: &[String],
) -> Result<String, ResolutionError> {
    let resolved = match spec {
        VersionSpecifier::Unspecified => {
            if is_blocked(&info.default_version, blocked) {
                return Err(ResolutionError::DefaultVersionBlocked {
                    default: info.default_version.clone(),
                });
            }
            info.default_version.clone()
        }
        VersionSpecifier::Exact { version } => {
            let found = info
                .supported_versions
                .iter()
                .find(|v| versions_equal(v, version))
                .ok_or_else(|| ResolutionError::VersionNotSupported {
                    requested: version.clone(),
                    available: available(info),
                })?;
            if is_blocked(found, blocked) {
                return Err(ResolutionError::VersionBlocked {
                    requested: version.clone(),
                });
            }
            found.clone()
        }
        VersionSpecifier::PolicyBased { base, policy } => {
            let base_version =
                SdkVersion::parse(base).map_err(|e| ResolutionError::InvalidSpecifier {
                    specifier: base.clone(),
                    reason: e.to_string(),
                })?;
            let allowed = candidates(info, blocked);
            match policy::select(*policy, &base_version, &allowed) {
                Some(version) => version.as_str().to_string(),
                None if policy::select(*policy, &base_version, &candidates(info, &[])).is_some() => {
                    return Err(ResolutionError::VersionBlocked {
                        requested: spec.to_string(),
                    });
                }
                None => {
                    return Err(ResolutionError::PolicyUnsatisfied {
                        base: base.clone(),
                        policy: policy.to_string(),
                        available: available(info),
                    });
                }
            }
        }
        VersionSpecifier::Range { expression } => {
            let requirements =
                parse_range(expression).map_err(|reason| ResolutionError::InvalidSpecifier {
                    specifier: expression.clone(),
                    reason,
                })?;
            let satisfies = |v: &&SdkVersion| {
                let semver = v.to_semver();
                requirements.iter().any(|req| req.matches(&semver))
            };
            let allowed = candidates(info, blocked);
            match allowed.iter().filter(|v| satisfies(v)).max() {
                Some(version) => version.as_str().to_string(),
                None if candidates(info, &[]).iter().any(|v| satisfies(&v)) => {
                    return Err(ResolutionError::VersionBlocked {
                        requested: expression.clone(),
                    });
                }
                None => {
                    return Err(ResolutionError::RangeUnsatisfied {
                        range: expression.clone(),
                        available: available(info),
                    });
                }
            }
        }
    };

    debug!(specifier = %spec, version = %resolved, "Resolved version");
    Ok(resolved)
}

fn is_operator(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| matches!(c, '<' | '>' | '=' | '~' | '^'))
}

fn normalize_bare(token: &str) -> String {
    let unprefixed = token.strip_prefix(['v', 'V']).unwrap_or(token);
    let parts: Vec<&str> = unprefixed.split('.').collect();
    let has_wildcard = parts.iter().any(|p| matches!(*p, "x" | "X" | "*"));

    if matches!(unprefixed, "x" | "X" | "*") {
        "*".to_string()
    } else if has_wildcard {
        parts
            .iter()
            .map(|p| if matches!(*p, "x" | "X") { "*" } else { *p })
            .collect::<Vec<_>>()
            .join(".")
    } else if parts.len() >= 3 {
        format!("={}", unprefixed)
    } else {
        format!("~{}", unprefixed)
    }
}

fn normalize_alternative(alternative: &str) -> Result<String, String> {
    let raw: Vec<&str> = alternative.split_whitespace().collect();
    if raw.is_empty() {
        return Err("empty range alternative".to_string());
    }

    // Hyphen range: "1.2 - 2.3"
    if let [low, "-", high] = raw.as_slice() {
        return Ok(format!(">={}, <={}", low, high));
    }

    let mut comparators = Vec::new();
    let mut pending_operator = String::new();
    for token in raw {
        if is_operator(token) {
            pending_operator.push_str(token);
            continue;
        }
        let token = token.trim_end_matches(',');
        let bare = token.starts_with(|c: char| c.is_ascii_digit() || matches!(c, 'v' | 'V' | 'x' | 'X' | '*'));
        if pending_operator.is_empty() && bare {
            comparators.push(normalize_bare(token));
        } else {
            comparators.push(format!("{}{}", pending_operator, token));
        }
        pending_operator.clear();
    }
    if !pending_operator.is_empty() {
        return Err(format!("dangling operator '{}'", pending_operator));
    }

    Ok(comparators.join(", "))
}

/// Parses an npm-style range into one requirement per `||` alternative.
///
/// Bare partial versions mean "any patch of": `3.8` is `~3.8`. Bare complete
/// versions are exact.
pub fn parse_range(expression: &str) -> Result<Vec<VersionReq>, String> {
    expression
        .split("||")
        .map(|alternative| {
            let normalized = normalize_alternative(alternative)?;
            VersionReq::parse(&normalized).map_err(|e| format!("{} ({})", e, normalized))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::RollForwardPolicy;
    use std::collections::BTreeSet;

    fn info(versions: &[&str], default: &str) -> PlatformVersionInfo {
        PlatformVersionInfo {
            supported_versions: versions.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            default_version: default.to_string(),
            source: VersionSource::OnDisk,
        }
    }

    fn blocked(list: &str) -> Vec<String> {
        crate::version::parse_block_list(list)
    }

    #[test]
    fn test_unspecified_returns_default() {
        let info = info(&["3.8", "3.9", "3.10"], "3.10");
        assert_eq!(resolve(&VersionSpecifier::Unspecified, &info, &[]).unwrap(), "3.10");
    }

    #[test]
    fn test_unspecified_blocked_default_fails_without_substitute() {
        let info = info(&["3.8", "3.9", "3.10"], "3.10");
        let err = resolve(&VersionSpecifier::Unspecified, &info, &blocked("3.10")).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::DefaultVersionBlocked {
                default: "3.10".to_string()
            }
        );
    }

    #[test]
    fn test_exact_numeric_match_returns_supported_spelling() {
        let info = info(&["2.0", "3.1.4"], "3.1.4");
        assert_eq!(
            resolve(&VersionSpecifier::exact("2.0.0"), &info, &[]).unwrap(),
            "2.0"
        );
    }

    #[test]
    fn test_exact_not_supported_lists_available() {
        let info = info(&["3.10", "3.8", "3.9"], "3.10");
        let err = resolve(&VersionSpecifier::exact("2.7.18"), &info, &[]).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::VersionNotSupported {
                requested: "2.7.18".to_string(),
                available: vec!["3.8".to_string(), "3.9".to_string(), "3.10".to_string()],
            }
        );
    }

    #[test]
    fn test_exact_blocked_is_distinct_from_unsupported() {
        let info = info(&["1.0.0", "2.0.0"], "2.0.0");
        let err = resolve(&VersionSpecifier::exact("2.0.0"), &info, &blocked("2.0.0")).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::VersionBlocked {
                requested: "2.0.0".to_string()
            }
        );
    }

    #[test]
    fn test_policy_based() {
        let info = info(&["6.0.100", "6.0.200", "6.1.100", "7.0.100"], "7.0.100");
        let spec = VersionSpecifier::policy("6.0.100", RollForwardPolicy::LatestMinor);
        assert_eq!(resolve(&spec, &info, &[]).unwrap(), "6.1.100");
    }

    #[test]
    fn test_policy_unsatisfied_names_policy_and_base() {
        let info = info(&["6.0.100"], "6.0.100");
        let spec = VersionSpecifier::policy("7.0.100", RollForwardPolicy::LatestPatch);
        let err = resolve(&spec, &info, &[]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("latestPatch"));
        assert!(message.contains("7.0.100"));
        assert!(message.contains("6.0.100"));
    }

    #[test]
    fn test_policy_invalid_base() {
        let info = info(&["6.0.100"], "6.0.100");
        let spec = VersionSpecifier::policy("six", RollForwardPolicy::Patch);
        assert!(matches!(
            resolve(&spec, &info, &[]),
            Err(ResolutionError::InvalidSpecifier { .. })
        ));
    }

    #[test]
    fn test_range_partial_version_is_tilde() {
        let info = info(&["3.8.12", "3.9.7", "3.9.10", "3.10.1"], "3.10.1");
        assert_eq!(
            resolve(&VersionSpecifier::range("3.9"), &info, &[]).unwrap(),
            "3.9.10"
        );
    }

    #[test]
    fn test_range_npm_expressions() {
        let info = info(&["12.22.12", "14.21.3", "16.20.2", "18.17.1"], "18.17.1");
        let check = |expr: &str| resolve(&VersionSpecifier::range(expr), &info, &[]).unwrap();

        assert_eq!(check("^16.0.0"), "16.20.2");
        assert_eq!(check(">=14 <17"), "16.20.2");
        assert_eq!(check(">= 12, < 15"), "14.21.3");
        assert_eq!(check("12.x || 14.x"), "14.21.3");
        assert_eq!(check("14 - 15"), "14.21.3");
        assert_eq!(check("*"), "18.17.1");
        assert_eq!(check("12.22.12"), "12.22.12");
    }

    #[test]
    fn test_range_respects_block_list() {
        let info = info(&["16.20.1", "16.20.2"], "16.20.2");
        assert_eq!(
            resolve(&VersionSpecifier::range("16"), &info, &blocked("16.20.2")).unwrap(),
            "16.20.1"
        );
    }

    #[test]
    fn test_partial_version_blocked_is_a_block_list_error() {
        let info = info(&["3.8", "3.9", "3.10"], "3.10");
        let spec = VersionSpecifier::from_request("3.10");
        assert_eq!(
            resolve(&spec, &info, &blocked("3.10")).unwrap_err(),
            ResolutionError::VersionBlocked {
                requested: "3.10".to_string()
            }
        );
    }

    #[test]
    fn test_policy_blocked_only_match_is_a_block_list_error() {
        let info = info(&["6.0.100", "6.0.105", "7.0.100"], "7.0.100");
        let spec = VersionSpecifier::policy("6.0.100", RollForwardPolicy::LatestPatch);
        assert!(matches!(
            resolve(&spec, &info, &blocked("6.0.100, 6.0.105")),
            Err(ResolutionError::VersionBlocked { .. })
        ));
    }

    #[test]
    fn test_range_errors() {
        let info = info(&["16.20.2"], "16.20.2");
        assert!(matches!(
            resolve(&VersionSpecifier::range("^20"), &info, &[]),
            Err(ResolutionError::RangeUnsatisfied { .. })
        ));
        assert!(matches!(
            resolve(&VersionSpecifier::range(">="), &info, &[]),
            Err(ResolutionError::InvalidSpecifier { .. })
        ));
        assert!(matches!(
            resolve(&VersionSpecifier::range("lts/*"), &info, &[]),
            Err(ResolutionError::InvalidSpecifier { .. })
        ));
    }
}
