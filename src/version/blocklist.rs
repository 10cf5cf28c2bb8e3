use super::sdk_version::versions_equal;

/// Parses a comma-separated block-list into trimmed, non-empty tokens.
pub fn parse_block_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// True when `version` appears in `blocked`, compared numerically so that
/// blocking `2.0` also blocks `2.0.0`.
pub fn is_blocked(version: &str, blocked: &[String]) -> bool {
    blocked.iter().any(|b| versions_equal(b, version))
}
