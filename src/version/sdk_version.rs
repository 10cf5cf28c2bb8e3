use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A dotted numeric version such as `3.10`, `18.17.1` or `6.0.203-preview.1`.
///
/// Ordering is numeric per component (`3.10 > 3.9`), missing components count
/// as zero (`3.10 == 3.10.0`), and a prerelease sorts below the same release.
/// The third component doubles as an SDK "feature band + patch" pair:
/// `6.0.203` is feature band 2, patch 3.
#[derive(Debug, Clone)]
pub struct SdkVersion {
    raw: String,
    components: Vec<u64>,
    prerelease: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVersionError(String);

impl fmt::Display for ParseVersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a dotted numeric version", self.0)
    }
}

impl std::error::Error for ParseVersionError {}

impl SdkVersion {
    pub fn parse(input: &str) -> Result<Self, ParseVersionError> {
        let raw = input.trim();
        let unprefixed = raw.strip_prefix(['v', 'V']).unwrap_or(raw);
        let without_build = unprefixed.split('+').next().unwrap_or(unprefixed);

        let (numeric, prerelease) = match without_build.split_once('-') {
            Some((numeric, pre)) if !pre.is_empty() => (numeric, Some(pre.to_string())),
            Some(_) => return Err(ParseVersionError(input.to_string())),
            None => (without_build, None),
        };

        let components = numeric
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    None
                } else {
                    part.parse::<u64>().ok()
                }
            })
            .collect::<Option<Vec<_>>>()
            .filter(|c| !c.is_empty() && c.len() <= 4)
            .ok_or_else(|| ParseVersionError(input.to_string()))?;

        Ok(Self {
            raw: raw.to_string(),
            components,
            prerelease,
        })
    }

    /// The string this version was parsed from.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }

    pub fn major(&self) -> u64 {
        self.component(0)
    }

    pub fn minor(&self) -> u64 {
        self.component(1)
    }

    /// Third component as written (`203` in `6.0.203`).
    pub fn patch_component(&self) -> u64 {
        self.component(2)
    }

    /// SDK feature band: hundreds of the third component.
    pub fn feature(&self) -> u64 {
        self.patch_component() / 100
    }

    /// SDK patch within the feature band.
    pub fn feature_patch(&self) -> u64 {
        self.patch_component() % 100
    }

    /// Number of numeric components written.
    pub fn precision(&self) -> usize {
        self.components.len()
    }

    pub fn prerelease(&self) -> Option<&str> {
        self.prerelease.as_deref()
    }

    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// Key identifying the SDK feature band (`major.minor.feature`).
    pub fn band(&self) -> (u64, u64, u64) {
        (self.major(), self.minor(), self.feature())
    }

    /// Three-component semantic version for range matching. A fourth
    /// component, if any, is ignored.
    pub fn to_semver(&self) -> semver::Version {
        let mut version = semver::Version::new(self.major(), self.minor(), self.patch_component());
        if let Some(pre) = &self.prerelease {
            if let Ok(pre) = semver::Prerelease::new(pre) {
                version.pre = pre;
            }
        }
        version
    }
}

fn compare_prerelease(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => l.cmp(r),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

impl Ord for SdkVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            match self.component(i).cmp(&other.component(i)) {
                Ordering::Equal => continue,
                ordering => return ordering,
            }
        }
        match (&self.prerelease, &other.prerelease) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => compare_prerelease(a, b),
        }
    }
}

impl PartialOrd for SdkVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SdkVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SdkVersion {}

impl FromStr for SdkVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SdkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for SdkVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// True when both strings parse to the same version, or are identical.
pub fn versions_equal(a: &str, b: &str) -> bool {
    if a.trim() == b.trim() {
        return true;
    }
    match (SdkVersion::parse(a), SdkVersion::parse(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Sorts version strings numerically, unparseable strings last in lexical
/// order.
pub fn sort_versions(versions: &mut [String]) {
    versions.sort_by(|a, b| match (SdkVersion::parse(a), SdkVersion::parse(b)) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> SdkVersion {
        SdkVersion::parse(s).unwrap()
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        assert!(v("3.10") > v("3.9"));
        assert!(v("1.20.0") > v("1.9.12"));
        assert!(v("10.0.0") > v("9.99.99"));
    }

    #[test]
    fn test_missing_components_are_zero() {
        assert_eq!(v("3.10"), v("3.10.0"));
        assert!(v("3.10.1") > v("3.10"));
    }

    #[test]
    fn test_prerelease_sorts_below_release() {
        assert!(v("7.0.100-preview.1") < v("7.0.100"));
        assert!(v("7.0.100-preview.2") > v("7.0.100-preview.1"));
        assert!(v("7.0.100-rc.1") > v("7.0.100-preview.7"));
        assert!(v("7.0.100-preview.10") > v("7.0.100-preview.9"));
    }

    #[test]
    fn test_sdk_feature_band() {
        let sdk = v("6.0.203");
        assert_eq!(sdk.band(), (6, 0, 2));
        assert_eq!(sdk.feature_patch(), 3);
        assert_eq!(v("3.1").feature(), 0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(SdkVersion::parse("").is_err());
        assert!(SdkVersion::parse("lts").is_err());
        assert!(SdkVersion::parse("3..1").is_err());
        assert!(SdkVersion::parse("3.x").is_err());
        assert!(SdkVersion::parse("1.2.3.4.5").is_err());
        assert!(SdkVersion::parse("1.0-").is_err());
    }

    #[test]
    fn test_parse_keeps_raw_text() {
        assert_eq!(v("v18.17.1").as_str(), "v18.17.1");
        assert_eq!(v("v18.17.1").major(), 18);
        assert_eq!(v("1.2.3+build.5"), v("1.2.3"));
    }

    #[test]
    fn test_to_semver() {
        assert_eq!(v("3.9").to_semver(), semver::Version::new(3, 9, 0));
        let pre = v("7.0.100-preview.1").to_semver();
        assert_eq!(pre.pre.as_str(), "preview.1");
    }

    #[test]
    fn test_sort_versions() {
        let mut versions = vec![
            "3.10".to_string(),
            "lts".to_string(),
            "3.8".to_string(),
            "3.9".to_string(),
        ];
        sort_versions(&mut versions);
        assert_eq!(versions, vec!["3.8", "3.9", "3.10", "lts"]);
    }

    #[test]
    fn test_versions_equal() {
        assert!(versions_equal("2.0", "2.0.0"));
        assert!(versions_equal("lts", "lts"));
        assert!(!versions_equal("2.0.1", "2.0.0"));
    }
}
