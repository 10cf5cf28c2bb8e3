//! Version resolution properties

use buildsmith::version::{resolve, PlatformVersionInfo, VersionSource};
use buildsmith::{ResolutionError, RollForwardPolicy, VersionSpecifier};
use yare::parameterized;

fn info(versions: &[&str], default: &str) -> PlatformVersionInfo {
    PlatformVersionInfo {
        supported_versions: versions.iter().map(|v| v.to_string()).collect(),
        default_version: default.to_string(),
        source: VersionSource::OnDisk,
    }
}

fn blocked(versions: &[&str]) -> Vec<String> {
    versions.iter().map(|v| v.to_string()).collect()
}

const SDKS: &[&str] = &[
    "6.0.100", "6.0.105", "6.0.200", "6.0.203", "6.1.100", "6.2.300", "7.0.100", "7.0.202",
];

#[test]
fn test_unspecified_resolves_to_default() {
    let info = info(&["3.8", "3.9", "3.10"], "3.10");
    assert_eq!(resolve(&VersionSpecifier::Unspecified, &info, &[]).unwrap(), "3.10");
}

#[test]
fn test_latest_minor_stays_within_major() {
    let info = info(&["6.0.100", "6.0.200", "6.1.100", "7.0.100"], "7.0.100");
    let spec = VersionSpecifier::policy("6.0.100", RollForwardPolicy::LatestMinor);
    assert_eq!(resolve(&spec, &info, &[]).unwrap(), "6.1.100");
}

#[test]
fn test_blocked_exact_version_is_a_block_list_error() {
    let info = info(&["1.0.0", "2.0.0", "3.0.0"], "3.0.0");
    let err = resolve(&VersionSpecifier::exact("2.0.0"), &info, &blocked(&["2.0.0"])).unwrap_err();
    assert_eq!(
        err,
        ResolutionError::VersionBlocked {
            requested: "2.0.0".to_string()
        }
    );
}

#[parameterized(
    unspecified = { VersionSpecifier::Unspecified },
    exact = { VersionSpecifier::exact("6.0.200") },
    range = { VersionSpecifier::range(">=6.0 <7") },
    latest_patch = { VersionSpecifier::policy("6.0.100", RollForwardPolicy::LatestPatch) },
    feature = { VersionSpecifier::policy("6.0.100", RollForwardPolicy::Feature) },
    latest_major = { VersionSpecifier::policy("6.0.100", RollForwardPolicy::LatestMajor) },
)]
fn test_resolution_is_idempotent(spec: VersionSpecifier) {
    let info = info(SDKS, "6.0.203");
    let block_list = blocked(&["6.0.105"]);
    let first = resolve(&spec, &info, &block_list);
    for _ in 0..5 {
        assert_eq!(resolve(&spec, &info, &block_list), first);
    }
}

#[parameterized(
    patch = { RollForwardPolicy::Patch },
    feature = { RollForwardPolicy::Feature },
    minor = { RollForwardPolicy::Minor },
    major = { RollForwardPolicy::Major },
    latest_patch = { RollForwardPolicy::LatestPatch },
    latest_feature = { RollForwardPolicy::LatestFeature },
    latest_minor = { RollForwardPolicy::LatestMinor },
    latest_major = { RollForwardPolicy::LatestMajor },
)]
fn test_block_list_is_never_violated(policy: RollForwardPolicy) {
    let info = info(SDKS, "7.0.202");
    let spec = VersionSpecifier::policy("6.0.100", policy);

    // Block each result in turn until nothing qualifies.
    let mut block_list = Vec::new();
    while let Ok(version) = resolve(&spec, &info, &block_list) {
        assert!(!block_list.contains(&version), "{policy}: returned blocked {version}");
        block_list.push(version);
        assert!(block_list.len() <= SDKS.len());
    }
}

#[test]
fn test_block_list_applies_to_ranges_and_defaults() {
    let info = info(&["16.20.2", "18.17.1"], "18.17.1");
    let block_list = blocked(&["18.17.1"]);

    assert_eq!(
        resolve(&VersionSpecifier::range(">=16"), &info, &block_list).unwrap(),
        "16.20.2"
    );
    assert_eq!(
        resolve(&VersionSpecifier::range("^18"), &info, &block_list),
        Err(ResolutionError::VersionBlocked {
            requested: "^18".to_string()
        })
    );
    assert!(matches!(
        resolve(&VersionSpecifier::range("^20"), &info, &block_list),
        Err(ResolutionError::RangeUnsatisfied { .. })
    ));
    assert!(matches!(
        resolve(&VersionSpecifier::Unspecified, &info, &block_list),
        Err(ResolutionError::DefaultVersionBlocked { .. })
    ));
}

#[parameterized(
    patch = { RollForwardPolicy::Patch },
    feature = { RollForwardPolicy::Feature },
    minor = { RollForwardPolicy::Minor },
    major = { RollForwardPolicy::Major },
    latest_patch = { RollForwardPolicy::LatestPatch },
    latest_feature = { RollForwardPolicy::LatestFeature },
    latest_minor = { RollForwardPolicy::LatestMinor },
    latest_major = { RollForwardPolicy::LatestMajor },
)]
fn test_adding_a_higher_version_never_lowers_the_result(policy: RollForwardPolicy) {
    let spec = VersionSpecifier::policy("6.0.100", policy);
    let base = info(SDKS, "6.0.100");
    let Ok(before) = resolve(&spec, &base, &[]) else {
        return;
    };

    for higher in ["6.0.209", "6.1.400", "6.9.100", "8.0.100"] {
        let mut extended = base.clone();
        extended.supported_versions.insert(higher.to_string());
        let after = resolve(&spec, &extended, &[]).unwrap();
        let ordered = buildsmith::version::SdkVersion::parse(&after).unwrap()
            >= buildsmith::version::SdkVersion::parse(&before).unwrap();
        assert!(ordered, "{policy}: {before} -> {after} after adding {higher}");
    }
}

#[parameterized(
    latest_patch = { RollForwardPolicy::LatestPatch },
    latest_feature = { RollForwardPolicy::LatestFeature },
    latest_minor = { RollForwardPolicy::LatestMinor },
    latest_major = { RollForwardPolicy::LatestMajor },
)]
fn test_removing_the_result_picks_next_highest(policy: RollForwardPolicy) {
    let spec = VersionSpecifier::policy("6.0.100", policy);
    let mut current = info(SDKS, "6.0.100");
    let mut previous: Option<String> = None;

    while let Ok(version) = resolve(&spec, &current, &[]) {
        if let Some(previous) = &previous {
            let lower = buildsmith::version::SdkVersion::parse(&version).unwrap()
                < buildsmith::version::SdkVersion::parse(previous).unwrap();
            assert!(lower, "{policy}: {version} after removing {previous}");
        }
        current.supported_versions.remove(&version);
        previous = Some(version);
    }
    assert!(previous.is_some());
}

#[test]
fn test_unsupported_error_lists_available_versions() {
    let info = info(&["3.10.4", "3.8.12", "3.9.7"], "3.10.4");
    let err = resolve(&VersionSpecifier::exact("2.7"), &info, &[]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Version '2.7' is not supported. Available versions: 3.8.12, 3.9.7, 3.10.4"
    );
}
