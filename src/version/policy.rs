//! Roll-forward tiers as explicit candidate filters.
//!
//! Each policy is a list of steps tried in order. A step narrows the
//! candidates to a scope around the base version and then picks one. The
//! first step that yields a version wins.
//!
//! | Policy          | Steps                                   |
//! |-----------------|-----------------------------------------|
//! | `disable`       | exact                                   |
//! | `patch`         | exact, then feature band / highest      |
//! | `latestPatch`   | feature band / highest                  |
//! | `feature`       | same minor / lowest band, highest patch |
//! | `latestFeature` | same minor / highest                    |
//! | `minor`         | same major / lowest band, highest patch |
//! | `latestMinor`   | same major / highest                    |
//! | `major`         | any / lowest band, highest patch        |
//! | `latestMajor`   | any / highest                           |
//!
//! Every scope except `exact` only admits versions at or above the base.

use super::sdk_version::SdkVersion;
use super::specifier::RollForwardPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Exact,
    FeatureBand,
    Minor,
    Major,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pick {
    Highest,
    /// Lowest feature band at or above the base, then its highest patch.
    LowestBand,
}

#[derive(Debug, Clone, Copy)]
struct Step {
    scope: Scope,
    pick: Pick,
}

const fn step(scope: Scope, pick: Pick) -> Step {
    Step { scope, pick }
}

const EXACT: &[Step] = &[step(Scope::Exact, Pick::Highest)];
const PATCH: &[Step] = &[
    step(Scope::Exact, Pick::Highest),
    step(Scope::FeatureBand, Pick::Highest),
];
const LATEST_PATCH: &[Step] = &[step(Scope::FeatureBand, Pick::Highest)];
const FEATURE: &[Step] = &[step(Scope::Minor, Pick::LowestBand)];
const LATEST_FEATURE: &[Step] = &[step(Scope::Minor, Pick::Highest)];
const MINOR: &[Step] = &[step(Scope::Major, Pick::LowestBand)];
const LATEST_MINOR: &[Step] = &[step(Scope::Major, Pick::Highest)];
const MAJOR: &[Step] = &[step(Scope::Any, Pick::LowestBand)];
const LATEST_MAJOR: &[Step] = &[step(Scope::Any, Pick::Highest)];

fn steps(policy: RollForwardPolicy) -> &'static [Step] {
    match policy {
        RollForwardPolicy::Disable => EXACT,
        RollForwardPolicy::Patch => PATCH,
        RollForwardPolicy::LatestPatch => LATEST_PATCH,
        RollForwardPolicy::Feature => FEATURE,
        RollForwardPolicy::LatestFeature => LATEST_FEATURE,
        RollForwardPolicy::Minor => MINOR,
        RollForwardPolicy::LatestMinor => LATEST_MINOR,
        RollForwardPolicy::Major => MAJOR,
        RollForwardPolicy::LatestMajor => LATEST_MAJOR,
    }
}

fn in_scope(scope: Scope, base: &SdkVersion, candidate: &SdkVersion) -> bool {
    if candidate < base {
        return false;
    }
    // Prereleases only qualify when a prerelease was asked for.
    if candidate.is_prerelease() && !base.is_prerelease() {
        return false;
    }
    match scope {
        Scope::Exact => candidate == base,
        Scope::FeatureBand => candidate.band() == base.band(),
        Scope::Minor => candidate.major() == base.major() && candidate.minor() == base.minor(),
        Scope::Major => candidate.major() == base.major(),
        Scope::Any => true,
    }
}

fn pick<'a>(how: Pick, matches: Vec<&'a SdkVersion>) -> Option<&'a SdkVersion> {
    match how {
        Pick::Highest => matches.into_iter().max(),
        Pick::LowestBand => {
            let band = matches.iter().map(|v| v.band()).min()?;
            matches.into_iter().filter(|v| v.band() == band).max()
        }
    }
}

/// Selects the version `policy` rolls `base` forward to, or `None` when no
/// candidate qualifies. `candidates` must already exclude blocked versions.
pub fn select<'a>(
    policy: RollForwardPolicy,
    base: &SdkVersion,
    candidates: &'a [SdkVersion],
) -> Option<&'a SdkVersion> {
    steps(policy).iter().find_map(|s| {
        let matches: Vec<&SdkVersion> = candidates
            .iter()
            .filter(|c| in_scope(s.scope, base, c))
            .collect();
        pick(s.pick, matches)
    })
}
