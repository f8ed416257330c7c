//! Version selection.
//!
//! [`select`] maps all versions of one package, a target platform version and a
//! loader tag to a [`VersionDecision`]. It is pure and total: for any input it
//! returns exactly one status and performs no I/O.
//!
//! # Implementation Note: Tie-breaking
//!
//! When the latest release and the latest non-release share a timestamp, the
//! non-release side wins and the decision becomes ambiguous. Newer builds are
//! always surfaced to the human via the `*_NONRELEASE_W_RELEASE` statuses
//! rather than silently auto-chosen.

use emthree_schema::Version;
use serde::Serialize;

/// Outcome class of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersionStatus {
    /// Latest platform-compatible version is a release.
    LatestRelease,
    /// A newer non-release exists next to a platform-compatible release.
    LatestNonreleaseWRelease,
    /// Only non-release versions target the platform version.
    LatestNonreleaseOnly,
    /// Nothing targets the platform version; newest loader match is a release.
    LegacyRelease,
    /// Nothing targets the platform version; a newer non-release exists next to a release.
    LegacyNonreleaseWRelease,
    /// Nothing targets the platform version; only non-release loader matches exist.
    LegacyNonreleaseOnly,
    /// No version supports the loader at all.
    Unavailable,
    /// Version id was known in advance; no selection ran.
    Manual,
}

impl VersionStatus {
    /// Ambiguous statuses carry an alternate and need a human tie-break.
    pub fn is_ambiguous(self) -> bool {
        matches!(
            self,
            Self::LatestNonreleaseWRelease | Self::LegacyNonreleaseWRelease
        )
    }

    /// Legacy statuses chose a version that does not list the target platform version.
    pub fn is_legacy(self) -> bool {
        matches!(
            self,
            Self::LegacyRelease | Self::LegacyNonreleaseWRelease | Self::LegacyNonreleaseOnly
        )
    }

    /// Numeric code: tens digit is the class, units digit the variant.
    pub fn code(self) -> u8 {
        match self {
            Self::LatestRelease => 10,
            Self::LatestNonreleaseWRelease => 11,
            Self::LatestNonreleaseOnly => 12,
            Self::LegacyRelease => 20,
            Self::LegacyNonreleaseWRelease => 21,
            Self::LegacyNonreleaseOnly => 22,
            Self::Unavailable => 30,
            Self::Manual => 40,
        }
    }
}

impl std::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::LatestRelease => "latest release",
            Self::LatestNonreleaseWRelease => "newer pre-release alongside release",
            Self::LatestNonreleaseOnly => "pre-release only",
            Self::LegacyRelease => "release for an older platform version",
            Self::LegacyNonreleaseWRelease => {
                "newer pre-release alongside release, older platform version"
            }
            Self::LegacyNonreleaseOnly => "pre-release only, older platform version",
            Self::Unavailable => "unavailable",
            Self::Manual => "pinned",
        };
        f.write_str(s)
    }
}

/// Result of version selection.
///
/// `alternate` is only ever populated for the two ambiguous statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDecision {
    pub status: VersionStatus,
    pub chosen: Option<Version>,
    pub alternate: Option<Version>,
}

impl VersionDecision {
    /// Decision for an exact version fetched by id.
    pub fn manual(version: Version) -> Self {
        Self {
            status: VersionStatus::Manual,
            chosen: Some(version),
            alternate: None,
        }
    }

    fn single(status: VersionStatus, version: &Version) -> Self {
        Self {
            status,
            chosen: Some(version.clone()),
            alternate: None,
        }
    }

    fn ambiguous(status: VersionStatus, release: &Version, nonrelease: &Version) -> Self {
        Self {
            status,
            chosen: Some(release.clone()),
            alternate: Some(nonrelease.clone()),
        }
    }

    /// The version to install after a tie-break, if any.
    pub fn resolve(self, use_alternate: bool) -> Option<Version> {
        match (use_alternate, self.alternate) {
            (true, Some(alt)) => Some(alt),
            _ => self.chosen,
        }
    }
}

fn latest<'a>(versions: impl Iterator<Item = &'a Version>) -> Option<&'a Version> {
    versions.max_by_key(|v| v.date_published)
}

/// Pick a version of one package for `platform_version` and `loader`.
pub fn select(versions: &[Version], platform_version: &str, loader: &str) -> VersionDecision {
    let for_loader = || versions.iter().filter(|v| v.supports_loader(loader));
    let compatible = || for_loader().filter(|v| v.supports_platform(platform_version));

    if compatible().next().is_some() {
        let release = latest(compatible().filter(|v| v.is_release()));
        // Non-release scope is every loader match, not just platform matches.
        let nonrelease = latest(for_loader().filter(|v| !v.is_release()));

        return match (release, nonrelease) {
            (None, None) => unreachable!("a compatible version is either release or not"),
            (Some(r), None) => VersionDecision::single(VersionStatus::LatestRelease, r),
            (None, Some(nr)) => VersionDecision::single(VersionStatus::LatestNonreleaseOnly, nr),
            (Some(r), Some(nr)) if r.date_published > nr.date_published => {
                VersionDecision::single(VersionStatus::LatestRelease, r)
            }
            (Some(r), Some(nr)) => {
                VersionDecision::ambiguous(VersionStatus::LatestNonreleaseWRelease, r, nr)
            }
        };
    }

    let release = latest(for_loader().filter(|v| v.is_release()));
    let nonrelease = latest(for_loader().filter(|v| !v.is_release()));

    match (release, nonrelease) {
        (None, None) => VersionDecision {
            status: VersionStatus::Unavailable,
            chosen: None,
            alternate: None,
        },
        (None, Some(nr)) => VersionDecision::single(VersionStatus::LegacyNonreleaseOnly, nr),
        (Some(r), None) => VersionDecision::single(VersionStatus::LegacyRelease, r),
        (Some(r), Some(nr)) if r.date_published > nr.date_published => {
            VersionDecision::single(VersionStatus::LegacyRelease, r)
        }
        (Some(r), Some(nr)) => {
            VersionDecision::ambiguous(VersionStatus::LegacyNonreleaseWRelease, r, nr)
        }
    }
}
