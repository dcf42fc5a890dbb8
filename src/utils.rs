use std::{collections::BTreeSet, collections::HashSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Release grouping as used by the catalog, both for an album's own type and
/// for the `include_groups` filter of an artist's discography listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseKind {
    Album,
    Single,
    Compilation,
    AppearsOn,
}

impl ReleaseKind {
    pub const ALL: [ReleaseKind; 4] = [
        ReleaseKind::Album,
        ReleaseKind::Single,
        ReleaseKind::Compilation,
        ReleaseKind::AppearsOn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseKind::Album => "album",
            ReleaseKind::Single => "single",
            ReleaseKind::Compilation => "compilation",
            ReleaseKind::AppearsOn => "appears_on",
        }
    }
}

impl fmt::Display for ReleaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReleaseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "album" => Ok(ReleaseKind::Album),
            "single" => Ok(ReleaseKind::Single),
            "compilation" => Ok(ReleaseKind::Compilation),
            "appears_on" => Ok(ReleaseKind::AppearsOn),
            _ => Err(format!("invalid value '{}'", s.trim())),
        }
    }
}

/// An ordered, de-duplicated set of release kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseKinds(pub BTreeSet<ReleaseKind>);

impl ReleaseKinds {
    pub fn iter(&self) -> impl Iterator<Item = ReleaseKind> + '_ {
        self.0.iter().copied()
    }
}

impl Default for ReleaseKinds {
    /// The three album types the record store keeps.
    fn default() -> Self {
        ReleaseKinds(BTreeSet::from([
            ReleaseKind::Album,
            ReleaseKind::Single,
            ReleaseKind::Compilation,
        ]))
    }
}

impl fmt::Display for ReleaseKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ReleaseKind::as_str)
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&joined)
    }
}

/// Parses a comma separated list of release kinds, e.g. `album,single`.
///
/// Accepts `all` as a shorthand for every kind, is case-insensitive and
/// treats `-` and `_` alike. Duplicates collapse.
pub fn parse_release_kinds(input: &str) -> Result<ReleaseKinds, String> {
    if input.trim().is_empty() {
        return Err("release kinds cannot be empty".to_string());
    }

    if input.trim().eq_ignore_ascii_case("all") {
        return Ok(ReleaseKinds(ReleaseKind::ALL.into_iter().collect()));
    }

    let mut kinds = BTreeSet::new();
    for segment in input.split(',') {
        if segment.trim().is_empty() {
            return Err(format!("empty segment in '{}'", input));
        }
        kinds.insert(segment.parse::<ReleaseKind>()?);
    }

    Ok(ReleaseKinds(kinds))
}

/// Converts a catalog duration in milliseconds to whole seconds (floor).
pub fn ms_to_seconds(duration_ms: u64) -> u64 {
    duration_ms / 1000
}

/// Removes repeated ids while keeping the first occurrence of each.
pub fn remove_duplicate_ids(ids: &mut Vec<String>) {
    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(id.clone()));
}

/// Whether `id` has the shape of a catalog id (base62, non-empty).
pub fn is_catalog_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric())
}
