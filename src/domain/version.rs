//! Package version parsing and ordering
//!
//! NuGet-style versions carry up to four numeric segments plus an optional
//! prerelease tag (`1.2.3.4`, `3.0.0-beta.2`), so this is deliberately more
//! lenient than strict semver: missing segments compare as zero and a
//! release always sorts above any prerelease of the same numbers.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A parsed package version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageVersion {
    /// Numeric dot-separated segments (major, minor, patch, revision, ...)
    segments: Vec<u64>,
    /// Prerelease tag after the first `-`, if any
    prerelease: Option<String>,
    /// The version string as originally written
    original: String,
}

impl PackageVersion {
    /// Parse a version string; returns None when no leading numeric segment exists
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let body = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if body.is_empty() {
            return None;
        }

        // Split off prerelease ("-beta.2") and build metadata ("+sha")
        let (numbers, rest) = match body.find(['-', '+']) {
            Some(idx) => (&body[..idx], Some(&body[idx..])),
            None => (body, None),
        };

        let mut segments = Vec::new();
        for part in numbers.split('.') {
            segments.push(part.parse::<u64>().ok()?);
        }
        if segments.is_empty() {
            return None;
        }

        let prerelease = rest.and_then(|r| {
            r.strip_prefix('-')
                .map(|p| p.split('+').next().unwrap_or(p).to_string())
                .filter(|p| !p.is_empty())
        });

        Some(Self {
            segments,
            prerelease,
            original: trimmed.to_string(),
        })
    }

    /// The numeric segments of this version
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    /// The prerelease tag, if any
    pub fn prerelease(&self) -> Option<&str> {
        self.prerelease.as_deref()
    }

    /// Returns true if this is a prerelease version
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// The version string as originally written
    pub fn original(&self) -> &str {
        &self.original
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                other => return other,
            }
        }

        match (&self.prerelease, &other.prerelease) {
            (None, None) => Ordering::Equal,
            // A release is newer than any of its prereleases
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => compare_prerelease(a, b),
        }
    }
}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

/// Compare prerelease tags part by part, numeric parts numerically
fn compare_prerelease(a: &str, b: &str) -> Ordering {
    let mut parts_a = a.split('.');
    let mut parts_b = b.split('.');
    loop {
        match (parts_a.next(), parts_b.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(pa), Some(pb)) => {
                let ord = match (pa.parse::<u64>(), pb.parse::<u64>()) {
                    (Ok(na), Ok(nb)) => na.cmp(&nb),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => pa.cmp(pb),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}
