//! Grouping key and label derivation
//!
//! Candidates sharing a name prefix and version transition are batched into
//! one change-set. The batch label comes from the longest common substring
//! of the member names, so `Sentry.AspNetCore` + `Sentry.Serilog` at
//! `3.0.0/2.9.0` label as `Sentry/3.0.0/2.9.0`.

use crate::domain::{UpdateCandidate, UpdateGroup};

/// The grouping prefix of a package name
///
/// The substring before the first `.`; failing that, before the first `/`;
/// failing both, the whole name.
pub fn package_prefix(name: &str) -> &str {
    if let Some(idx) = name.find('.') {
        &name[..idx]
    } else if let Some(idx) = name.find('/') {
        &name[..idx]
    } else {
        name
    }
}

/// Longest substring occurring literally in every input string
///
/// The shortest input is the candidate source. Lengths are scanned from
/// longest to shortest and offsets left to right, so ties favor the longest
/// match and then the leftmost position in the shortest string. Returns an
/// empty string for empty input.
pub fn longest_common_substring(strings: &[&str]) -> String {
    let Some(shortest) = strings.iter().min_by_key(|s| s.len()) else {
        return String::new();
    };

    // Byte offsets are safe here: package names are ASCII in practice, and a
    // non-boundary slice is simply skipped.
    let max_len = shortest.len();
    for len in (1..=max_len).rev() {
        for start in 0..=(max_len - len) {
            let Some(candidate) = shortest.get(start..start + len) else {
                continue;
            };
            if strings.iter().all(|s| s.contains(candidate)) {
                return candidate.to_string();
            }
        }
    }
    String::new()
}

/// The grouping key for a candidate: `prefix/new-version/previous-version`
pub fn group_key(candidate: &UpdateCandidate) -> String {
    format!(
        "{}/{}",
        package_prefix(&candidate.primary.name),
        candidate.version_postfix()
    )
}

/// Bucket candidates into update groups
///
/// Candidates are sorted by primary name first so group contents, ordering,
/// and labels are byte-identical across runs for identical input. Groups
/// keep the order their key was first seen in. Only groups with more than
/// one member get a label.
pub fn group_candidates(mut candidates: Vec<UpdateCandidate>) -> Vec<UpdateGroup> {
    candidates.sort_by(|a, b| a.primary.name.cmp(&b.primary.name));

    let mut groups: Vec<UpdateGroup> = Vec::new();
    for candidate in candidates {
        let key = group_key(&candidate);
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.members.push(candidate),
            None => groups.push(UpdateGroup::new(key, candidate)),
        }
    }

    for group in &mut groups {
        if group.members.len() > 1 {
            group.name = Some(group_label(group));
        }
    }

    groups
}

/// Label for a batched group: common substring of the member names with a
/// trailing `.` stripped, plus the shared version postfix
fn group_label(group: &UpdateGroup) -> String {
    let names = group.primary_names();
    let common = longest_common_substring(&names);
    // A separator at the prefix boundary is not part of the label.
    let common = common.strip_suffix('.').unwrap_or(&common);
    format!("{}/{}", common, group.members[0].version_postfix())
}
