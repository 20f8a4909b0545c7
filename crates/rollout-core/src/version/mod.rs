//! App version comparison helpers.
//!
//! Installed versions reported by devices are often short (`2.0`) rather than
//! full semantic versions, so parsing pads missing components before handing
//! off to `semver`. Anything that still fails to parse is compared as a plain
//! string.

use std::cmp::Ordering;

/// Parse a version string leniently.
///
/// Strips a leading `v`, and pads one or two numeric components to three
/// (`2` -> `2.0.0`, `2.1` -> `2.1.0`).
pub fn parse_lenient(input: &str) -> Option<semver::Version> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    if trimmed.is_empty() {
        return None;
    }

    if let Ok(version) = semver::Version::parse(trimmed) {
        return Some(version);
    }

    // Split off pre-release/build metadata before padding the numeric core
    let split_at = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, suffix) = trimmed.split_at(split_at);
    let components: Vec<&str> = core.split('.').collect();

    if components.len() >= 3
        || components
            .iter()
            .any(|c| c.is_empty() || !c.chars().all(|ch| ch.is_ascii_digit()))
    {
        return None;
    }

    let mut padded = components.join(".");
    for _ in components.len()..3 {
        padded.push_str(".0");
    }
    padded.push_str(suffix);

    semver::Version::parse(&padded).ok()
}

/// Compare two version strings.
///
/// Uses semantic-version ordering when both sides parse, string ordering
/// otherwise.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (parse_lenient(a), parse_lenient(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => a.trim().cmp(b.trim()),
    }
}

/// Whether an installed version counts as the target version.
pub fn versions_match(installed: &str, target: &str) -> bool {
    compare_versions(installed, target) == Ordering::Equal
}
