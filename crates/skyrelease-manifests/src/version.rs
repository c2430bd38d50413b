//! No-carry version increment

use skyrelease_core::error::{Result, VersionError};

/// Increment the final dot-separated segment of `version`.
///
/// Only the last segment changes; it never carries into the segment before
/// it, so `1.9` becomes `1.10` and `9` becomes `10`.
pub fn increment_version(version: &str) -> Result<String> {
    let invalid = |reason: String| VersionError::InvalidFormat {
        version: version.to_string(),
        reason,
    };

    let (prefix, last) = match version.rsplit_once('.') {
        Some((prefix, last)) => (Some(prefix), last),
        None => (None, version),
    };

    let number: u64 = last
        .parse()
        .map_err(|e| invalid(format!("final segment '{}' is not an integer: {}", last, e)))?;
    let next = number
        .checked_add(1)
        .ok_or_else(|| invalid(format!("final segment '{}' overflows", last)))?;

    Ok(match prefix {
        Some(prefix) => format!("{}.{}", prefix, next),
        None => next.to_string(),
    })
}
