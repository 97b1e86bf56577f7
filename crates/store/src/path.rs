//! Shard path utilities
//!
//! Store files are named `<destination><digit>` inside the cache directory.
//! The destination part is clamped to keep file names inside the configured
//! length limit; the trailing digit selects one of the shard candidates a
//! writer may claim when earlier ones are busy.

use std::fs;
use std::io;
use std::path::Path;

use beacon_protocol::DestinationId;

/// Suffix of sidecar lock files guarding a shard
pub const LOCK_SUFFIX: &str = ".lock";

/// Build the shard file name for a destination and candidate index
///
/// The destination is clamped (on a char boundary) so the name including
/// the digit never exceeds `max_len`.
pub fn shard_file_name(destination: &DestinationId, index: u32, max_len: usize) -> String {
    debug_assert!(index < 10, "shard index must be a single digit");

    let mut dest = destination.as_str();
    let budget = max_len.saturating_sub(1);
    if dest.len() > budget {
        let mut cut = budget;
        while cut > 0 && !dest.is_char_boundary(cut) {
            cut -= 1;
        }
        dest = &dest[..cut];
    }

    format!("{dest}{index}")
}

/// Recover the destination from a shard file name
///
/// Strips the single trailing shard digit. Returns `None` for names that
/// do not follow the shard pattern.
pub fn destination_from_file_name(name: &str) -> Option<DestinationId> {
    let last = name.chars().last()?;
    if !last.is_ascii_digit() {
        return None;
    }
    let stem = &name[..name.len() - 1];
    if stem.is_empty() {
        return None;
    }
    Some(DestinationId::new(stem))
}

/// Check if a directory entry is a shard lock file
#[inline]
pub fn is_lock_file(name: &str) -> bool {
    name.ends_with(LOCK_SUFFIX)
}

/// Total bytes of all store files in a directory
///
/// Lock files are excluded; they are bookkeeping, not cached data.
pub fn directory_size(dir: &Path) -> io::Result<u64> {
    let mut total = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if is_lock_file(&name.to_string_lossy()) {
            continue;
        }
        let metadata = entry.metadata()?;
        if metadata.is_file() {
            total += metadata.len();
        }
    }
    Ok(total)
}
