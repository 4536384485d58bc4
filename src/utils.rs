//! Path helpers shared by the channel layout and the commands

use crate::core::error::{ChannelError, ChannelResult};
use std::path::{Path, PathBuf};

/// Join `relative` under `root`, ignoring leading separators and surrounding
/// whitespace so the result never escapes to the filesystem root.
pub fn join_relative(root: &Path, relative: &str) -> PathBuf {
  let trimmed = relative.trim().trim_start_matches(['/', '\\']);
  if trimmed.is_empty() {
    root.to_path_buf()
  } else {
    root.join(trimmed)
  }
}

/// Check that a package name or version can be used as one directory name
///
/// Returns the reason it cannot.
pub fn check_path_component(value: &str) -> Result<(), &'static str> {
  if value.trim().is_empty() {
    return Err("must not be empty");
  }
  if value.trim() != value {
    return Err("must not start or end with whitespace");
  }
  if value == "." || value == ".." {
    return Err("must not be a relative directory reference");
  }
  if value.contains(['/', '\\']) {
    return Err("must not contain path separators");
  }
  Ok(())
}

/// [`check_path_component`] as a user error naming the offending input
pub fn require_path_component(label: &str, value: &str) -> ChannelResult<()> {
  check_path_component(value).map_err(|reason| {
    ChannelError::with_help(
      format!("{} {:?} {}", label, value, reason),
      "Package names and versions become directory names inside the channel.",
    )
  })
}
