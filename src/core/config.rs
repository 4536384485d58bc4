//! Channel and staging directory resolution
//!
//! Directories come from `--dir` (default `.`) and `--temp-dir` (default
//! `<channel>/temp`). Both must exist and be readable and writable before any
//! command runs; the staging directory is created on demand.

use crate::core::error::{ChannelResult, ConfigError, ResultExt};
use crate::utils::join_relative;
use std::fs;
use std::path::{Path, PathBuf};

pub const PACKAGES_FILE: &str = "packages.xml";
pub const RELEASES_FILE: &str = "releases.xml";
pub const DESCRIPTOR_FILE: &str = "package.xml";
pub const ARCHIVE_EXTENSION: &str = ".tgz";
const DEFAULT_TEMP_DIR: &str = "temp";

/// Resolved, validated channel layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPaths {
  pub channel_dir: PathBuf,
  pub temp_dir: PathBuf,
}

impl ChannelPaths {
  /// Use already-validated directories as-is
  pub fn new(channel_dir: impl Into<PathBuf>, temp_dir: impl Into<PathBuf>) -> Self {
    Self {
      channel_dir: channel_dir.into(),
      temp_dir: temp_dir.into(),
    }
  }

  /// Resolve the directories given on the command line
  pub fn resolve(channel_dir: Option<&Path>, temp_dir: Option<&Path>) -> ChannelResult<Self> {
    let channel_dir = channel_dir.unwrap_or(Path::new("."));
    validate_directory(channel_dir, "Channel")?;
    let channel_dir = fs::canonicalize(channel_dir)
      .with_context(|| format!("Failed to resolve channel directory {}", channel_dir.display()))?;

    let temp_dir = match temp_dir {
      Some(dir) => dir.to_path_buf(),
      None => channel_dir.join(DEFAULT_TEMP_DIR),
    };
    if !temp_dir.as_os_str().is_empty() && !temp_dir.exists() {
      tracing::debug!(path = %temp_dir.display(), "creating staging directory");
      fs::create_dir_all(&temp_dir)
        .with_context(|| format!("Failed to create staging directory {}", temp_dir.display()))?;
    }
    validate_directory(&temp_dir, "Channel temp")?;
    let temp_dir = fs::canonicalize(&temp_dir)
      .with_context(|| format!("Failed to resolve staging directory {}", temp_dir.display()))?;

    Ok(Self::new(channel_dir, temp_dir))
  }

  /// `<channel>/packages.xml`
  pub fn packages_file(&self) -> PathBuf {
    self.channel_dir.join(PACKAGES_FILE)
  }

  /// `<channel>/<package>`
  pub fn package_dir(&self, package: &str) -> PathBuf {
    join_relative(&self.channel_dir, package)
  }

  /// `<channel>/<package>/releases.xml`
  pub fn releases_file(&self, package: &str) -> PathBuf {
    self.package_dir(package).join(RELEASES_FILE)
  }

  /// `<channel>/<package>/<version>`
  pub fn release_dir(&self, package: &str, version: &str) -> PathBuf {
    join_relative(&self.package_dir(package), version)
  }

  /// Staged archive location for an optional `--file` override
  ///
  /// Without an override the name is `<package>-<version>.tgz`. An override
  /// gets `.tgz` appended unless it already mentions it.
  pub fn staged_archive(&self, package: &str, version: &str, file: Option<&str>) -> PathBuf {
    let file_name = match file.filter(|f| !f.is_empty()) {
      Some(file) if file.contains(ARCHIVE_EXTENSION) => file.to_string(),
      Some(file) => format!("{}{}", file, ARCHIVE_EXTENSION),
      None => archive_file_name(package, version),
    };
    join_relative(&self.temp_dir, &file_name)
  }
}

/// `<package>-<version>.tgz`
pub fn archive_file_name(package: &str, version: &str) -> String {
  format!("{}-{}{}", package, version, ARCHIVE_EXTENSION)
}

/// Directory must be given, exist, and be readable and writable
pub fn validate_directory(dir: &Path, label: &'static str) -> ChannelResult<()> {
  if dir.as_os_str().is_empty() {
    return Err(ConfigError::DirectoryNotSpecified { label }.into());
  }
  if !dir.is_dir() {
    return Err(
      ConfigError::DirectoryNotFound {
        label,
        path: dir.to_path_buf(),
      }
      .into(),
    );
  }
  if fs::read_dir(dir).is_err() {
    return Err(
      ConfigError::DirectoryNotReadable {
        label,
        path: dir.to_path_buf(),
      }
      .into(),
    );
  }
  // Probe with a real file; permission bits lie for root and ACLs
  if tempfile::tempfile_in(dir).is_err() {
    return Err(
      ConfigError::DirectoryNotWritable {
        label,
        path: dir.to_path_buf(),
      }
      .into(),
    );
  }
  Ok(())
}
