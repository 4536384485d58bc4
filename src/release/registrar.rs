//! One release-registration transaction
//!
//! [`Registrar::plan`] does every read, check and in-memory mutation. Nothing
//! on disk changes while planning, so any failure there leaves the channel
//! exactly as it was. [`Registrar::apply`] then performs the writes in a fixed
//! order, metadata documents last:
//!
//! ```text
//! staged archive rewritten -> <pkg>/<version>/ created -> archive moved in
//!   -> package.xml written -> releases.xml written -> packages.xml written
//! ```
//!
//! A crash between the last two writes leaves the history ahead of the index.
//! Channel access is not locked; one registration at a time is assumed.

use crate::archive;
use crate::core::config::{ChannelPaths, DESCRIPTOR_FILE, archive_file_name};
use crate::core::error::{ChannelResult, RegistrationError, ResultExt};
use crate::core::fs::Filesystem;
use crate::store::{PackageDescriptor, PackageIndex, ReleaseHistory, Stability};
use crate::utils::require_path_component;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// What the caller asked to register
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
  pub package: String,
  pub version: String,
  /// Raw stability input; normalized during planning
  pub stability: String,
  /// `--file` override for the staged archive name
  pub archive_file: Option<String>,
}

impl RegistrationRequest {
  pub fn new(package: impl Into<String>, version: impl Into<String>) -> Self {
    Self {
      package: package.into(),
      version: version.into(),
      stability: Stability::Stable.as_str().to_string(),
      archive_file: None,
    }
  }

  pub fn stability(mut self, stability: impl Into<String>) -> Self {
    self.stability = stability.into();
    self
  }

  pub fn archive_file(mut self, file: impl Into<String>) -> Self {
    self.archive_file = Some(file.into());
    self
  }
}

/// A fully validated registration, ready to be written
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationPlan {
  pub package: String,
  pub version: String,
  pub stability: Stability,
  pub release_date: NaiveDate,
  pub staged_archive: PathBuf,
  pub package_dir: PathBuf,
  pub release_dir: PathBuf,
  pub archive_path: PathBuf,
  pub descriptor_path: PathBuf,
  pub releases_file: PathBuf,
  pub packages_file: PathBuf,
  #[serde(skip)]
  index: PackageIndex,
  #[serde(skip)]
  history: ReleaseHistory,
  #[serde(skip)]
  archive_bytes: Vec<u8>,
  #[serde(skip)]
  descriptor_xml: String,
}

impl RegistrationPlan {
  /// Rendered descriptor that will be written next to the archive
  pub fn descriptor_xml(&self) -> &str {
    &self.descriptor_xml
  }
}

/// Outcome of an applied registration
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationReport {
  pub package: String,
  pub version: String,
  pub stability: Stability,
  pub release_date: NaiveDate,
  pub archive_path: PathBuf,
  pub descriptor_path: PathBuf,
}

/// Registers releases into one channel
pub struct Registrar<'a, F: Filesystem> {
  fs: &'a F,
  paths: &'a ChannelPaths,
  today: NaiveDate,
}

impl<'a, F: Filesystem> Registrar<'a, F> {
  pub fn new(fs: &'a F, paths: &'a ChannelPaths) -> Self {
    Self {
      fs,
      paths,
      today: Local::now().date_naive(),
    }
  }

  /// Override the release date recorded in the history
  #[cfg(test)]
  pub fn released_on(mut self, date: NaiveDate) -> Self {
    self.today = date;
    self
  }

  /// Plan and apply in one go
  pub fn register(&self, request: &RegistrationRequest) -> ChannelResult<RegistrationReport> {
    let plan = self.plan(request)?;
    self.apply(plan)
  }

  /// Validate the request and compute every mutation without touching disk
  pub fn plan(&self, request: &RegistrationRequest) -> ChannelResult<RegistrationPlan> {
    let package = request.package.as_str();
    let version = request.version.as_str();
    require_path_component("Package name", package)?;
    require_path_component("Package version", version)?;

    let staged_archive = self
      .paths
      .staged_archive(package, version, request.archive_file.as_deref());
    if !self.fs.exists(&staged_archive) {
      return Err(RegistrationError::MissingArchive { path: staged_archive }.into());
    }
    debug!(archive = %staged_archive.display(), "staged archive found");

    let stability = Stability::from_input(&request.stability);
    if stability.as_str() != request.stability {
      debug!(input = %request.stability, "unrecognized stability, using stable");
    }

    let packages_file = self.paths.packages_file();
    let mut index = PackageIndex::load_or_init(self.fs, &packages_file)?;
    index
      .ensure_package_entry(package)
      .ensure_release_bucket()
      .set_stability_version(stability.tag(), version);
    debug!(package, tier = stability.tag(), version, "package index updated in memory");

    let releases_file = self.paths.releases_file(package);
    let mut history = ReleaseHistory::load_or_init(self.fs, &releases_file)?;
    if history.find_release_by_version(version).is_some() {
      return Err(
        RegistrationError::DuplicateVersion {
          package: package.to_string(),
          version: version.to_string(),
        }
        .into(),
      );
    }
    history.append_release(version, stability.as_str(), self.today);
    debug!(package, version, date = %self.today, "release history updated in memory");

    let archive_bytes = self
      .fs
      .read(&staged_archive)
      .with_context(|| format!("Failed to read {}", staged_archive.display()))?;
    let raw_descriptor = archive::read_entry(&archive_bytes, DESCRIPTOR_FILE)
      .with_context(|| format!("Failed to read archive {}", staged_archive.display()))?
      .ok_or_else(|| RegistrationError::MissingDescriptor {
        archive: staged_archive.clone(),
      })?;

    let invalid = |reason: String| RegistrationError::InvalidDescriptor {
      archive: staged_archive.clone(),
      reason,
    };
    let source = String::from_utf8(raw_descriptor).map_err(|e| invalid(e.to_string()))?;
    let mut descriptor = PackageDescriptor::parse(&source).map_err(invalid)?;
    debug!(
      previous = descriptor.version().as_deref().unwrap_or("-"),
      version,
      "stamping descriptor"
    );
    descriptor.stamp_release(version);
    let descriptor_xml = descriptor.serialize();

    let package_dir = self.paths.package_dir(package);
    let release_dir = self.paths.release_dir(package, version);
    let archive_path = release_dir.join(archive_file_name(package, version));
    let descriptor_path = release_dir.join(DESCRIPTOR_FILE);

    let archive_bytes = archive::write_entry(&archive_bytes, DESCRIPTOR_FILE, descriptor_xml.as_bytes())
      .with_context(|| format!("Failed to rewrite archive {}", staged_archive.display()))?;

    Ok(RegistrationPlan {
      package: package.to_string(),
      version: version.to_string(),
      stability,
      release_date: self.today,
      staged_archive,
      package_dir,
      release_dir,
      archive_path,
      descriptor_path,
      releases_file,
      packages_file,
      index,
      history,
      archive_bytes,
      descriptor_xml,
    })
  }

  /// Write a plan to the channel
  pub fn apply(&self, plan: RegistrationPlan) -> ChannelResult<RegistrationReport> {
    let fs = self.fs;

    fs.write(&plan.staged_archive, &plan.archive_bytes)
      .with_context(|| format!("Failed to update {}", plan.staged_archive.display()))?;

    for dir in [&plan.package_dir, &plan.release_dir] {
      fs.create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    fs.rename(&plan.staged_archive, &plan.archive_path)
      .with_context(|| {
        format!(
          "Failed to move {} to {}",
          plan.staged_archive.display(),
          plan.archive_path.display()
        )
      })?;
    debug!(archive = %plan.archive_path.display(), "archive placed");

    fs.write(&plan.descriptor_path, plan.descriptor_xml.as_bytes())
      .with_context(|| format!("Failed to write {}", plan.descriptor_path.display()))?;

    fs.write(&plan.releases_file, plan.history.serialize().as_bytes())
      .with_context(|| format!("Failed to write {}", plan.releases_file.display()))?;
    fs.write(&plan.packages_file, plan.index.serialize().as_bytes())
      .with_context(|| format!("Failed to write {}", plan.packages_file.display()))?;
    debug!(package = %plan.package, version = %plan.version, "metadata committed");

    Ok(RegistrationReport {
      package: plan.package,
      version: plan.version,
      stability: plan.stability,
      release_date: plan.release_date,
      archive_path: plan.archive_path,
      descriptor_path: plan.descriptor_path,
    })
  }
}
