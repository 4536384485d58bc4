//! Test helpers for integration tests

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A channel directory with channel.xml and an empty staging directory
pub struct TestChannel {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestChannel {
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    std::fs::write(
      path.join("channel.xml"),
      r#"<?xml version="1.0"?>
<channel>
  <name>community</name>
  <uri>https://connect.example.com/community</uri>
  <summary>Community channel</summary>
</channel>
"#,
    )?;
    std::fs::create_dir_all(path.join("temp"))?;

    Ok(Self { _root: root, path })
  }

  /// Channel directory without channel.xml
  pub fn bare() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    Ok(Self { _root: root, path })
  }

  /// Put a `.tgz` with the given entries into the staging directory
  pub fn stage_archive(&self, file_name: &str, entries: &[(&str, &str)]) -> Result<PathBuf> {
    let path = self.path.join("temp").join(file_name);
    std::fs::write(&path, tgz(entries)?)?;
    Ok(path)
  }

  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  pub fn read_file(&self, path: &str) -> Result<String> {
    std::fs::read_to_string(self.path.join(path)).with_context(|| format!("Failed to read {}", path))
  }
}

/// Build a gzip-compressed tar archive in memory
pub fn tgz(entries: &[(&str, &str)]) -> Result<Vec<u8>> {
  let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
  for (name, data) in entries {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, name, data.as_bytes())?;
  }
  Ok(builder.into_inner()?.finish()?)
}

/// Contents of one archive entry as a string
pub fn archive_entry(archive: &Path, name: &str) -> Result<Option<String>> {
  let bytes = std::fs::read(archive)?;
  let mut archive = tar::Archive::new(GzDecoder::new(bytes.as_slice()));
  for entry in archive.entries()? {
    let mut entry = entry?;
    if entry.path()?.as_ref() == Path::new(name) {
      let mut contents = String::new();
      entry.read_to_string(&mut contents)?;
      return Ok(Some(contents));
    }
  }
  Ok(None)
}

/// Run channel-manager and return its output, successful or not
pub fn channel_manager(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_channel-manager");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .env_remove("RUST_LOG")
    .output()
    .context("Failed to run channel-manager")
}

/// Run channel-manager and fail unless it exits successfully
pub fn run_channel_manager(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = channel_manager(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "channel-manager command failed: channel-manager {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}
