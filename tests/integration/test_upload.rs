//! Tests for the `upload` command

use crate::helpers::*;
use anyhow::Result;

const DESCRIPTOR: &str = "<?xml version=\"1.0\"?>\n<package><name>foo</name><version>0.9.0</version></package>\n";

#[test]
fn test_upload_publishes_release() -> Result<()> {
  let channel = TestChannel::new()?;
  channel.stage_archive("foo-1.0.0.tgz", &[("package.xml", DESCRIPTOR), ("lib/Foo.php", "<?php")])?;

  let output = run_channel_manager(&channel.path, &["upload", "foo", "1.0.0", "-s", "beta"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Package was uploaded successfully"));

  let packages = channel.read_file("packages.xml")?;
  assert!(packages.contains("<data><p><n>foo</n><r><b>1.0.0</b></r></p></data>"));

  let releases = channel.read_file("foo/releases.xml")?;
  assert!(releases.contains("<r><v>1.0.0</v><s>beta</s><d>"));

  let descriptor = channel.read_file("foo/1.0.0/package.xml")?;
  assert!(descriptor.contains("<version>1.0.0</version>"));
  assert!(descriptor.contains("<notes>Release 1.0.0</notes>"));

  assert!(!channel.file_exists("temp/foo-1.0.0.tgz"));
  let embedded = archive_entry(&channel.path.join("foo/1.0.0/foo-1.0.0.tgz"), "package.xml")?;
  assert_eq!(embedded.as_deref(), Some(descriptor.as_str()));

  Ok(())
}

#[test]
fn test_upload_with_explicit_dirs() -> Result<()> {
  let channel = TestChannel::new()?;
  let staging = tempfile::TempDir::new()?;
  std::fs::write(
    staging.path().join("foo-2.0.0.tgz"),
    tgz(&[("package.xml", DESCRIPTOR)])?,
  )?;

  let cwd = tempfile::TempDir::new()?;
  let dir = channel.path.to_string_lossy().into_owned();
  let temp = staging.path().to_string_lossy().into_owned();
  run_channel_manager(cwd.path(), &["-d", &dir, "-t", &temp, "upload", "foo", "2.0.0"])?;

  assert!(channel.file_exists("foo/2.0.0/foo-2.0.0.tgz"));
  assert!(channel.read_file("packages.xml")?.contains("<s>2.0.0</s>"));

  Ok(())
}

#[test]
fn test_upload_duplicate_version_fails() -> Result<()> {
  let channel = TestChannel::new()?;
  channel.stage_archive("foo-1.0.0.tgz", &[("package.xml", DESCRIPTOR)])?;
  run_channel_manager(&channel.path, &["upload", "foo", "1.0.0"])?;

  let packages = channel.read_file("packages.xml")?;
  let releases = channel.read_file("foo/releases.xml")?;

  channel.stage_archive("foo-1.0.0.tgz", &[("package.xml", DESCRIPTOR)])?;
  let output = channel_manager(&channel.path, &["upload", "foo", "1.0.0", "--stability", "beta"])?;

  assert_eq!(output.status.code(), Some(3));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("already"));
  assert_eq!(channel.read_file("packages.xml")?, packages);
  assert_eq!(channel.read_file("foo/releases.xml")?, releases);

  Ok(())
}

#[test]
fn test_upload_without_channel_descriptor_fails() -> Result<()> {
  let channel = TestChannel::bare()?;

  let output = channel_manager(&channel.path, &["upload", "foo", "1.0.0"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(!channel.file_exists("packages.xml"));

  Ok(())
}

#[test]
fn test_upload_missing_archive_fails() -> Result<()> {
  let channel = TestChannel::new()?;

  let output = channel_manager(&channel.path, &["upload", "foo", "1.0.0"])?;

  assert!(!output.status.success());
  assert!(!channel.file_exists("packages.xml"));
  assert!(!channel.file_exists("foo"));

  Ok(())
}

#[test]
fn test_upload_archive_without_descriptor_fails() -> Result<()> {
  let channel = TestChannel::new()?;
  channel.stage_archive("foo-1.0.0.tgz", &[("lib/Foo.php", "<?php")])?;

  let output = channel_manager(&channel.path, &["upload", "foo", "1.0.0"])?;

  assert_eq!(output.status.code(), Some(3));
  assert!(!channel.file_exists("foo/1.0.0"));
  assert!(channel.file_exists("temp/foo-1.0.0.tgz"));

  Ok(())
}

#[test]
fn test_upload_unknown_stability_is_stable() -> Result<()> {
  let channel = TestChannel::new()?;
  channel.stage_archive("foo-1.0.0.tgz", &[("package.xml", DESCRIPTOR)])?;

  run_channel_manager(&channel.path, &["upload", "foo", "1.0.0", "-s", "nightly"])?;

  assert!(channel.read_file("packages.xml")?.contains("<r><s>1.0.0</s></r>"));
  assert!(channel.read_file("foo/releases.xml")?.contains("<s>stable</s>"));

  Ok(())
}

#[test]
fn test_upload_custom_archive_name() -> Result<()> {
  let channel = TestChannel::new()?;
  channel.stage_archive("bundle.tgz", &[("package.xml", DESCRIPTOR)])?;

  run_channel_manager(&channel.path, &["upload", "foo", "1.0.0", "--file", "bundle"])?;

  assert!(channel.file_exists("foo/1.0.0/foo-1.0.0.tgz"));
  assert!(!channel.file_exists("temp/bundle.tgz"));

  Ok(())
}

#[test]
fn test_upload_dry_run_changes_nothing() -> Result<()> {
  let channel = TestChannel::new()?;
  channel.stage_archive("foo-1.0.0.tgz", &[("package.xml", DESCRIPTOR)])?;

  let output = run_channel_manager(&channel.path, &["upload", "foo", "1.0.0", "--dry-run", "--json"])?;

  let plan: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(plan["package"], "foo");
  assert_eq!(plan["version"], "1.0.0");
  assert_eq!(plan["stability"], "stable");

  assert!(channel.file_exists("temp/foo-1.0.0.tgz"));
  assert!(!channel.file_exists("packages.xml"));
  assert!(!channel.file_exists("foo"));

  Ok(())
}

#[test]
fn test_upload_keeps_descriptor_text_verbatim() -> Result<()> {
  let channel = TestChannel::new()?;
  let descriptor = "<?xml version=\"1.0\"?>\n<package>\n  <version>0.9.0</version>\n  <notes>\n  Fixed bug\n</notes>\n  <description>Line <b>bold</b> tail</description>\n</package>\n";
  channel.stage_archive("foo-1.0.0.tgz", &[("package.xml", descriptor)])?;

  run_channel_manager(&channel.path, &["upload", "foo", "1.0.0"])?;

  assert_eq!(
    channel.read_file("foo/1.0.0/package.xml")?,
    descriptor.replace("0.9.0", "1.0.0")
  );

  Ok(())
}

#[test]
fn test_upload_rejects_padded_package_name() -> Result<()> {
  let channel = TestChannel::new()?;
  channel.stage_archive(" foo-1.0.0.tgz", &[("package.xml", DESCRIPTOR)])?;

  let output = channel_manager(&channel.path, &["upload", " foo", "1.0.0"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(!channel.file_exists("packages.xml"));

  Ok(())
}
