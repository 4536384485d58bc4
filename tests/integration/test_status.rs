//! Tests for the `status` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_status_empty_channel() -> Result<()> {
  let channel = TestChannel::new()?;

  let output = run_channel_manager(&channel.path, &["status"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("community"));
  assert!(stdout.contains("No packages registered yet"));
  assert!(!channel.file_exists("packages.xml"));

  Ok(())
}

#[test]
fn test_status_json_after_upload() -> Result<()> {
  let channel = TestChannel::new()?;
  channel.stage_archive("foo-1.0.0.tgz", &[("package.xml", "<package/>")])?;
  run_channel_manager(&channel.path, &["upload", "foo", "1.0.0", "-s", "alpha"])?;

  let output = run_channel_manager(&channel.path, &["status", "--json"])?;
  let status: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(status["channel"]["name"], "community");
  assert_eq!(status["packages"][0]["name"], "foo");
  assert_eq!(status["packages"][0]["releases"]["alpha"], "1.0.0");

  let output = run_channel_manager(&channel.path, &["status", "foo", "--json"])?;
  let status: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(status["package"], "foo");
  assert_eq!(status["latest"]["alpha"], "1.0.0");
  assert_eq!(status["releases"][0]["version"], "1.0.0");
  assert_eq!(status["releases"][0]["stability"], "alpha");

  Ok(())
}

#[test]
fn test_status_rejects_path_like_package() -> Result<()> {
  let channel = TestChannel::new()?;

  let output = channel_manager(&channel.path, &["status", "../outside"])?;

  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("must not contain path separators"));

  Ok(())
}
