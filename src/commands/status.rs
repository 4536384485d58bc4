//! Status command implementation
//!
//! Read-only view of the channel: the package index, or one package's
//! release history next to its latest version per tier.

use crate::core::context::ChannelContext;
use crate::core::error::{ChannelResult, ResultExt};
use crate::store::{
  ChannelDescriptor, PackageIndex, PackageIndexEntry, ReleaseHistory, ReleaseRecord, ReleaseStabilityMap, Stability,
};
use crate::utils::require_path_component;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ChannelStatus<'a> {
  channel: &'a ChannelDescriptor,
  packages: &'a [PackageIndexEntry],
}

#[derive(Debug, Serialize)]
struct PackageStatus<'a> {
  channel: &'a ChannelDescriptor,
  package: &'a str,
  latest: Option<&'a ReleaseStabilityMap>,
  releases: &'a [ReleaseRecord],
}

/// Run the status command
pub fn run_status(ctx: &ChannelContext, package_name: Option<String>, json: bool) -> ChannelResult<()> {
  let index = PackageIndex::load_or_init(&ctx.fs, &ctx.paths.packages_file())?;

  let Some(package) = package_name else {
    if json {
      let status = ChannelStatus {
        channel: &ctx.descriptor,
        packages: &index.entries,
      };
      println!(
        "{}",
        serde_json::to_string_pretty(&status).context("Failed to render status as JSON")?
      );
    } else {
      print_channel_header(&ctx.descriptor);
      print_index(&index);
    }
    return Ok(());
  };

  require_path_component("Package name", &package)?;
  let history = ReleaseHistory::load_or_init(&ctx.fs, &ctx.paths.releases_file(&package))?;
  let latest = index
    .find_package_entry(&package)
    .and_then(|entry| entry.releases.as_ref());

  if json {
    let status = PackageStatus {
      channel: &ctx.descriptor,
      package: &package,
      latest,
      releases: &history.records,
    };
    println!(
      "{}",
      serde_json::to_string_pretty(&status).context("Failed to render status as JSON")?
    );
  } else {
    print_channel_header(&ctx.descriptor);
    print_history(&package, latest, &history);
  }

  Ok(())
}

fn print_channel_header(channel: &ChannelDescriptor) {
  println!("\n📡 {} ({})", channel.name, channel.uri);
  println!("   {}\n", channel.summary);
}

fn print_index(index: &PackageIndex) {
  if index.entries.is_empty() {
    println!("⚠️  No packages registered yet");
    println!();
    return;
  }

  println!("{:<30} {:<16} {:<16} STABLE", "PACKAGE", "ALPHA", "BETA");
  println!("{:-<80}", "");
  for entry in &index.entries {
    let tier = |stability: Stability| {
      entry
        .releases
        .as_ref()
        .and_then(|r| r.get(stability.tag()))
        .unwrap_or("-")
        .to_string()
    };
    println!(
      "{:<30} {:<16} {:<16} {}",
      entry.name,
      tier(Stability::Alpha),
      tier(Stability::Beta),
      tier(Stability::Stable)
    );
  }
  println!();
}

fn print_history(package: &str, latest: Option<&ReleaseStabilityMap>, history: &ReleaseHistory) {
  if let Some(latest) = latest {
    let tiers: Vec<String> = latest
      .iter()
      .map(|(tag, version)| {
        let label = Stability::from_tag(tag).map(Stability::as_str).unwrap_or(tag);
        format!("{} {}", label, version)
      })
      .collect();
    println!("🏷️  Latest: {}\n", tiers.join(", "));
  }

  if history.records.is_empty() {
    println!("⚠️  No releases registered for '{}'", package);
    println!();
    return;
  }

  println!("{:<24} {:<12} DATE", "VERSION", "STABILITY");
  println!("{:-<50}", "");
  for record in &history.records {
    println!(
      "{:<24} {:<12} {}",
      record.version(),
      record.stability(),
      record.date()
    );
  }
  println!();
}
