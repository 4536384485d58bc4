//! Upload command implementation
//!
//! Registers one staged archive as a new release of a package.

use crate::core::context::ChannelContext;
use crate::core::error::{ChannelResult, ResultExt};
use crate::release::{Registrar, RegistrationPlan, RegistrationRequest};

/// Run the upload command
pub fn run_upload(
  ctx: &ChannelContext,
  package_name: String,
  package_version: String,
  stability: String,
  file: Option<String>,
  dry_run: bool,
  json: bool,
) -> ChannelResult<()> {
  let mut request = RegistrationRequest::new(package_name, package_version).stability(stability);
  if let Some(file) = file {
    request = request.archive_file(file);
  }

  let registrar = Registrar::new(&ctx.fs, &ctx.paths);

  if dry_run {
    let plan = registrar.plan(&request)?;
    if json {
      println!(
        "{}",
        serde_json::to_string_pretty(&plan).context("Failed to render plan as JSON")?
      );
    } else {
      print_plan(ctx, &plan);
      println!("🔍 Dry-run mode (no changes applied)");
    }
    return Ok(());
  }

  let report = registrar.register(&request)?;

  if json {
    println!(
      "{}",
      serde_json::to_string_pretty(&report).context("Failed to render report as JSON")?
    );
  } else {
    println!(
      "📦 {} {} ({}) published to '{}'",
      report.package, report.version, report.stability, ctx.descriptor.name
    );
    println!("   Archive:    {}", report.archive_path.display());
    println!("   Descriptor: {}", report.descriptor_path.display());
    println!();
    println!("Package was uploaded successfully");
  }

  Ok(())
}

fn print_plan(ctx: &ChannelContext, plan: &RegistrationPlan) {
  println!("📋 Upload Plan for '{}' in channel '{}'", plan.package, ctx.descriptor.name);
  println!();
  println!("  Version:    {}", plan.version);
  println!("  Stability:  {}", plan.stability);
  println!("  Date:       {}", plan.release_date);
  println!("  Archive:    {}", plan.staged_archive.display());
  println!("          ->  {}", plan.archive_path.display());
  println!("  Descriptor: {}", plan.descriptor_path.display());
  println!("  Updates:    {}", plan.releases_file.display());
  println!("              {}", plan.packages_file.display());
  println!();
  println!("  Stamped package.xml:");
  for line in plan.descriptor_xml().lines() {
    println!("    {}", line);
  }
  println!();
}
