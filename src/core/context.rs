//! Channel context - resolve once, pass everywhere
//!
//! ```text
//! main.rs:
//!   ChannelContext::build(--dir, --temp-dir) -> &ChannelContext
//!   |
//!   v
//! commands/upload.rs, status.rs:
//!   fn run_*(ctx: &ChannelContext, ...)
//! ```

use crate::core::config::ChannelPaths;
use crate::core::error::ChannelResult;
use crate::core::fs::OsFilesystem;
use crate::store::ChannelDescriptor;
use std::path::Path;

/// Everything a command needs to know about the channel it operates on
#[derive(Debug, Clone)]
pub struct ChannelContext {
  /// Validated channel and staging directories (absolute)
  pub paths: ChannelPaths,

  /// Parsed channel.xml
  pub descriptor: ChannelDescriptor,

  /// Filesystem used for all channel access
  pub fs: OsFilesystem,
}

impl ChannelContext {
  /// Resolve directories and load the channel descriptor.
  ///
  /// Fails with a configuration error if either directory is unusable or
  /// channel.xml is missing or incomplete.
  pub fn build(channel_dir: Option<&Path>, temp_dir: Option<&Path>) -> ChannelResult<Self> {
    let fs = OsFilesystem;
    let paths = ChannelPaths::resolve(channel_dir, temp_dir)?;
    let descriptor = ChannelDescriptor::load(&fs, &paths.channel_dir)?;
    tracing::debug!(
      channel = %descriptor.name,
      dir = %paths.channel_dir.display(),
      temp = %paths.temp_dir.display(),
      "channel context ready"
    );

    Ok(Self { paths, descriptor, fs })
  }
}
