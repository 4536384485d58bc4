//! Channel descriptor (`channel.xml`)

use super::xml::Document;
use crate::core::error::{ChannelResult, ConfigError};
use crate::core::fs::Filesystem;
use serde::Serialize;
use std::path::Path;

pub const CHANNEL_FILE: &str = "channel.xml";

/// Identity of the channel. All three fields are required and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelDescriptor {
  pub name: String,
  pub uri: String,
  pub summary: String,
}

impl ChannelDescriptor {
  /// Load `channel.xml` from the channel directory
  pub fn load(fs: &impl Filesystem, channel_dir: &Path) -> ChannelResult<Self> {
    let path = channel_dir.join(CHANNEL_FILE);
    if !fs.exists(&path) {
      return Err(
        ConfigError::ChannelFileNotFound {
          channel_dir: channel_dir.to_path_buf(),
        }
        .into(),
      );
    }

    let unreadable = |reason: String| ConfigError::ChannelFileUnreadable {
      path: path.clone(),
      reason,
    };
    let bytes = fs.read(&path).map_err(|e| unreadable(e.to_string()))?;
    let source = String::from_utf8(bytes).map_err(|e| unreadable(e.to_string()))?;
    let doc = Document::parse(&source).map_err(unreadable)?;

    let required = |field: &'static str| -> ChannelResult<String> {
      match doc.root.field(field).map(|value| value.trim().to_string()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(
          ConfigError::MissingField {
            field,
            path: path.clone(),
          }
          .into(),
        ),
      }
    };

    Ok(Self {
      name: required("name")?,
      uri: required("uri")?,
      summary: required("summary")?,
    })
  }
}
