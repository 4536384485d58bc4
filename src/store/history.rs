//! Per-package release history (`<pkg>/releases.xml`)
//!
//! ```xml
//! <releases>
//!   <r><v>1.2.0</v><s>stable</s><d>2024-01-15</d></r>
//! </releases>
//! ```

use super::xml::{Document, Element, RootLayout};
use crate::core::error::{ChannelResult, DocumentError, ResultExt};
use crate::core::fs::Filesystem;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;

const ROOT: &str = "releases";
const RECORD: &str = "r";
const VERSION: &str = "v";
const STABILITY: &str = "s";
const DATE: &str = "d";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One registered version
///
/// Fields are read as plain text. Records loaded from disk are written back
/// exactly as they were found, whatever they contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseRecord {
  version: String,
  stability: String,
  date: String,
  #[serde(skip)]
  element: Element,
}

impl ReleaseRecord {
  pub fn new(version: &str, stability: &str, date: NaiveDate) -> Self {
    let date = date.format(DATE_FORMAT).to_string();
    let mut element = Element::new(RECORD);
    element.push(Element::with_text(VERSION, version));
    element.push(Element::with_text(STABILITY, stability));
    element.push(Element::with_text(DATE, date.as_str()));
    Self {
      version: version.to_string(),
      stability: stability.to_string(),
      date,
      element,
    }
  }

  fn from_element(element: &Element) -> Self {
    Self {
      version: element.field_or(VERSION, ""),
      stability: element.field_or(STABILITY, ""),
      date: element.field_or(DATE, ""),
      element: element.clone(),
    }
  }

  pub fn version(&self) -> &str {
    &self.version
  }

  pub fn stability(&self) -> &str {
    &self.stability
  }

  /// Release date as recorded (`YYYY-MM-DD` for records this tool writes)
  pub fn date(&self) -> &str {
    &self.date
  }
}

/// The whole `releases.xml` document for one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseHistory {
  layout: RootLayout,
  encoding: Option<String>,
  pub records: Vec<ReleaseRecord>,
}

impl Default for ReleaseHistory {
  fn default() -> Self {
    Self {
      layout: RootLayout::new(ROOT),
      encoding: None,
      records: Vec::new(),
    }
  }
}

impl ReleaseHistory {
  /// Parse the history if the file exists, otherwise start an empty one
  pub fn load_or_init(fs: &impl Filesystem, path: &Path) -> ChannelResult<Self> {
    if !fs.exists(path) {
      tracing::debug!(path = %path.display(), "release history not found, starting empty");
      return Ok(Self::default());
    }
    let bytes = fs
      .read(path)
      .with_context(|| format!("Failed to read {}", path.display()))?;
    let source = String::from_utf8(bytes).map_err(|e| DocumentError::malformed(path, e.to_string()))?;
    Self::parse(&source).map_err(|reason| DocumentError::malformed(path, reason).into())
  }

  /// Only documents that are not well-formed XML are rejected
  pub fn parse(source: &str) -> Result<Self, String> {
    let doc = Document::parse(source)?;
    let (layout, records) = RootLayout::split(&doc.root, RECORD);
    let records = records.into_iter().map(ReleaseRecord::from_element).collect();
    Ok(Self {
      layout,
      encoding: doc.encoding,
      records,
    })
  }

  /// First record with exactly this version
  pub fn find_release_by_version(&self, version: &str) -> Option<&ReleaseRecord> {
    self.records.iter().find(|r| r.version == version)
  }

  /// Append a record. Callers check [`Self::find_release_by_version`] first;
  /// nothing here stops a duplicate.
  pub fn append_release(&mut self, version: &str, stability: &str, date: NaiveDate) {
    self.records.push(ReleaseRecord::new(version, stability, date));
  }

  pub fn serialize(&self) -> String {
    let root = self.layout.render(self.records.iter().map(|r| r.element.clone()));
    Document {
      encoding: self.encoding.clone(),
      root,
    }
    .serialize()
  }
}
