//! Channel-wide package index (`packages.xml`)
//!
//! ```xml
//! <data>
//!   <p><n>PackageName</n><r><s>1.2.0</s><b>1.3.0-beta</b></r></p>
//! </data>
//! ```
//!
//! One `<p>` per package; `<r>` maps a single-letter stability tag to the
//! latest version registered at that tier. Newer registrations overwrite.

use super::xml::{Document, Element, Node, RootLayout};
use crate::core::error::{ChannelResult, DocumentError, ResultExt};
use crate::core::fs::Filesystem;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::path::Path;

const ROOT: &str = "data";
const ENTRY: &str = "p";
const NAME: &str = "n";
const RELEASES: &str = "r";

/// Release maturity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stability {
  Alpha,
  Beta,
  Stable,
}

impl Stability {
  /// Normalize user input; anything unrecognized is `stable`
  pub fn from_input(input: &str) -> Self {
    match input {
      "alpha" => Stability::Alpha,
      "beta" => Stability::Beta,
      _ => Stability::Stable,
    }
  }

  /// Tag used inside the index's `<r>` element
  pub fn tag(self) -> &'static str {
    match self {
      Stability::Alpha => "a",
      Stability::Beta => "b",
      Stability::Stable => "s",
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Stability::Alpha => "alpha",
      Stability::Beta => "beta",
      Stability::Stable => "stable",
    }
  }

  /// Reverse of [`Stability::tag`]
  pub fn from_tag(tag: &str) -> Option<Self> {
    match tag {
      "a" => Some(Stability::Alpha),
      "b" => Some(Stability::Beta),
      "s" => Some(Stability::Stable),
      _ => None,
    }
  }
}

impl fmt::Display for Stability {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Stability tag -> latest version, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseStabilityMap {
  tiers: Vec<(String, String)>,
}

impl ReleaseStabilityMap {
  /// Version recorded under a tag (first match)
  pub fn get(&self, tag: &str) -> Option<&str> {
    self.tiers.iter().find(|(t, _)| t == tag).map(|(_, v)| v.as_str())
  }

  /// Upsert one tier's version
  pub fn set_stability_version(&mut self, tag: &str, version: &str) {
    match self.tiers.iter_mut().find(|(t, _)| t == tag) {
      Some((_, v)) => *v = version.to_string(),
      None => self.tiers.push((tag.to_string(), version.to_string())),
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.tiers.iter().map(|(t, v)| (t.as_str(), v.as_str()))
  }

  fn from_element(element: &Element) -> Self {
    Self {
      tiers: element
        .elements()
        .map(|c| (c.name.clone(), c.text()))
        .collect(),
    }
  }

  fn to_element(&self) -> Element {
    let mut element = Element::new(RELEASES);
    for (tag, version) in &self.tiers {
      element.push(Element::with_text(tag.as_str(), version.as_str()));
    }
    element
  }
}

impl Serialize for ReleaseStabilityMap {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.tiers.len()))?;
    for (tag, version) in &self.tiers {
      let key = Stability::from_tag(tag).map(Stability::as_str).unwrap_or(tag.as_str());
      map.serialize_entry(key, version)?;
    }
    map.end()
  }
}

/// One package in the index
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PackageIndexEntry {
  pub name: String,
  pub releases: Option<ReleaseStabilityMap>,
  /// Content other than `<n>`/`<r>`, written back unchanged
  #[serde(skip)]
  extra: Vec<Node>,
}

impl PackageIndexEntry {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      releases: None,
      extra: Vec::new(),
    }
  }

  /// Existing releases map, or a freshly created empty one
  pub fn ensure_release_bucket(&mut self) -> &mut ReleaseStabilityMap {
    self.releases.get_or_insert_with(ReleaseStabilityMap::default)
  }

  fn from_element(element: &Element) -> Self {
    let mut entry = Self::new(element.field_or(NAME, ""));
    let mut seen_name = false;
    for node in &element.content {
      match node {
        Node::Element(child) if child.name == NAME && !seen_name => seen_name = true,
        Node::Element(child) if child.name == RELEASES && entry.releases.is_none() => {
          entry.releases = Some(ReleaseStabilityMap::from_element(child))
        }
        node if node.is_padding() => {}
        node => entry.extra.push(node.clone()),
      }
    }
    entry
  }

  fn to_element(&self) -> Element {
    let mut element = Element::new(ENTRY);
    element.push(Element::with_text(NAME, self.name.as_str()));
    if let Some(releases) = &self.releases {
      element.push(releases.to_element());
    }
    element.content.extend(self.extra.iter().cloned());
    element
  }
}

/// The whole `packages.xml` document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageIndex {
  layout: RootLayout,
  encoding: Option<String>,
  pub entries: Vec<PackageIndexEntry>,
}

impl Default for PackageIndex {
  fn default() -> Self {
    Self {
      layout: RootLayout::new(ROOT),
      encoding: None,
      entries: Vec::new(),
    }
  }
}

impl PackageIndex {
  /// Parse the index if the file exists, otherwise start an empty one
  pub fn load_or_init(fs: &impl Filesystem, path: &Path) -> ChannelResult<Self> {
    if !fs.exists(path) {
      tracing::debug!(path = %path.display(), "package index not found, starting empty");
      return Ok(Self::default());
    }
    let bytes = fs
      .read(path)
      .with_context(|| format!("Failed to read {}", path.display()))?;
    let source = String::from_utf8(bytes).map_err(|e| DocumentError::malformed(path, e.to_string()))?;
    Self::parse(&source).map_err(|reason| DocumentError::malformed(path, reason).into())
  }

  pub fn parse(source: &str) -> Result<Self, String> {
    let doc = Document::parse(source)?;
    let (layout, records) = RootLayout::split(&doc.root, ENTRY);
    let entries = records.into_iter().map(PackageIndexEntry::from_element).collect();
    Ok(Self {
      layout,
      encoding: doc.encoding,
      entries,
    })
  }

  /// First entry with the given name
  pub fn find_package_entry(&self, name: &str) -> Option<&PackageIndexEntry> {
    self.entries.iter().find(|e| e.name == name)
  }

  /// Existing entry, or a new one appended with no releases
  pub fn ensure_package_entry(&mut self, name: &str) -> &mut PackageIndexEntry {
    let position = match self.entries.iter().position(|e| e.name == name) {
      Some(position) => position,
      None => {
        self.entries.push(PackageIndexEntry::new(name));
        self.entries.len() - 1
      }
    };
    &mut self.entries[position]
  }

  pub fn serialize(&self) -> String {
    let root = self.layout.render(self.entries.iter().map(PackageIndexEntry::to_element));
    Document {
      encoding: self.encoding.clone(),
      root,
    }
    .serialize()
  }
}
