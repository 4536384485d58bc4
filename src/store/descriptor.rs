//! The `package.xml` descriptor shipped inside every package archive
//!
//! Only `version` and `notes` are interpreted; every other field, attribute
//! and nested element passes through as parsed.

use super::xml::Document;

const VERSION: &str = "version";
const NOTES: &str = "notes";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
  document: Document,
}

impl PackageDescriptor {
  pub fn parse(source: &str) -> Result<Self, String> {
    Document::parse(source).map(|document| Self { document })
  }

  pub fn version(&self) -> Option<String> {
    self.document.root.field(VERSION)
  }

  #[cfg(test)]
  fn notes(&self) -> Option<String> {
    self.document.root.field(NOTES)
  }

  /// Stamp the descriptor for a release.
  ///
  /// `version` is always overwritten with the registered version. `notes`
  /// keeps any non-blank value byte for byte and otherwise becomes
  /// `Release <version>`.
  pub fn stamp_release(&mut self, version: &str) {
    let root = &mut self.document.root;
    root.put_field(VERSION, version);

    let default_notes = format!("Release {}", version);
    match root.child_mut(NOTES) {
      Some(notes) if notes.text().trim().is_empty() && !notes.has_elements() => notes.set_text(default_notes),
      Some(_) => {}
      None => root.set_field(NOTES, &default_notes),
    }
  }

  pub fn serialize(&self) -> String {
    self.document.serialize()
  }
}
