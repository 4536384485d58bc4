//! Reading and rewriting single entries of `.tgz` package archives
//!
//! Archives are handled fully in memory: the caller reads the file, asks for
//! an entry or for a rewritten copy, and writes the bytes back itself.

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{self, Read};
use std::path::Path;
use tar::{Archive, Builder};

/// 64 MB cap on a single extracted entry
const MAX_ENTRY_SIZE: u64 = 64 * 1024 * 1024;

/// Entry paths are compared without a leading `./`
fn entry_matches(path: &Path, name: &str) -> bool {
  let path = path.strip_prefix(".").unwrap_or(path);
  path == Path::new(name)
}

/// Whole contents of one entry, refusing entries over [`MAX_ENTRY_SIZE`]
///
/// The size comes from the tar header and is not trusted for allocation.
fn entry_contents<R: Read>(entry: &mut tar::Entry<'_, R>, path: &Path) -> io::Result<Vec<u8>> {
  let size = entry.size();
  if size > MAX_ENTRY_SIZE {
    return Err(io::Error::new(
      io::ErrorKind::InvalidData,
      format!("archive entry {} is too large ({} bytes)", path.display(), size),
    ));
  }
  let mut data = Vec::new();
  entry.take(MAX_ENTRY_SIZE).read_to_end(&mut data)?;
  Ok(data)
}

/// Contents of the first entry called `name`, or `None` if there is none
pub fn read_entry(archive: &[u8], name: &str) -> io::Result<Option<Vec<u8>>> {
  let mut archive = Archive::new(GzDecoder::new(archive));

  for entry in archive.entries()? {
    let mut entry = entry?;
    let path = entry.path()?.into_owned();
    if entry_matches(&path, name) {
      return entry_contents(&mut entry, &path).map(Some);
    }
  }

  Ok(None)
}

/// Copy of `archive` with entry `name` holding `contents`
///
/// The entry is replaced where it stands, or appended when missing. Every
/// other entry is copied with its original header.
pub fn write_entry(archive: &[u8], name: &str, contents: &[u8]) -> io::Result<Vec<u8>> {
  let mut source = Archive::new(GzDecoder::new(archive));
  let mut builder = Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
  let mut replaced = false;

  for entry in source.entries()? {
    let mut entry = entry?;
    let path = entry.path()?.into_owned();
    let mut header = entry.header().clone();

    if !replaced && entry_matches(&path, name) {
      header.set_size(contents.len() as u64);
      builder.append_data(&mut header, &path, contents)?;
      replaced = true;
      continue;
    }

    let data = entry_contents(&mut entry, &path)?;
    builder.append_data(&mut header, &path, data.as_slice())?;
  }

  if !replaced {
    let mut header = tar::Header::new_gnu();
    header.set_size(contents.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(chrono::Utc::now().timestamp().max(0) as u64);
    builder.append_data(&mut header, name, contents)?;
  }

  builder.into_inner()?.finish()
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;

  /// Build a `.tgz` with the given entries
  pub(crate) fn tgz(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (name, data) in entries {
      let mut header = tar::Header::new_gnu();
      header.set_size(data.len() as u64);
      header.set_mode(0o644);
      header.set_cksum();
      builder.append_data(&mut header, name, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
  }

  fn entry_names(archive: &[u8]) -> Vec<String> {
    let mut archive = Archive::new(GzDecoder::new(archive));
    archive
      .entries()
      .unwrap()
      .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
      .collect()
  }

  #[test]
  fn test_read_entry() {
    let archive = tgz(&[("app/code/Foo.php", b"<?php"), ("package.xml", b"<package/>")]);

    assert_eq!(read_entry(&archive, "package.xml").unwrap(), Some(b"<package/>".to_vec()));
    assert_eq!(read_entry(&archive, "missing.xml").unwrap(), None);
  }

  #[test]
  fn test_read_entry_with_dot_prefix() {
    let archive = tgz(&[("./package.xml", b"<package/>")]);
    assert!(read_entry(&archive, "package.xml").unwrap().is_some());
  }

  #[test]
  fn test_write_entry_replaces_in_place() {
    let archive = tgz(&[
      ("package.xml", b"<package><version>0.9.0</version></package>"),
      ("app/etc/modules/Foo.xml", b"<config/>"),
    ]);

    let rewritten = write_entry(&archive, "package.xml", b"<package><version>1.0.0</version></package>").unwrap();

    assert_eq!(entry_names(&rewritten), vec!["package.xml", "app/etc/modules/Foo.xml"]);
    assert_eq!(
      read_entry(&rewritten, "package.xml").unwrap().unwrap(),
      b"<package><version>1.0.0</version></package>"
    );
    assert_eq!(read_entry(&rewritten, "app/etc/modules/Foo.xml").unwrap().unwrap(), b"<config/>");
  }

  #[test]
  fn test_write_entry_appends_when_missing() {
    let archive = tgz(&[("lib/Foo.php", b"<?php")]);
    let rewritten = write_entry(&archive, "package.xml", b"<package/>").unwrap();

    assert_eq!(entry_names(&rewritten), vec!["lib/Foo.php", "package.xml"]);
  }

  #[test]
  fn test_oversized_entry_header_is_an_error() {
    let mut builder = Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    let descriptor: &[u8] = b"<package/>";
    let mut header = tar::Header::new_gnu();
    header.set_size(descriptor.len() as u64);
    header.set_mode(0o644);
    builder.append_data(&mut header, "package.xml", descriptor).unwrap();
    // Header claims 1 TiB; only a few bytes follow
    let mut header = tar::Header::new_gnu();
    header.set_size(1 << 40);
    header.set_mode(0o644);
    builder.append_data(&mut header, "lib/huge.bin", &b"tiny"[..]).unwrap();
    let archive = builder.into_inner().unwrap().finish().unwrap();

    assert!(read_entry(&archive, "package.xml").unwrap().is_some());
    let err = write_entry(&archive, "package.xml", b"<package/>").unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert_eq!(
      read_entry(&archive, "lib/huge.bin").unwrap_err().kind(),
      io::ErrorKind::InvalidData
    );
  }

  #[test]
  fn test_corrupt_archive_is_an_error() {
    assert!(read_entry(b"definitely not gzip", "package.xml").is_err());
    assert!(write_entry(b"definitely not gzip", "package.xml", b"").is_err());
  }
}
