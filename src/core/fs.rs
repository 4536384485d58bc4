//! Filesystem capability passed into everything that touches the channel
//!
//! Commands construct an [`OsFilesystem`] once and hand it down by reference.
//! Tests use [`MemoryFilesystem`] to run whole registrations without a disk.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// The filesystem operations the channel tooling relies on
pub trait Filesystem {
  /// Whether a file or directory exists at `path`
  fn exists(&self, path: &Path) -> bool;

  /// Read a whole file
  fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

  /// Replace a whole file with `contents`
  fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

  /// Create a directory and any missing parents
  fn create_dir_all(&self, path: &Path) -> io::Result<()>;

  /// Move a file, replacing the destination
  fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// The real filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {
  fn exists(&self, path: &Path) -> bool {
    path.exists()
  }

  fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
    fs::read(path)
  }

  /// Writes go to a sibling temp file that is renamed over the target, so a
  /// reader never observes a half-written document.
  fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent,
      _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    // Temp files are created 0600; channel files must stay world-readable
    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      tmp.as_file().set_permissions(fs::Permissions::from_mode(0o644))?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
  }

  fn create_dir_all(&self, path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
  }

  fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
      Ok(()) => Ok(()),
      // Staging directory may live on another mount
      Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
        fs::copy(from, to)?;
        fs::remove_file(from)
      }
      Err(err) => Err(err),
    }
  }
}

#[cfg(test)]
pub use memory::MemoryFilesystem;


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_os_write_replaces_whole_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("packages.xml");
    let fs = OsFilesystem;

    fs.write(&path, b"<data><p/></data>").unwrap();
    fs.write(&path, b"<data/>").unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), b"<data/>");
    // No temp files left behind
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
  }

  #[test]
  fn test_os_rename_moves_file() {
    let tmp = tempfile::tempdir().unwrap();
    let from = tmp.path().join("foo-1.0.0.tgz");
    let to_dir = tmp.path().join("foo").join("1.0.0");
    let fs = OsFilesystem;

    std::fs::write(&from, b"archive").unwrap();
    fs.create_dir_all(&to_dir).unwrap();
    fs.rename(&from, &to_dir.join("foo-1.0.0.tgz")).unwrap();

    assert!(!fs.exists(&from));
    assert_eq!(fs.read(&to_dir.join("foo-1.0.0.tgz")).unwrap(), b"archive");
  }

  #[test]
  fn test_memory_write_requires_parent() {
    let fs = MemoryFilesystem::new().with_dir("/channel");

    assert!(fs.write(Path::new("/channel/packages.xml"), b"x").is_ok());
    assert!(fs.write(Path::new("/channel/foo/releases.xml"), b"x").is_err());

    fs.create_dir_all(Path::new("/channel/foo")).unwrap();
    assert!(fs.write(Path::new("/channel/foo/releases.xml"), b"x").is_ok());
  }

  #[test]
  fn test_memory_injected_failure() {
    let fs = MemoryFilesystem::new().with_dir("/channel");
    fs.fail_writes_to("/channel/packages.xml");

    assert!(fs.write(Path::new("/channel/packages.xml"), b"x").is_err());
    assert!(!fs.exists(Path::new("/channel/packages.xml")));
  }
}
