//! Error types for channel-manager with contextual messages and exit codes
//!
//! Every failure of a command maps to exactly one [`ChannelError`]. Errors are
//! never retried; the command aborts and the error is rendered once by
//! [`print_error`] before the process exits with [`ChannelError::exit_code`].

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for channel-manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (configuration, invalid arguments)
  User = 1,
  /// System error (filesystem, archive I/O)
  System = 2,
  /// Registration refused (duplicate version, bad archive contents, malformed documents)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for channel-manager
#[derive(Debug)]
pub enum ChannelError {
  /// Directory or channel descriptor problems, detected before registration starts
  Config(ConfigError),

  /// Failures of the release-registration transaction
  Registration(RegistrationError),

  /// A metadata document exists but cannot be read as the expected shape
  Document(DocumentError),

  /// I/O errors
  Io(io::Error),

  /// I/O error annotated with the operation that failed
  Filesystem { context: String, source: io::Error },

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ChannelError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ChannelError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ChannelError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  ///
  /// Bare I/O errors become [`ChannelError::Filesystem`] so the failing path
  /// is reported while the exit code stays [`ExitCode::System`].
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ChannelError::Message { message, context, help } => ChannelError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ChannelError::Io(source) => ChannelError::Filesystem {
        context: ctx_str,
        source,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ChannelError::Config(_) => ExitCode::User,
      ChannelError::Registration(_) => ExitCode::Validation,
      ChannelError::Document(_) => ExitCode::Validation,
      ChannelError::Io(_) => ExitCode::System,
      ChannelError::Filesystem { .. } => ExitCode::System,
      ChannelError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ChannelError::Config(e) => e.help_message(),
      ChannelError::Registration(e) => e.help_message(),
      ChannelError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ChannelError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ChannelError::Config(e) => write!(f, "{}", e),
      ChannelError::Registration(e) => write!(f, "{}", e),
      ChannelError::Document(e) => write!(f, "{}", e),
      ChannelError::Io(e) => write!(f, "I/O error: {}", e),
      ChannelError::Filesystem { context, source } => write!(f, "{}: {}", context, source),
      ChannelError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ChannelError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ChannelError::Io(e) => Some(e),
      ChannelError::Filesystem { source, .. } => Some(source),
      _ => None,
    }
  }
}

impl From<io::Error> for ChannelError {
  fn from(err: io::Error) -> Self {
    ChannelError::Io(err)
  }
}

impl From<String> for ChannelError {
  fn from(msg: String) -> Self {
    ChannelError::message(msg)
  }
}

impl From<&str> for ChannelError {
  fn from(msg: &str) -> Self {
    ChannelError::message(msg)
  }
}

impl From<ConfigError> for ChannelError {
  fn from(err: ConfigError) -> Self {
    ChannelError::Config(err)
  }
}

impl From<RegistrationError> for ChannelError {
  fn from(err: RegistrationError) -> Self {
    ChannelError::Registration(err)
  }
}

impl From<DocumentError> for ChannelError {
  fn from(err: DocumentError) -> Self {
    ChannelError::Document(err)
  }
}

impl From<serde_json::Error> for ChannelError {
  fn from(err: serde_json::Error) -> Self {
    ChannelError::message(format!("JSON error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Directory option resolved to an empty path
  DirectoryNotSpecified { label: &'static str },

  /// Directory does not exist or is not a directory
  DirectoryNotFound { label: &'static str, path: PathBuf },

  /// Directory exists but cannot be listed
  DirectoryNotReadable { label: &'static str, path: PathBuf },

  /// Directory exists but cannot be written to
  DirectoryNotWritable { label: &'static str, path: PathBuf },

  /// channel.xml is missing from the channel directory
  ChannelFileNotFound { channel_dir: PathBuf },

  /// channel.xml exists but could not be read or parsed
  ChannelFileUnreadable { path: PathBuf, reason: String },

  /// channel.xml lacks one of name/uri/summary
  MissingField { field: &'static str, path: PathBuf },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::DirectoryNotFound { label, .. } if *label == "Channel" => {
        Some("Pass the channel root with --dir or run from inside it.".to_string())
      }
      ConfigError::DirectoryNotWritable { .. } => {
        Some("Registration writes metadata and archives; check directory permissions.".to_string())
      }
      ConfigError::ChannelFileNotFound { .. } => {
        Some("Create channel.xml with <name>, <uri> and <summary> elements.".to_string())
      }
      ConfigError::MissingField { field, .. } => Some(format!("Add a non-empty <{}> element to channel.xml.", field)),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::DirectoryNotSpecified { label } => write!(f, "{} directory is not specified", label),
      ConfigError::DirectoryNotFound { label, path } => {
        write!(f, "{} directory \"{}\" does not exist", label, path.display())
      }
      ConfigError::DirectoryNotReadable { label, path } => {
        write!(f, "{} directory \"{}\" is not readable", label, path.display())
      }
      ConfigError::DirectoryNotWritable { label, path } => {
        write!(f, "{} directory \"{}\" is not writable", label, path.display())
      }
      ConfigError::ChannelFileNotFound { channel_dir } => {
        write!(f, "Channel file not found in directory \"{}\"", channel_dir.display())
      }
      ConfigError::ChannelFileUnreadable { path, reason } => {
        write!(f, "Channel file \"{}\" is not readable: {}", path.display(), reason)
      }
      ConfigError::MissingField { field, path } => {
        write!(f, "Channel {} is not defined in file \"{}\"", field, path.display())
      }
    }
  }
}

/// Release-registration failures
#[derive(Debug)]
pub enum RegistrationError {
  /// Staged archive does not exist
  MissingArchive { path: PathBuf },

  /// The version is already recorded in the package's release history
  DuplicateVersion { package: String, version: String },

  /// The archive has no package.xml entry
  MissingDescriptor { archive: PathBuf },

  /// package.xml inside the archive is not a well-formed document
  InvalidDescriptor { archive: PathBuf, reason: String },
}

impl RegistrationError {
  fn help_message(&self) -> Option<String> {
    match self {
      RegistrationError::MissingArchive { .. } => {
        Some("Copy the archive into the staging directory (--temp-dir) or name it with --file.".to_string())
      }
      RegistrationError::DuplicateVersion { package, .. } => Some(format!(
        "Published versions are immutable; run `channel-manager status {}` to see registered versions.",
        package
      )),
      _ => None,
    }
  }
}

impl fmt::Display for RegistrationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RegistrationError::MissingArchive { path } => write!(f, "{} package file does not exist", path.display()),
      RegistrationError::DuplicateVersion { package, version } => {
        write!(f, "Package \"{}\" version \"{}\" already exists", package, version)
      }
      RegistrationError::MissingDescriptor { archive } => {
        write!(f, "File package.xml is not present in \"{}\"", archive.display())
      }
      RegistrationError::InvalidDescriptor { archive, reason } => {
        write!(f, "Invalid content of file package.xml in \"{}\": {}", archive.display(), reason)
      }
    }
  }
}

/// A document on disk that cannot be parsed
#[derive(Debug)]
pub struct DocumentError {
  pub path: PathBuf,
  pub reason: String,
}

impl DocumentError {
  pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
    Self {
      path: path.into(),
      reason: reason.into(),
    }
  }
}

impl fmt::Display for DocumentError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Malformed document \"{}\": {}", self.path.display(), self.reason)
  }
}

/// Result type alias for channel-manager
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ChannelResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ChannelResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ChannelError>,
{
  fn context(self, ctx: impl Into<String>) -> ChannelResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ChannelResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ChannelError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
