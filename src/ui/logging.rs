//! Diagnostic logging
//!
//! User-facing results go to stdout with `println!`. Diagnostics go through
//! `tracing` to stderr, filtered by `-v`/`-q` or `RUST_LOG`.

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

/// Level selected by the command-line flags
pub fn level_for(verbose: u8, quiet: bool) -> Level {
  if quiet {
    Level::ERROR
  } else {
    match verbose {
      0 => Level::WARN,
      1 => Level::DEBUG,
      _ => Level::TRACE,
    }
  }
}

/// Install the global subscriber. Safe to call once per process.
pub fn setup_logging(verbose: u8, quiet: bool) {
  let level = level_for(verbose, quiet);
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("channel_manager={}", level)));

  let result = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .with_span_events(FmtSpan::NONE)
    .without_time()
    .compact()
    .try_init();

  if let Err(e) = result {
    eprintln!("Warning: logging unavailable: {}", e);
  }
}
