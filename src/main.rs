mod archive;
mod commands;
mod core;
mod release;
mod store;
mod ui;
mod utils;

use clap::{Parser, Subcommand};
use core::context::ChannelContext;
use core::error::{ChannelError, print_error};
use std::path::PathBuf;

/// Publish package archives into a file-based distribution channel
#[derive(Parser)]
#[command(name = "channel-manager")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Channel directory (must contain channel.xml)
  #[arg(short = 'd', long = "dir", global = true, value_name = "DIR")]
  dir: Option<PathBuf>,

  /// Staging directory for uploaded archives [default: <DIR>/temp]
  #[arg(short = 't', long = "temp-dir", global = true, value_name = "DIR")]
  temp_dir: Option<PathBuf>,

  /// Increase log verbosity (-v debug, -vv trace)
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  verbose: u8,

  /// Only log errors
  #[arg(short, long, global = true, conflicts_with = "verbose")]
  quiet: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Register a staged archive as a new release of a package
  Upload {
    /// Package name
    package_name: String,
    /// Version to release
    package_version: String,
    /// Release stability: alpha, beta or stable (anything else means stable)
    #[arg(short, long, default_value = "stable")]
    stability: String,
    /// Staged archive name inside the temp directory [default: <NAME>-<VERSION>.tgz]
    #[arg(short = 'f', long)]
    file: Option<String>,
    /// Show what would be written without touching the channel
    #[arg(long)]
    dry_run: bool,
    /// Output the result in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Show registered packages, or the release history of one package
  Status {
    /// Package to show releases for
    package_name: Option<String>,
    /// Output status in JSON format
    #[arg(long)]
    json: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();

  ui::logging::setup_logging(cli.verbose, cli.quiet);

  let ctx = match ChannelContext::build(cli.dir.as_deref(), cli.temp_dir.as_deref()) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::Upload {
      package_name,
      package_version,
      stability,
      file,
      dry_run,
      json,
    } => commands::run_upload(&ctx, package_name, package_version, stability, file, dry_run, json),
    Commands::Status { package_name, json } => commands::run_status(&ctx, package_name, json),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

/// Print the error and exit with its code
fn handle_error(err: ChannelError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
