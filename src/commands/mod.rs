//! CLI commands for channel-manager
//!
//! - **upload**: register a staged archive as a new package release
//! - **status**: show the package index or one package's release history
//!
//! All commands accept `&ChannelContext` so directories and the channel
//! descriptor are resolved once.

pub mod status;
pub mod upload;

pub use status::run_status;
pub use upload::run_upload;
