//! Core building blocks shared by every command
//!
//! - **config**: channel/staging directory resolution and channel layout
//! - **context**: resolved directories plus channel descriptor, built once in main
//! - **error**: error types with contextual help messages and exit codes
//! - **fs**: filesystem capability (real and in-memory)

pub mod config;
pub mod context;
pub mod error;
pub mod fs;
