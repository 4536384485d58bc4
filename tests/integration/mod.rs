//! Integration tests for channel-manager
//!
//! Each test builds a throwaway channel directory and drives the real binary.

mod helpers;
mod test_status;
mod test_upload;
