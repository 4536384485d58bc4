//! Terminal output helpers

pub mod logging;
