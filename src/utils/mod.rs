//! Utility modules
//!
//! Filesystem helpers for relocation and path helpers for input validation

pub mod fs;
pub mod path;
