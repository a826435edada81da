//! Error handling module
//!
//! Defines the fetch error taxonomy and its exit codes

pub mod types;

pub use types::*;
