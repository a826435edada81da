//! Operations module
//!
//! Coordinates the subfolder fetch and the relocation of its result

pub mod fetch;
pub mod relocate;

pub use fetch::*;
pub use relocate::*;
