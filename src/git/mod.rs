//! Git operations module
//!
//! Handles repository locations, ref validation and the sparse checkout
//! commands delegated to the `git` binary

pub mod command;
pub mod mock;
pub mod reference;
pub mod repository;
pub mod sparse_checkout;

pub use command::*;
pub use mock::MockVersionControl;
pub use reference::*;
pub use repository::*;
pub use sparse_checkout::*;
