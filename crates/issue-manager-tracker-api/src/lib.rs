//! Issue tracker interfaces for issue-manager
//!
//! This crate defines the data the decision logic consumes and the commands
//! it issues, independent of any concrete tracker. It contains no HTTP code
//! itself.

mod mock;
mod traits;
mod types;

pub use mock::*;
pub use traits::*;
pub use types::*;
