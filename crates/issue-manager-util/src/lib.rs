//! Shared utilities for issue-manager
//!
//! This crate provides:
//! - ID types (IssueNumber, Keyword)
//! - Wall-clock time with a debug-only override
//! - Duration formatting for logs

mod ids;
mod time;

pub use ids::*;
pub use time::*;
