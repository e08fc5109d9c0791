//! GitHub REST v3 tracker for issue-manager
//!
//! Implements [`issue_manager_tracker_api::Tracker`] over the GitHub issues,
//! pulls and timeline endpoints.

mod client;
mod models;
mod repo;

pub use client::*;
pub use repo::*;
