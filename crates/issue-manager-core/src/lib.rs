//! Core decision engine for issue-manager
//!
//! This crate is the heart of issue-manager, containing:
//! - Interaction history extraction (what happened on an issue, and when)
//! - Policy evaluation (remove label, remind, close, or nothing)
//! - Action execution against a tracker
//! - Run orchestration (single issue or sweep)

mod actions;
mod engine;
mod executor;
mod history;
mod orchestrator;

pub use actions::*;
pub use engine::*;
pub use executor::*;
pub use history::*;
pub use orchestrator::*;
