//! Download module.
//!
//! This module provides:
//! - The startup sequence that builds a run
//! - The sequential batch runner and its context
//! - Per-post outcomes and run statistics

pub mod runner;
pub mod startup;
pub mod state;

pub use runner::{RunContext, Runner};
pub use startup::{bootstrap, Startup};
pub use state::{PostOutcome, RunStats};
