//! Shared test utilities for the csv2bufr workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Temporary exports volumes and input file helpers
//! - DAYCLI CSV, mapping template and BUFR payload fixtures
//! - `ScriptedEngine`, a conversion engine with a fixed outcome
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../../crates/test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, ScriptedEngine};
//! ```

pub mod engine;
pub mod fixtures;
pub mod paths;

// Re-export commonly used items at the crate root
pub use engine::ScriptedEngine;
pub use fixtures::*;
pub use paths::*;
