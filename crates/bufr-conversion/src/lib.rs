//! Conversion engine seam for the csv2bufr service.
//!
//! The actual CSV-to-BUFR transformation (CSV parsing, template-driven
//! field mapping, BUFR encoding) lives in an external library. This crate
//! defines how the service talks to it:
//!
//! - [`ConversionEngine`] - the trait the HTTP layer calls
//! - [`ConversionRecord`] - one per input row, payload plus metadata
//! - [`CommandEngine`] - runs the bridge script that wraps the external library
//!
//! Tests substitute their own engine through the same trait.

pub mod command;
pub mod engine;
pub mod error;
pub mod record;

// Re-exports
pub use command::{CommandEngine, CommandEngineConfig};
pub use engine::ConversionEngine;
pub use error::{ConversionError, Result};
pub use record::ConversionRecord;
