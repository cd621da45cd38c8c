//! CSV-to-BUFR conversion service.
//!
//! Reads intermediate climate CSV files from a shared volume, converts them
//! to BUFR through the external csv2bufr library, writes one `.bufr4` file
//! per encoded row back to the volume and reports the paths.

pub mod config;
pub mod error;
pub mod metrics;
pub mod server;
pub mod transform;

pub use config::ServiceConfig;
pub use error::TransformError;
pub use server::{build_router, start_server, ServerState};
pub use transform::{run_transform, TransformRequest, TransformResponse};
