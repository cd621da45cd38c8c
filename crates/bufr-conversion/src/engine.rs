//! The conversion engine trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::record::ConversionRecord;

/// Converts CSV text into BUFR messages, one record per input row.
///
/// Implementations return the full record sequence or fail before
/// returning anything; callers never see a partial sequence.
#[async_trait]
pub trait ConversionEngine: Send + Sync {
    /// Convert `csv` using the `mappings` template document.
    ///
    /// Records come back in input-row order. Rows the engine could not
    /// encode are reported as records without a payload, not as errors.
    async fn convert(&self, csv: &str, mappings: &Value) -> Result<Vec<ConversionRecord>>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}
