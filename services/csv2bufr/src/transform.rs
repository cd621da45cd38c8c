//! Transform orchestration: validate, read, convert, write.
//!
//! Two failure channels stay distinct in the `errors` list because
//! downstream callers match on their prefixes:
//!
//! - `Row <index>: No BUFR data produced` for a record without payload
//! - `Transform error: <message>` when conversion as a whole fails

use std::path::Path;
use std::time::Instant;

use bufr_conversion::{ConversionEngine, ConversionRecord};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::error::TransformError;
use crate::metrics;

/// Extension given to every written artifact.
pub const BUFR_EXTENSION: &str = "bufr4";

const REQUIRED_FIELDS: [&str; 3] = ["input_file", "mappings", "output_dir"];

/// A validated `/transform` request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformRequest {
    /// CSV file on the shared volume
    pub input_file: String,
    /// Template document, handed to the engine untouched
    pub mappings: Value,
    /// Directory receiving the `.bufr4` files
    pub output_dir: String,
}

impl TransformRequest {
    /// Parse and validate a raw request body.
    ///
    /// The body must be a non-empty JSON object. `input_file` and
    /// `output_dir` must be non-empty strings; `mappings` must be present
    /// and not null, `false`, `0` or `""`. An empty template object is
    /// accepted and left for the engine to judge. Unknown fields are ignored.
    pub fn from_json(body: &[u8]) -> Result<Self, TransformError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|_| TransformError::InvalidBody)?;

        let mut fields = match value {
            Value::Object(fields) if !fields.is_empty() => fields,
            _ => return Err(TransformError::InvalidBody),
        };

        let input_file = take_path(&mut fields, "input_file");
        let mappings = fields.remove("mappings").filter(is_present);
        let output_dir = take_path(&mut fields, "output_dir");

        match (input_file, mappings, output_dir) {
            (Some(input_file), Some(mappings), Some(output_dir)) => Ok(Self {
                input_file,
                mappings,
                output_dir,
            }),
            (input_file, mappings, output_dir) => {
                let present = [input_file.is_some(), mappings.is_some(), output_dir.is_some()];
                let missing = REQUIRED_FIELDS
                    .iter()
                    .zip(present)
                    .filter(|(_, present)| !present)
                    .map(|(name, _)| *name)
                    .collect();
                Err(TransformError::MissingFields(missing))
            }
        }
    }
}

fn take_path(fields: &mut Map<String, Value>, name: &str) -> Option<String> {
    match fields.remove(name) {
        Some(Value::String(path)) if !path.is_empty() => Some(path),
        _ => None,
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}

/// The response envelope returned for every `/transform` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformResponse {
    /// True iff at least one output file was written
    pub success: bool,
    /// Written artifact paths, in record order
    pub output_files: Vec<String>,
    /// Metadata documents of written records that carried one
    pub metadata: Vec<Value>,
    /// Per-record and engine-level error messages, in order
    pub errors: Vec<String>,
}

impl TransformResponse {
    /// Envelope for a request refused before conversion started.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            ..Self::default()
        }
    }

    fn finish(mut self) -> Self {
        self.success = !self.output_files.is_empty();
        self
    }
}

/// Run a validated request against `engine`.
///
/// Returns `Err` only for failures outside the conversion itself: a missing
/// input file, or I/O on the input file and output directory. Everything
/// that happens once the engine is called ends up in the envelope.
#[instrument(skip(engine, request), fields(input_file = %request.input_file, output_dir = %request.output_dir))]
pub async fn run_transform(
    engine: &dyn ConversionEngine,
    request: &TransformRequest,
) -> Result<TransformResponse, TransformError> {
    let input_path = Path::new(&request.input_file);
    if !is_regular_file(input_path).await {
        return Err(TransformError::InputNotFound(request.input_file.clone()));
    }

    let output_dir = Path::new(&request.output_dir);
    tokio::fs::create_dir_all(output_dir).await.map_err(|e| {
        TransformError::io(
            format!("Failed to create output directory {}", request.output_dir),
            e,
        )
    })?;

    let csv = tokio::fs::read_to_string(input_path).await.map_err(|e| {
        TransformError::io(
            format!("Failed to read input file {}", request.input_file),
            e,
        )
    })?;

    debug!(bytes = csv.len(), engine = engine.name(), "Starting conversion");
    let started = Instant::now();
    let mut response = TransformResponse::default();

    match engine.convert(&csv, &request.mappings).await {
        Ok(records) => {
            info!(records = records.len(), "Conversion engine returned records");
            if let Err(e) = write_records(records, output_dir, &mut response).await {
                error!(error = %e, "Writing BUFR output failed");
                response.errors.push(format!("Transform error: {}", e));
            }
        }
        Err(e) => {
            error!(error = ?e, "Conversion engine failed");
            metrics::record_engine_error();
            response.errors.push(format!("Transform error: {}", e));
        }
    }

    metrics::record_conversion_duration(started.elapsed());

    let response = response.finish();
    info!(
        written = response.output_files.len(),
        errors = response.errors.len(),
        success = response.success,
        "Transform finished"
    );
    Ok(response)
}

/// Write payload-bearing records, stopping at the first failed write.
/// Paths written before a failure stay in the response.
async fn write_records(
    records: Vec<ConversionRecord>,
    output_dir: &Path,
    response: &mut TransformResponse,
) -> Result<(), TransformError> {
    for (index, record) in records.into_iter().enumerate() {
        let meta = record.reportable_meta().cloned();
        let Some(payload) = record.bufr4 else {
            warn!(row = index, "No BUFR data produced");
            metrics::record_empty_record();
            response
                .errors
                .push(format!("Row {}: No BUFR data produced", index));
            continue;
        };

        let output_path = output_dir.join(artifact_file_name());
        let display_path = output_path.to_string_lossy().into_owned();
        tokio::fs::write(&output_path, &payload)
            .await
            .map_err(|e| TransformError::io(format!("Failed to write {}", display_path), e))?;

        debug!(row = index, path = %display_path, size = payload.len(), "Wrote BUFR file");
        metrics::record_written_record(payload.len());
        response.output_files.push(display_path);

        if let Some(meta) = meta {
            response.metadata.push(meta);
        }
    }
    Ok(())
}

/// Fresh `<32 hex chars>.bufr4` name.
pub fn artifact_file_name() -> String {
    format!("{}.{}", Uuid::new_v4().simple(), BUFR_EXTENSION)
}

async fn is_regular_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<TransformRequest, TransformError> {
        TransformRequest::from_json(value.to_string().as_bytes())
    }

    fn missing(result: Result<TransformRequest, TransformError>) -> Vec<&'static str> {
        match result {
            Err(TransformError::MissingFields(fields)) => fields,
            other => panic!("expected missing fields, got {other:?}"),
        }
    }

    // ========================================================================
    // Body parsing
    // ========================================================================

    #[test]
    fn test_valid_request() {
        let request = parse(json!({
            "input_file": "/app/exports/daycli_intermediate.csv",
            "mappings": {"header": []},
            "output_dir": "/app/exports"
        }))
        .unwrap();

        assert_eq!(request.input_file, "/app/exports/daycli_intermediate.csv");
        assert_eq!(request.mappings, json!({"header": []}));
        assert_eq!(request.output_dir, "/app/exports");
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let request = parse(json!({
            "input_file": "/in.csv",
            "mappings": {"a": 1},
            "output_dir": "/out",
            "suffix": "2024"
        }));
        assert!(request.is_ok());
    }

    #[test]
    fn test_non_json_body_rejected() {
        for body in [&b""[..], b"not json", b"{\"input_file\":"] {
            assert!(matches!(
                TransformRequest::from_json(body),
                Err(TransformError::InvalidBody)
            ));
        }
    }

    #[test]
    fn test_non_object_or_empty_body_rejected() {
        for body in [json!(null), json!([]), json!([1, 2]), json!("text"), json!({})] {
            assert!(matches!(parse(body), Err(TransformError::InvalidBody)));
        }
    }

    // ========================================================================
    // Required fields
    // ========================================================================

    #[test]
    fn test_all_fields_missing_listed_in_order() {
        let fields = missing(parse(json!({"suffix": "x"})));
        assert_eq!(fields, vec!["input_file", "mappings", "output_dir"]);
    }

    #[test]
    fn test_single_missing_field() {
        let fields = missing(parse(json!({"input_file": "/in.csv", "mappings": {"a": 1}})));
        assert_eq!(fields, vec!["output_dir"]);
    }

    #[test]
    fn test_falsy_values_count_as_missing() {
        let fields = missing(parse(json!({
            "input_file": "",
            "mappings": null,
            "output_dir": "/out"
        })));
        assert_eq!(fields, vec!["input_file", "mappings"]);

        let fields = missing(parse(json!({
            "input_file": "/in.csv",
            "mappings": false,
            "output_dir": ""
        })));
        assert_eq!(fields, vec!["mappings", "output_dir"]);
    }

    #[test]
    fn test_non_string_paths_count_as_missing() {
        let fields = missing(parse(json!({
            "input_file": 42,
            "mappings": {"a": 1},
            "output_dir": ["/out"]
        })));
        assert_eq!(fields, vec!["input_file", "output_dir"]);
    }

    #[test]
    fn test_empty_mappings_object_accepted() {
        let request = parse(json!({
            "input_file": "/data/in.csv",
            "mappings": {},
            "output_dir": "/data/out"
        }))
        .unwrap();
        assert_eq!(request.mappings, json!({}));
    }

    // ========================================================================
    // Envelope
    // ========================================================================

    #[test]
    fn test_rejected_envelope_shape() {
        let body = serde_json::to_value(TransformResponse::rejected("Request body must be JSON"))
            .unwrap();
        assert_eq!(
            body,
            json!({
                "success": false,
                "output_files": [],
                "metadata": [],
                "errors": ["Request body must be JSON"]
            })
        );
    }

    #[test]
    fn test_finish_sets_success_from_output_files() {
        let empty = TransformResponse::default().finish();
        assert!(!empty.success);

        let written = TransformResponse {
            output_files: vec!["/out/a.bufr4".into()],
            ..Default::default()
        }
        .finish();
        assert!(written.success);
    }

    // ========================================================================
    // Writing
    // ========================================================================

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_write_failure_keeps_earlier_results() {
        let mut response = TransformResponse {
            output_files: vec!["/app/exports/earlier.bufr4".into()],
            metadata: vec![json!({"id": "earlier"})],
            ..Default::default()
        };
        let records = vec![
            ConversionRecord::encoded(b"BUFR7777".to_vec(), Some(json!({"id": "lost"}))),
            ConversionRecord::empty(),
        ];

        let err = write_records(records, Path::new("/proc/self"), &mut response)
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("Failed to write /proc/self/"), "{err}");
        assert_eq!(response.output_files, vec!["/app/exports/earlier.bufr4"]);
        assert_eq!(response.metadata, vec![json!({"id": "earlier"})]);
        // Processing stops at the failed write.
        assert!(response.errors.is_empty());
    }

    #[tokio::test]
    async fn test_write_records_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut response = TransformResponse::default();
        let records = vec![
            ConversionRecord::encoded(b"first".to_vec(), Some(json!({"id": 0}))),
            ConversionRecord::empty(),
            ConversionRecord::encoded(b"second".to_vec(), None),
        ];

        write_records(records, dir.path(), &mut response).await.unwrap();

        assert_eq!(response.output_files.len(), 2);
        assert_eq!(std::fs::read(&response.output_files[0]).unwrap(), b"first");
        assert_eq!(std::fs::read(&response.output_files[1]).unwrap(), b"second");
        assert_eq!(response.metadata, vec![json!({"id": 0})]);
        assert_eq!(response.errors, vec!["Row 1: No BUFR data produced"]);
    }

    #[test]
    fn test_artifact_file_name_format() {
        let name = artifact_file_name();
        let (stem, ext) = name.split_once('.').unwrap();
        assert_eq!(ext, "bufr4");
        assert_eq!(stem.len(), 32);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(artifact_file_name(), name);
    }
}
