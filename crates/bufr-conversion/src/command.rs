//! Subprocess-backed conversion engine.
//!
//! The external csv2bufr library is reached through a small bridge script.
//! The exchange is one JSON document each way:
//!
//! - stdin:  `{"csv": "<csv text>", "mappings": { ... }}`
//! - stdout: `[{"bufr4": "<base64>" | null, "_meta": { ... } | null}, ...]`
//!
//! A non-zero exit status means the library rejected the whole input. The
//! bridge then prints `{"error": "<message>"}` on stdout instead of the
//! record array; stderr is diagnostics only and is logged, never parsed.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error};

use crate::engine::ConversionEngine;
use crate::error::{ConversionError, Result};
use crate::record::ConversionRecord;

/// Default interpreter for the bridge script.
pub const DEFAULT_ENGINE_PROGRAM: &str = "python3";

/// Default bridge script location inside the service container.
pub const DEFAULT_BRIDGE_SCRIPT: &str = "/app/scripts/csv2bufr_bridge.py";

/// How to launch the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEngineConfig {
    /// Program to execute
    pub program: String,
    /// Arguments passed before anything else (normally the script path)
    pub args: Vec<String>,
}

impl CommandEngineConfig {
    /// Run `script` with `program` as interpreter.
    pub fn bridge(program: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: vec![script.into().to_string_lossy().into_owned()],
        }
    }
}

impl Default for CommandEngineConfig {
    fn default() -> Self {
        Self::bridge(DEFAULT_ENGINE_PROGRAM, DEFAULT_BRIDGE_SCRIPT)
    }
}

#[derive(Serialize)]
struct BridgeRequest<'a> {
    csv: &'a str,
    mappings: &'a Value,
}

#[derive(Deserialize)]
struct BridgeRecord {
    #[serde(default)]
    bufr4: Option<String>,
    #[serde(default, rename = "_meta")]
    meta: Option<Value>,
}

#[derive(Deserialize)]
struct BridgeFailure {
    error: String,
}

/// Conversion engine that runs the bridge as a child process per request.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    config: CommandEngineConfig,
}

impl CommandEngine {
    pub fn new(config: CommandEngineConfig) -> Self {
        Self { config }
    }

    async fn run_bridge(&self, input: Vec<u8>) -> Result<Vec<u8>> {
        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ConversionError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;

        // Feed stdin on its own task so a chatty engine can't fill the
        // stdout pipe while we are still writing.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ConversionError::MalformedOutput("engine stdin unavailable".into()))?;
        let writer = tokio::spawn(async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        });

        let output = child.wait_with_output().await?;
        let write_result = writer
            .await
            .map_err(|e| ConversionError::Io(std::io::Error::other(e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(
                program = %self.config.program,
                status = %output.status,
                stderr = %stderr,
                "Conversion engine failed"
            );
            let message = failure_message(&output.stdout)
                .unwrap_or_else(|| format!("conversion engine exited with {}", output.status));
            return Err(ConversionError::Engine(message));
        }

        write_result?;

        debug!(
            program = %self.config.program,
            output_size = output.stdout.len(),
            "Conversion engine succeeded"
        );

        Ok(output.stdout)
    }
}

#[async_trait]
impl ConversionEngine for CommandEngine {
    async fn convert(&self, csv: &str, mappings: &Value) -> Result<Vec<ConversionRecord>> {
        let input = serde_json::to_vec(&BridgeRequest { csv, mappings })
            .map_err(|e| ConversionError::MalformedOutput(format!("cannot encode request: {}", e)))?;

        let stdout = self.run_bridge(input).await?;
        decode_records(&stdout)
    }

    fn name(&self) -> &str {
        "command"
    }
}

/// Decode the bridge's stdout into records, preserving order.
pub fn decode_records(stdout: &[u8]) -> Result<Vec<ConversionRecord>> {
    let records: Vec<BridgeRecord> = serde_json::from_slice(stdout)
        .map_err(|e| ConversionError::MalformedOutput(e.to_string()))?;

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let bufr4 = match record.bufr4 {
                Some(encoded) => Some(STANDARD.decode(encoded.as_bytes()).map_err(|e| {
                    ConversionError::InvalidPayload {
                        index,
                        message: e.to_string(),
                    }
                })?),
                None => None,
            };
            Ok(ConversionRecord {
                bufr4,
                meta: record.meta,
            })
        })
        .collect()
}

/// The engine's own message from a failed run, kept whole.
fn failure_message(stdout: &[u8]) -> Option<String> {
    serde_json::from_slice::<BridgeFailure>(stdout)
        .ok()
        .map(|failure| failure.error)
}
