//! In-memory conversion engine for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bufr_conversion::{ConversionEngine, ConversionError, ConversionRecord};
use serde_json::Value;

/// Returns a predetermined outcome for every call and remembers its input.
///
/// ```ignore
/// use test_utils::ScriptedEngine;
///
/// let engine = ScriptedEngine::returning(vec![ConversionRecord::empty()]);
/// let engine = ScriptedEngine::failing("KeyError: 'header'");
/// ```
pub struct ScriptedEngine {
    outcome: Result<Vec<ConversionRecord>, String>,
    calls: AtomicUsize,
    last_input: Mutex<Option<(String, Value)>>,
}

impl ScriptedEngine {
    /// Engine that returns `records` on every call.
    pub fn returning(records: Vec<ConversionRecord>) -> Self {
        Self::with_outcome(Ok(records))
    }

    /// Engine that rejects every input with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_outcome(Err(message.into()))
    }

    fn with_outcome(outcome: Result<Vec<ConversionRecord>, String>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }

    /// Number of times `convert` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// CSV text and mappings from the most recent call.
    pub fn last_input(&self) -> Option<(String, Value)> {
        self.last_input
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ConversionEngine for ScriptedEngine {
    async fn convert(
        &self,
        csv: &str,
        mappings: &Value,
    ) -> bufr_conversion::Result<Vec<ConversionRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .last_input
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) =
            Some((csv.to_string(), mappings.clone()));

        match &self.outcome {
            Ok(records) => Ok(records.clone()),
            Err(message) => Err(ConversionError::Engine(message.clone())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
