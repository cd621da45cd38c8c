//! Per-row conversion results.

use serde_json::Value;

/// Result of converting a single CSV row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionRecord {
    /// Encoded BUFR edition 4 message. `None` means the row produced nothing.
    pub bufr4: Option<Vec<u8>>,
    /// Metadata document (GeoJSON feature) emitted alongside the message,
    /// passed through untouched.
    pub meta: Option<Value>,
}

impl ConversionRecord {
    /// A record that produced a BUFR message.
    pub fn encoded(bufr4: impl Into<Vec<u8>>, meta: Option<Value>) -> Self {
        Self {
            bufr4: Some(bufr4.into()),
            meta,
        }
    }

    /// A record for a row the engine could not encode.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Metadata worth reporting: present and not an empty document.
    pub fn reportable_meta(&self) -> Option<&Value> {
        match &self.meta {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) if map.is_empty() => None,
            Some(Value::Array(items)) if items.is_empty() => None,
            Some(meta) => Some(meta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encoded_record_carries_payload() {
        let record = ConversionRecord::encoded(vec![0x42, 0x55, 0x46, 0x52], None);
        assert_eq!(record.bufr4.as_deref(), Some(&b"BUFR"[..]));
    }

    #[test]
    fn test_empty_record() {
        let record = ConversionRecord::empty();
        assert!(record.bufr4.is_none());
        assert!(record.reportable_meta().is_none());
    }

    #[test]
    fn test_reportable_meta_skips_empty_documents() {
        let null_meta = ConversionRecord::encoded(b"x".to_vec(), Some(Value::Null));
        let empty_object = ConversionRecord::encoded(b"x".to_vec(), Some(json!({})));
        let empty_array = ConversionRecord::encoded(b"x".to_vec(), Some(json!([])));

        assert!(null_meta.reportable_meta().is_none());
        assert!(empty_object.reportable_meta().is_none());
        assert!(empty_array.reportable_meta().is_none());
    }

    #[test]
    fn test_reportable_meta_passes_document_through() {
        let meta = json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [32.58, 0.32]},
            "properties": {"wigos_station_identifier": "0-20000-0-63705"}
        });
        let record = ConversionRecord::encoded(b"x".to_vec(), Some(meta.clone()));
        assert_eq!(record.reportable_meta(), Some(&meta));
    }
}
