//! Common test fixtures for csv2bufr tests.
//!
//! This module provides pre-defined test data that represents the
//! requests the export pipeline sends to the conversion service.

/// Intermediate DAYCLI CSV documents, as produced by the export pipeline.
pub mod csv {
    /// Header row of the intermediate DAYCLI file (station identification,
    /// siting, date, then one column group per element).
    pub const DAYCLI_HEADER: &str = "wsi_series,wsi_issuer,wsi_issue_number,wsi_local,\
wmo_block_number,wmo_station_number,latitude,longitude,\
temperature_siting_classification,precipitation_siting_classification,\
averaging_method,thermometer_height,year,month,day,\
maximum_temperature_day_offset,maximum_temperature_hour,maximum_temperature_minute,\
maximum_temperature_second,maximum_temperature,maximum_temperature_flag";

    /// Three station-days for one station.
    pub const DAYCLI_THREE_DAYS: &str = "wsi_series,wsi_issuer,wsi_issue_number,wsi_local,\
wmo_block_number,wmo_station_number,latitude,longitude,\
temperature_siting_classification,precipitation_siting_classification,\
averaging_method,thermometer_height,year,month,day,\
maximum_temperature_day_offset,maximum_temperature_hour,maximum_temperature_minute,\
maximum_temperature_second,maximum_temperature,maximum_temperature_flag
0,20000,0,63705,637,5,0.3167,32.5833,255,255,2,2,2024,1,15,0,18,0,0,302.15,
0,20000,0,63705,637,5,0.3167,32.5833,255,255,2,2,2024,1,16,0,18,0,0,301.65,
0,20000,0,63705,637,5,0.3167,32.5833,255,255,2,2,2024,1,17,0,18,0,0,,
";

    /// Header only, no observations.
    pub fn header_only() -> String {
        format!("{}\n", DAYCLI_HEADER)
    }
}

/// Mapping templates handed to the conversion engine.
pub mod mappings {
    use serde_json::{json, Value};

    /// A trimmed DAYCLI template: header metadata plus a few data mappings.
    pub fn daycli_template() -> Value {
        json!({
            "inputShortDelayedDescriptorReplicationFactor": [],
            "inputDelayedDescriptorReplicationFactor": [],
            "inputExtendedDelayedDescriptorReplicationFactor": [],
            "number_header_rows": 1,
            "column_names_row": 1,
            "wigos_station_identifier": "data:wsi_local",
            "header": [
                {"eccodes_key": "edition", "value": "const:4"},
                {"eccodes_key": "masterTableNumber", "value": "const:0"},
                {"eccodes_key": "dataCategory", "value": "const:0"},
                {"eccodes_key": "internationalDataSubCategory", "value": "const:6"},
                {"eccodes_key": "unexpandedDescriptors", "value": "array:307075"}
            ],
            "data": [
                {"eccodes_key": "#1#wigosIdentifierSeries", "value": "data:wsi_series"},
                {"eccodes_key": "#1#wigosIssuerOfIdentifier", "value": "data:wsi_issuer"},
                {"eccodes_key": "#1#wigosLocalIdentifierCharacter", "value": "data:wsi_local"},
                {"eccodes_key": "#1#year", "value": "data:year"},
                {"eccodes_key": "#1#month", "value": "data:month"},
                {"eccodes_key": "#1#day", "value": "data:day"},
                {"eccodes_key": "#1#latitude", "value": "data:latitude"},
                {"eccodes_key": "#1#longitude", "value": "data:longitude"},
                {"eccodes_key": "#1#maximumTemperatureAtHeightAndOverPeriodSpecified", "value": "data:maximum_temperature"}
            ]
        })
    }
}

/// Synthetic BUFR payloads.
pub mod bufr {
    /// A minimal byte sequence framed like a BUFR message
    /// (`BUFR` ... `7777`), tagged with `n` so payloads are distinguishable.
    pub fn message(n: u8) -> Vec<u8> {
        let mut bytes = b"BUFR".to_vec();
        bytes.extend_from_slice(&[0x00, 0x00, 0x2a, 0x04, n]);
        bytes.extend_from_slice(b"7777");
        bytes
    }
}

/// GeoJSON metadata documents as emitted per record.
pub mod meta {
    use serde_json::{json, Value};

    /// Point feature for a station on a given day.
    pub fn station_feature(wsi: &str, day: u32) -> Value {
        json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [32.5833, 0.3167]},
            "properties": {
                "md5": format!("{:032x}", day),
                "wigos_station_identifier": wsi,
                "datetime": format!("2024-01-{:02}T00:00:00Z", day),
                "originating_centre": null,
                "data_category": 0
            }
        })
    }
}

/// Request bodies for the transform endpoint.
pub mod requests {
    use serde_json::{json, Value};
    use std::path::Path;

    /// A complete `/transform` body.
    pub fn transform_body(input_file: &Path, mappings: Value, output_dir: &Path) -> Value {
        json!({
            "input_file": input_file.to_string_lossy(),
            "mappings": mappings,
            "output_dir": output_dir.to_string_lossy(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_days_has_header_and_rows() {
        let lines: Vec<_> = csv::DAYCLI_THREE_DAYS.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], csv::DAYCLI_HEADER);
    }

    #[test]
    fn test_rows_match_header_width() {
        let width = csv::DAYCLI_HEADER.split(',').count();
        for line in csv::DAYCLI_THREE_DAYS.lines().skip(1) {
            assert_eq!(line.split(',').count(), width, "row: {}", line);
        }
    }

    #[test]
    fn test_bufr_message_framing() {
        let msg = bufr::message(7);
        assert!(msg.starts_with(b"BUFR"));
        assert!(msg.ends_with(b"7777"));
        assert_ne!(bufr::message(1), bufr::message(2));
    }

    #[test]
    fn test_daycli_template_is_object() {
        let template = mappings::daycli_template();
        assert!(template.is_object());
        assert_eq!(template["number_header_rows"], 1);
    }
}
