//! Serialization of generated records for download or piping

use std::{fmt, str};

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::engine::GeneratedRecord;
use crate::error::{UuidError, UuidResult};

/// Output formats for [`export_uuids`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    /// One UUID per line
    #[default]
    Txt,
}

impl ExportFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Txt => "txt",
        }
    }

    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
            Self::Txt => "text/plain",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl str::FromStr for ExportFormat {
    type Err = UuidError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        match src.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "txt" | "text" => Ok(Self::Txt),
            _ => Err(UuidError::UnsupportedExportFormat(src.to_owned())),
        }
    }
}

const CSV_HEADER: [&str; 7] = [
    "UUID",
    "Version",
    "Format",
    "Generated At",
    "Timestamp",
    "Node",
    "Clock Sequence",
];

/// Serializes `records` as text in `format`.
///
/// Without `include_metadata` CSV and TXT are both one UUID per line and JSON is an array of
/// strings. With it, CSV rows carry the version 1 timestamp as an RFC 3339 date. Output has no
/// trailing newline.
///
/// # Examples
///
/// ```rust
/// use uuidforge::{export_uuids, ExportFormat, GenerationConfig, UuidEngine, Version};
///
/// let mut engine = UuidEngine::new();
/// let batch = engine.generate_batch(&GenerationConfig::new(Version::V4).with_count(2))?;
/// let text = export_uuids(&batch.uuids, ExportFormat::Txt, false)?;
/// assert_eq!(text.lines().count(), 2);
/// # Ok::<(), uuidforge::UuidError>(())
/// ```
pub fn export_uuids(
    records: &[GeneratedRecord],
    format: ExportFormat,
    include_metadata: bool,
) -> UuidResult<String> {
    match format {
        ExportFormat::Csv if include_metadata => write_csv(records),
        ExportFormat::Csv | ExportFormat::Txt => Ok(records
            .iter()
            .map(|e| e.uuid.as_str())
            .collect::<Vec<_>>()
            .join("\n")),
        ExportFormat::Json if include_metadata => Ok(serde_json::to_string_pretty(records)?),
        ExportFormat::Json => {
            let uuids: Vec<&str> = records.iter().map(|e| e.uuid.as_str()).collect();
            Ok(serde_json::to_string_pretty(&uuids)?)
        }
    }
}

fn write_csv(records: &[GeneratedRecord]) -> UuidResult<String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)?;
    for record in records {
        wtr.write_record(csv_row(record))?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    let bytes = wtr
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    let mut text = String::from_utf8_lossy(&bytes).into_owned();
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

fn csv_row(record: &GeneratedRecord) -> [String; 7] {
    let generated_at = record
        .generated_at
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    let (timestamp, node, clock_sequence) = match &record.time_fields {
        Some(fs) => (
            fs.datetime()
                .map(|e| e.to_rfc3339_opts(SecondsFormat::Millis, true))
                .unwrap_or_default(),
            fs.node.to_string(),
            fs.clock_sequence.to_string(),
        ),
        None => Default::default(),
    };
    [
        record.uuid.clone(),
        record.version.to_string(),
        record.format.to_string(),
        generated_at,
        timestamp,
        node,
        clock_sequence,
    ]
}

#[cfg(test)]
mod tests {
    use super::{export_uuids, ExportFormat};
    use crate::clock::{NodeId, TimeFields};
    use crate::engine::GeneratedRecord;
    use crate::{UuidFormat, Version};
    use chrono::DateTime;

    fn records() -> Vec<GeneratedRecord> {
        let generated_at = DateTime::from_timestamp_millis(1_496_854_535_812).unwrap();
        vec![
            GeneratedRecord {
                uuid: "20614440-4ba2-11e7-9234-010203040506".into(),
                version: Version::V1,
                format: UuidFormat::Standard,
                time_fields: Some(TimeFields {
                    timestamp: 137_161_473_358_120_000,
                    clock_sequence: 0x1234,
                    node: NodeId([1, 2, 3, 4, 5, 6]),
                }),
                generated_at,
                degraded: false,
            },
            GeneratedRecord {
                uuid: "550E8400-E29B-41D4-A716-446655440000".into(),
                version: Version::V4,
                format: UuidFormat::Uppercase,
                time_fields: None,
                generated_at,
                degraded: false,
            },
        ]
    }

    /// Writes one UUID per line as text
    #[test]
    fn writes_one_uuid_per_line_as_text() {
        let text = export_uuids(&records(), ExportFormat::Txt, true).unwrap();
        assert_eq!(
            text,
            "20614440-4ba2-11e7-9234-010203040506\n550E8400-E29B-41D4-A716-446655440000"
        );
        assert_eq!(export_uuids(&[], ExportFormat::Txt, false).unwrap(), "");
    }

    /// Writes CSV with header and metadata
    #[test]
    fn writes_csv_with_header_and_metadata() {
        let text = export_uuids(&records(), ExportFormat::Csv, true).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "UUID,Version,Format,Generated At,Timestamp,Node,Clock Sequence");
        assert_eq!(
            lines[1],
            "20614440-4ba2-11e7-9234-010203040506,v1,standard,2017-06-07T16:55:35.812Z,\
             2017-06-07T16:55:35.812Z,01:02:03:04:05:06,4660"
        );
        assert_eq!(
            lines[2],
            "550E8400-E29B-41D4-A716-446655440000,v4,uppercase,2017-06-07T16:55:35.812Z,,,"
        );

        let bare = export_uuids(&records(), ExportFormat::Csv, false).unwrap();
        assert_eq!(bare, export_uuids(&records(), ExportFormat::Txt, false).unwrap());
        assert_eq!(bare.lines().count(), 2);
    }

    /// Quotes CSV fields containing delimiters
    #[test]
    fn quotes_csv_fields_containing_delimiters() {
        let mut rs = records();
        rs[1].uuid = "a,b\"c".into();
        let text = export_uuids(&rs, ExportFormat::Csv, true).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "\"a,b\"\"c\",v4,uppercase,2017-06-07T16:55:35.812Z,,,");

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());
        for row in rdr.records() {
            assert_eq!(row.unwrap().len(), 7);
        }
    }

    /// Writes JSON as strings or records
    #[test]
    fn writes_json_as_strings_or_records() {
        let bare = export_uuids(&records(), ExportFormat::Json, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&bare).unwrap();
        assert_eq!(value[1], "550E8400-E29B-41D4-A716-446655440000");

        let full = export_uuids(&records(), ExportFormat::Json, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&full).unwrap();
        assert_eq!(value[0]["version"], "v1");
        assert_eq!(value[0]["clockSequence"], 4660);
        assert_eq!(value[0]["node"], "01:02:03:04:05:06");
        assert_eq!(value[1]["format"], "uppercase");
        assert!(value[1].get("timestamp").is_none());
    }

    /// Parses export format names
    #[test]
    fn parses_export_format_names() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("text".parse::<ExportFormat>().unwrap(), ExportFormat::Txt);
        assert_eq!(ExportFormat::Json.mime_type(), "application/json");
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
