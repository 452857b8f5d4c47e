//! Result file parsing.
//!
//! Result files are a header line followed by at most one line of
//! comma-separated values.

use sp_core::StageId;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::{FailureReason, FieldRecord};

/// Field whose value is replaced by the stage index in annealed runs.
pub const STAGE_ID_FIELD: &str = "id";

pub(crate) type ParseError = (FailureReason, String);

/// Header fields with all whitespace removed.
pub fn split_header(line: &str) -> Vec<String> {
    line.split(',')
        .map(|f| f.chars().filter(|c| !c.is_whitespace()).collect())
        .collect()
}

/// Parse one value, mapping any `NaN` marker to `0.0`. Infinities are
/// kept as written.
pub fn parse_value(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.contains("NaN") {
        return Some(0.0);
    }
    match text.parse::<f64>() {
        Ok(v) if v.is_nan() => Some(0.0),
        Ok(v) => Some(v),
        Err(_) => None,
    }
}

/// Parse a value line against `header`. With a `stage`, the `id` field
/// takes the stage index instead of the file's text.
pub fn parse_values(
    header: &[String],
    line: &str,
    stage: Option<StageId>,
) -> Result<FieldRecord, ParseError> {
    let values: Vec<&str> = line.trim_end_matches(['\r', '\n']).split(',').collect();
    if values.len() != header.len() {
        return Err((
            FailureReason::HeaderMismatch,
            format!(
                "header has {} fields, result line has {}",
                header.len(),
                values.len()
            ),
        ));
    }

    let mut record = FieldRecord::with_capacity(header.len());
    for (name, text) in header.iter().zip(values) {
        let value = match stage {
            Some(stage) if name == STAGE_ID_FIELD => f64::from(stage.index()),
            _ => parse_value(text).ok_or_else(|| {
                (
                    FailureReason::MalformedValue,
                    format!("field '{}' has value '{}'", name, text.trim()),
                )
            })?,
        };
        record.push(name, value);
    }
    Ok(record)
}

pub(crate) fn read_result_file(path: &Path) -> Result<String, ParseError> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::InvalidData => (FailureReason::MalformedValue, e.to_string()),
        _ => (FailureReason::MissingFile, e.to_string()),
    })
}

/// Header line of a result file's content.
pub(crate) fn header_of(content: &str) -> Result<Vec<String>, ParseError> {
    match content.lines().next() {
        Some(line) if !line.trim().is_empty() => Ok(split_header(line)),
        _ => Err((FailureReason::ShortFile, "file has no header line".to_string())),
    }
}

/// The line after the header, if it carries anything.
pub(crate) fn result_line_of(content: &str) -> Result<&str, ParseError> {
    match content.lines().nth(1) {
        Some(line) if !line.trim().is_empty() => Ok(line),
        _ => Err((FailureReason::ShortFile, "file has no result line".to_string())),
    }
}
