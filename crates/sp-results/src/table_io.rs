//! CSV reading and writing for summary, failure and run tables.

use sp_core::{format_fixed, format_param};
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{FailureRecord, RunRecord, SummaryRow, SummaryTable};
use crate::{ResultsError, ResultsResult};

/// Sibling path the table is staged in before being renamed over `path`.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// Write `header` and `rows` to `path`. Parent directories are created;
/// the file only appears once complete.
pub fn write_rows<I, R>(path: &Path, header: &[String], rows: I) -> ResultsResult<()>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let staging = staging_path(path);
    {
        let mut writer = csv::Writer::from_path(&staging)?;
        writer.write_record(header)?;
        for row in rows {
            writer.write_record(row.into_iter().collect::<Vec<_>>())?;
        }
        writer.flush()?;
    }
    fs::rename(&staging, path)?;
    Ok(())
}

fn fixed_cell(value: Option<f64>, precision: usize) -> String {
    value.map(|v| format_fixed(v, precision)).unwrap_or_default()
}

pub fn write_summary(table: &SummaryTable, path: &Path, precision: usize) -> ResultsResult<()> {
    let header: Vec<String> = table.columns().map(str::to_string).collect();
    let rows = table.rows.iter().map(|row| {
        row.params
            .iter()
            .map(|&p| format_param(p))
            .chain(row.values.iter().map(|&v| fixed_cell(v, precision)))
            .collect::<Vec<_>>()
    });
    write_rows(path, &header, rows)?;
    tracing::debug!(path = %path.display(), rows = table.len(), "wrote summary table");
    Ok(())
}

pub fn write_failures(
    path: &Path,
    param_columns: &[String],
    records: &[FailureRecord],
) -> ResultsResult<()> {
    let header: Vec<String> = param_columns
        .iter()
        .cloned()
        .chain(["job_id", "sim_id", "reason", "path", "detail"].map(String::from))
        .collect();
    let rows = records.iter().map(|r| {
        r.params
            .iter()
            .map(|&p| format_param(p))
            .chain([
                r.job_id.clone(),
                r.sim_id.clone(),
                r.reason.clone(),
                r.path.clone(),
                r.detail.clone(),
            ])
            .collect::<Vec<_>>()
    });
    write_rows(path, &header, rows)
}

pub fn write_runs(
    path: &Path,
    param_columns: &[String],
    property_columns: &[String],
    records: &[RunRecord],
    precision: usize,
) -> ResultsResult<()> {
    let header: Vec<String> = ["job_id", "sim_id"]
        .map(String::from)
        .into_iter()
        .chain(param_columns.iter().cloned())
        .chain(property_columns.iter().cloned())
        .collect();
    let rows = records.iter().map(|r| {
        [r.job_id.clone(), r.sim_id.clone()]
            .into_iter()
            .chain(r.params.iter().map(|&p| format_param(p)))
            .chain(r.values.iter().map(|&v| fixed_cell(v, precision)))
            .collect::<Vec<_>>()
    });
    write_rows(path, &header, rows)
}

/// Read a summary table back. `param_columns` names the identifying
/// columns; every other column is a numeric property. Column order of
/// the file is kept.
pub fn read_summary(path: &Path, param_columns: &[String]) -> ResultsResult<SummaryTable> {
    if !path.exists() {
        return Err(ResultsError::MissingSummaryFile {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers = reader.headers()?.clone();

    for column in param_columns {
        if !headers.iter().any(|h| h == column) {
            return Err(ResultsError::MissingColumn {
                path: path.to_path_buf(),
                column: column.clone(),
            });
        }
    }

    let is_param = |h: &str| param_columns.iter().any(|p| p == h);
    let mut table = SummaryTable::new(
        headers.iter().filter(|h| is_param(*h)).map(String::from).collect(),
        headers.iter().filter(|h| !is_param(*h)).map(String::from).collect(),
    );

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let mut params = Vec::with_capacity(table.param_columns.len());
        let mut values = Vec::with_capacity(table.property_columns.len());
        for (column, text) in headers.iter().zip(record.iter()) {
            let bad = || ResultsError::Parse {
                path: path.to_path_buf(),
                row: row + 1,
                column: column.to_string(),
                value: text.to_string(),
            };
            if is_param(column) {
                params.push(text.parse::<f64>().map_err(|_| bad())?);
            } else if text.is_empty() {
                values.push(None);
            } else {
                values.push(Some(text.parse::<f64>().map_err(|_| bad())?));
            }
        }
        table.push_row(SummaryRow { params, values })?;
    }

    tracing::debug!(path = %path.display(), rows = table.len(), "read summary table");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_is_a_hidden_sibling() {
        let p = Path::new("/tmp/x/status.csv");
        assert_eq!(staging_path(p), Path::new("/tmp/x/.status.csv.tmp"));
    }

    #[test]
    fn empty_cell_for_missing_value() {
        assert_eq!(fixed_cell(None, 3), "");
        assert_eq!(fixed_cell(Some(0.5), 3), "0.500");
    }
}
