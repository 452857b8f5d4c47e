//! Catalog loaded from an explicit parameter table.

use sp_core::ParamSet;
use std::path::{Path, PathBuf};

use crate::source::CatalogSource;
use crate::{CatalogError, CatalogResult, RunDescriptor};

/// CSV with one row per run: job id, sim id, run path and one column
/// per physical parameter. Relative run paths resolve against the
/// table's directory.
#[derive(Debug, Clone)]
pub struct TableSource {
    pub path: PathBuf,
    pub job_column: String,
    pub sim_column: String,
    pub path_column: String,
    pub params: Vec<String>,
}

impl TableSource {
    fn column_index(&self, headers: &csv::StringRecord, column: &str) -> CatalogResult<usize> {
        headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| CatalogError::MissingColumn {
                path: self.path.clone(),
                column: column.to_string(),
            })
    }

    fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

impl CatalogSource for TableSource {
    fn load(&self) -> CatalogResult<Vec<RunDescriptor>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|source| CatalogError::Open {
                path: self.path.clone(),
                source,
            })?;

        let headers = reader
            .headers()
            .map_err(|source| CatalogError::Read {
                path: self.path.clone(),
                source,
            })?
            .clone();

        let job_idx = self.column_index(&headers, &self.job_column)?;
        let sim_idx = self.column_index(&headers, &self.sim_column)?;
        let path_idx = self.column_index(&headers, &self.path_column)?;
        let param_idx = self
            .params
            .iter()
            .map(|p| self.column_index(&headers, p).map(|i| (p.as_str(), i)))
            .collect::<CatalogResult<Vec<_>>>()?;

        let mut runs = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|source| CatalogError::Read {
                path: self.path.clone(),
                source,
            })?;
            let cell = |i: usize| record.get(i).unwrap_or("");

            let mut params = ParamSet::new();
            for &(name, idx) in &param_idx {
                let text = cell(idx);
                let value: f64 = text.parse().map_err(|_| CatalogError::BadValue {
                    path: self.path.clone(),
                    row: row + 1,
                    column: name.to_string(),
                    value: text.to_string(),
                })?;
                params.push(name, value)?;
            }

            let run_path = self.base_dir().join(cell(path_idx));
            runs.push(RunDescriptor::new(
                cell(job_idx),
                cell(sim_idx),
                run_path,
                params,
            )?);
        }

        tracing::debug!(
            table = %self.path.display(),
            runs = runs.len(),
            "loaded parameter table"
        );
        Ok(runs)
    }
}
