//! Result data types.

use serde::{Deserialize, Serialize};

use crate::{ResultsError, ResultsResult};

/// One summary row: parameter values then property means, both in the
/// owning table's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub params: Vec<f64>,
    /// `None` when no successful member of the group carried the property.
    pub values: Vec<Option<f64>>,
}

/// Column lookup result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Param(usize),
    Property(usize),
}

/// Averaged results keyed by identifying parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryTable {
    pub param_columns: Vec<String>,
    pub property_columns: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn new(param_columns: Vec<String>, property_columns: Vec<String>) -> Self {
        Self {
            param_columns,
            property_columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: SummaryRow) -> ResultsResult<()> {
        if row.params.len() != self.param_columns.len()
            || row.values.len() != self.property_columns.len()
        {
            return Err(ResultsError::Shape {
                what: format!(
                    "row has {}+{} cells, table has {}+{} columns",
                    row.params.len(),
                    row.values.len(),
                    self.param_columns.len(),
                    self.property_columns.len()
                ),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All column names, parameters first.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.param_columns
            .iter()
            .chain(&self.property_columns)
            .map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Option<Column> {
        if let Some(i) = self.param_columns.iter().position(|c| c == name) {
            return Some(Column::Param(i));
        }
        self.property_columns
            .iter()
            .position(|c| c == name)
            .map(Column::Property)
    }

    /// Cell value by column name.
    pub fn value(&self, row: &SummaryRow, name: &str) -> Option<f64> {
        match self.column(name)? {
            Column::Param(i) => row.params.get(i).copied(),
            Column::Property(i) => row.values.get(i).copied().flatten(),
        }
    }
}

/// One row of the failure report.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureRecord {
    pub params: Vec<f64>,
    pub job_id: String,
    pub sim_id: String,
    pub reason: String,
    pub path: String,
    pub detail: String,
}

/// One row of the per-run success table.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub job_id: String,
    pub sim_id: String,
    pub params: Vec<f64>,
    pub values: Vec<Option<f64>>,
}

/// Written next to the summary; lets `update` skip unchanged inputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryManifest {
    pub fingerprint: String,
    pub name: String,
    pub timestamp: String,
    pub tool_version: String,
    pub run_count: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub empty_group_count: usize,
    pub row_count: usize,
    pub param_columns: Vec<String>,
    pub property_columns: Vec<String>,
}
