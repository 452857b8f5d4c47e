//! Derived analyses over a loaded summary.

use sp_core::{format_fixed, format_param};
use sp_reduce::ParameterMesh;
use sp_results::SummaryTable;
use std::path::Path;

use crate::error::AppResult;
use crate::query;

/// Tabular output of an analysis: named columns of optional numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutput {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Option<f64>>>,
}

impl AnalysisOutput {
    /// Rendered cells: the leading `key_columns` in natural form, the
    /// rest with fixed `precision`, missing values empty.
    pub fn render_rows(&self, key_columns: usize, precision: usize) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(i, cell)| match cell {
                        Some(v) if i < key_columns => format_param(*v),
                        Some(v) => format_fixed(*v, precision),
                        None => String::new(),
                    })
                    .collect()
            })
            .collect()
    }
}

/// An analysis that turns a summary table into another table.
pub trait SummaryAnalysis {
    fn name(&self) -> &str;

    /// Leading columns of the output that are keys rather than values.
    fn key_columns(&self) -> usize {
        0
    }

    fn analyze(&self, table: &SummaryTable) -> AppResult<AnalysisOutput>;
}

/// Long-form `x,y,value` pivot over two parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshAnalysis {
    pub x: String,
    pub y: String,
    pub value: String,
    pub filters: Vec<(String, f64)>,
}

impl MeshAnalysis {
    pub fn mesh(&self, table: &SummaryTable) -> AppResult<ParameterMesh> {
        query::build_mesh(table, &self.x, &self.y, &self.value, &self.filters)
    }
}

impl SummaryAnalysis for MeshAnalysis {
    fn name(&self) -> &str {
        "mesh"
    }

    fn key_columns(&self) -> usize {
        2
    }

    fn analyze(&self, table: &SummaryTable) -> AppResult<AnalysisOutput> {
        let mesh = self.mesh(table)?;
        Ok(AnalysisOutput {
            header: vec![mesh.x_name.clone(), mesh.y_name.clone(), mesh.value_name.clone()],
            rows: mesh
                .long_form()
                .into_iter()
                .map(|(x, y, v)| vec![Some(x), Some(y), v])
                .collect(),
        })
    }
}

/// Run `analysis` on `table`; write the result to `out` when given.
pub fn run_analysis(
    analysis: &dyn SummaryAnalysis,
    table: &SummaryTable,
    out: Option<&Path>,
    precision: usize,
) -> AppResult<AnalysisOutput> {
    let output = analysis.analyze(table)?;
    tracing::info!(
        analysis = analysis.name(),
        rows = output.rows.len(),
        "analysis finished"
    );
    if let Some(path) = out {
        sp_results::write_rows(
            path,
            &output.header,
            output.render_rows(analysis.key_columns(), precision),
        )?;
    }
    Ok(output)
}
