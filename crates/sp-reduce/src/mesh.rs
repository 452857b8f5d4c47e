//! Two-parameter pivot of a summary table, the input of phase diagrams.

use sp_core::{Tolerances, mean, nearly_equal};
use sp_results::{Column, SummaryRow, SummaryTable};

use crate::{ReduceError, ReduceResult};

/// Parameter equality used for filters and axis de-duplication.
const AXIS_TOL: Tolerances = Tolerances {
    abs: 1e-9,
    rel: 0.0,
};

/// Keep only rows whose parameter `name` equals `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshFilter {
    pub name: String,
    pub value: f64,
}

/// Grid of `value` over sorted unique `x` and `y` parameter values.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMesh {
    pub x_name: String,
    pub y_name: String,
    pub value_name: String,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    /// Row-major by x: `cells[ix * ys.len() + iy]`.
    cells: Vec<Option<f64>>,
}

fn param_index(table: &SummaryTable, name: &str) -> ReduceResult<usize> {
    match table.column(name) {
        Some(Column::Param(i)) => Ok(i),
        Some(Column::Property(_)) => Err(ReduceError::NotAParameter {
            name: name.to_string(),
        }),
        None => Err(ReduceError::UnknownColumn {
            name: name.to_string(),
        }),
    }
}

fn unique_sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values.dedup_by(|a, b| nearly_equal(*a, *b, AXIS_TOL));
    values
}

fn position(axis: &[f64], v: f64) -> Option<usize> {
    axis.iter().position(|a| nearly_equal(*a, v, AXIS_TOL))
}

impl ParameterMesh {
    pub fn build(
        table: &SummaryTable,
        x: &str,
        y: &str,
        value: &str,
        filters: &[MeshFilter],
    ) -> ReduceResult<Self> {
        let ix = param_index(table, x)?;
        let iy = param_index(table, y)?;
        if table.column(value).is_none() {
            return Err(ReduceError::UnknownColumn {
                name: value.to_string(),
            });
        }
        let filters = filters
            .iter()
            .map(|f| param_index(table, &f.name).map(|i| (i, f.value)))
            .collect::<ReduceResult<Vec<_>>>()?;

        let rows: Vec<&SummaryRow> = table
            .rows
            .iter()
            .filter(|row| {
                filters
                    .iter()
                    .all(|&(i, v)| nearly_equal(row.params[i], v, AXIS_TOL))
            })
            .collect();

        let xs = unique_sorted(rows.iter().map(|r| r.params[ix]).collect());
        let ys = unique_sorted(rows.iter().map(|r| r.params[iy]).collect());

        let mut samples: Vec<Vec<f64>> = vec![Vec::new(); xs.len() * ys.len()];
        for row in &rows {
            let (Some(cx), Some(cy)) = (
                position(&xs, row.params[ix]),
                position(&ys, row.params[iy]),
            ) else {
                continue;
            };
            if let Some(v) = table.value(row, value) {
                samples[cx * ys.len() + cy].push(v);
            }
        }

        Ok(Self {
            x_name: x.to_string(),
            y_name: y.to_string(),
            value_name: value.to_string(),
            xs,
            ys,
            cells: samples.iter().map(|s| mean(s)).collect(),
        })
    }

    pub fn get(&self, ix: usize, iy: usize) -> Option<f64> {
        if ix >= self.xs.len() || iy >= self.ys.len() {
            return None;
        }
        self.cells[ix * self.ys.len() + iy]
    }

    /// `(x, y, value)` triples, x-major.
    pub fn long_form(&self) -> Vec<(f64, f64, Option<f64>)> {
        let mut out = Vec::with_capacity(self.cells.len());
        for (ix, &x) in self.xs.iter().enumerate() {
            for (iy, &y) in self.ys.iter().enumerate() {
                out.push((x, y, self.get(ix, iy)));
            }
        }
        out
    }

    /// Number of cells holding a value.
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}
