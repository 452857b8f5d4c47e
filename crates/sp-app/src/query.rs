//! Query helpers for extracting data from loaded summaries.

use sp_core::{Tolerances, nearly_equal};
use sp_reduce::{MeshFilter, ParameterMesh};
use sp_results::{Column, SummaryRow, SummaryTable};

use crate::error::{AppError, AppResult};

const PARAM_TOL: Tolerances = Tolerances {
    abs: 1e-9,
    rel: 0.0,
};

/// Row filter: parameter equalities and property upper bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSelection {
    pub equals: Vec<(String, f64)>,
    /// Rows pass when the property is present and `<=` the bound.
    pub at_most: Vec<(String, f64)>,
}

impl RowSelection {
    pub fn where_eq(mut self, name: impl Into<String>, value: f64) -> Self {
        self.equals.push((name.into(), value));
        self
    }

    pub fn where_at_most(mut self, name: impl Into<String>, bound: f64) -> Self {
        self.at_most.push((name.into(), bound));
        self
    }
}

fn require_column(table: &SummaryTable, name: &str) -> AppResult<Column> {
    table
        .column(name)
        .ok_or_else(|| AppError::Query(format!("Unknown column: {}", name)))
}

/// Rows of `table` matching `selection`, in table order.
pub fn select_rows<'a>(
    table: &'a SummaryTable,
    selection: &RowSelection,
) -> AppResult<Vec<&'a SummaryRow>> {
    let mut equals = Vec::with_capacity(selection.equals.len());
    for (name, value) in &selection.equals {
        match require_column(table, name)? {
            Column::Param(i) => equals.push((i, *value)),
            Column::Property(_) => {
                return Err(AppError::Query(format!(
                    "Equality filters apply to parameters, '{}' is a property",
                    name
                )));
            }
        }
    }
    for (name, _) in &selection.at_most {
        require_column(table, name)?;
    }

    Ok(table
        .rows
        .iter()
        .filter(|row| {
            equals
                .iter()
                .all(|&(i, v)| nearly_equal(row.params[i], v, PARAM_TOL))
        })
        .filter(|row| {
            selection
                .at_most
                .iter()
                .all(|(name, bound)| table.value(row, name).is_some_and(|v| v <= *bound))
        })
        .collect())
}

/// `(x, y)` pairs over `rows`, sorted by x. Rows missing either value
/// are left out.
pub fn column_series(
    table: &SummaryTable,
    rows: &[&SummaryRow],
    x: &str,
    y: &str,
) -> AppResult<Vec<(f64, f64)>> {
    require_column(table, x)?;
    require_column(table, y)?;

    let mut series: Vec<(f64, f64)> = rows
        .iter()
        .filter_map(|row| Some((table.value(row, x)?, table.value(row, y)?)))
        .collect();
    series.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(series)
}

/// Pivot `table` into a mesh over two parameters.
pub fn build_mesh(
    table: &SummaryTable,
    x: &str,
    y: &str,
    value: &str,
    filters: &[(String, f64)],
) -> AppResult<ParameterMesh> {
    let filters: Vec<MeshFilter> = filters
        .iter()
        .map(|(name, value)| MeshFilter {
            name: name.clone(),
            value: *value,
        })
        .collect();
    Ok(ParameterMesh::build(table, x, y, value, &filters)?)
}

/// Measured magnetization next to the independent-dipole expectation.
///
/// Returns `(ratio, measured, expected)` sorted by ratio, where `ratio`
/// is the column holding the magnetic to thermal energy ratio.
pub fn magnetization_vs_expectation(
    table: &SummaryTable,
    rows: &[&SummaryRow],
    ratio: &str,
    magnetization: &str,
) -> AppResult<Vec<(f64, f64, f64)>> {
    let series = column_series(table, rows, ratio, magnetization)?;
    let ratios: Vec<f64> = series.iter().map(|(x, _)| *x).collect();
    let expected = sp_reduce::magnetization_expectation(&ratios)?;
    Ok(series
        .into_iter()
        .zip(expected)
        .map(|((x, m), e)| (x, m, e))
        .collect())
}

/// Per-column overview of a summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub name: String,
    pub is_param: bool,
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

pub fn describe_columns(table: &SummaryTable) -> Vec<ColumnStats> {
    table
        .columns()
        .map(|name| {
            let values: Vec<f64> = table
                .rows
                .iter()
                .filter_map(|row| table.value(row, name))
                .collect();
            ColumnStats {
                name: name.to_string(),
                is_param: matches!(table.column(name), Some(Column::Param(_))),
                count: values.len(),
                min: values.iter().copied().reduce(f64::min),
                max: values.iter().copied().reduce(f64::max),
                mean: sp_core::mean(&values),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SummaryTable {
        let mut t = SummaryTable::new(
            vec!["H".into(), "ETA".into()],
            vec!["temp".into(), "mag".into()],
        );
        for (h, eta, temp, mag) in [
            (0.3, 0.05, Some(0.04), Some(0.9)),
            (0.1, 0.05, Some(0.04), Some(0.2)),
            (0.2, 0.05, Some(0.5), Some(0.5)),
            (0.2, 0.10, Some(0.01), None),
        ] {
            t.push_row(SummaryRow {
                params: vec![h, eta],
                values: vec![temp, mag],
            })
            .unwrap();
        }
        t
    }

    #[test]
    fn select_by_param_and_bound() {
        let t = table();
        let sel = RowSelection::default()
            .where_eq("ETA", 0.05 + 1e-12)
            .where_at_most("temp", 0.05);
        let rows = select_rows(&t, &sel).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].params[0], 0.3);

        let series = column_series(&t, &rows, "H", "mag").unwrap();
        assert_eq!(series, [(0.1, 0.2), (0.3, 0.9)]);
    }

    #[test]
    fn series_skips_missing_values() {
        let t = table();
        let rows: Vec<&SummaryRow> = t.rows.iter().collect();
        let series = column_series(&t, &rows, "ETA", "mag").unwrap();
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn unknown_and_misused_columns() {
        let t = table();
        let sel = RowSelection::default().where_eq("mag", 1.0);
        assert!(matches!(select_rows(&t, &sel), Err(AppError::Query(_))));
        let sel = RowSelection::default().where_at_most("nope", 1.0);
        assert!(select_rows(&t, &sel).is_err());
        assert!(column_series(&t, &[], "H", "nope").is_err());
    }

    #[test]
    fn expectation_alongside_measurement() {
        let t = table();
        let rows = select_rows(&t, &RowSelection::default().where_eq("ETA", 0.05)).unwrap();
        let out = magnetization_vs_expectation(&t, &rows, "H", "mag").unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].0, 0.1);
        assert!(out.windows(2).all(|w| w[0].2 < w[1].2));
    }

    #[test]
    fn stats_cover_every_column() {
        let stats = describe_columns(&table());
        assert_eq!(stats.len(), 4);
        let mag = &stats[3];
        assert!(!mag.is_param);
        assert_eq!(mag.count, 3);
        assert_eq!(mag.min, Some(0.2));
        assert_eq!(mag.max, Some(0.9));
        assert!(stats[0].is_param);
    }
}
