//! Per-run stage series written next to each run.

use sp_catalog::RunDescriptor;
use std::path::{Path, PathBuf};

use crate::ResultsResult;
use crate::table_io::write_rows;

/// Output locations for one run's series files, under `<run>/anal/`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSeriesPaths {
    pub stages: PathBuf,
    pub trajectory: PathBuf,
}

impl RunSeriesPaths {
    pub fn for_run(run: &RunDescriptor) -> Self {
        let dir = run.path().join("anal");
        let stem = run.file_stem();
        Self {
            stages: dir.join(format!("{stem}_sum.csv")),
            trajectory: dir.join(format!("{stem}_temptime.csv")),
        }
    }
}

/// Every accepted stage of a run, one row per stage, header order.
pub fn write_stage_series(path: &Path, header: &[String], rows: &[Vec<f64>]) -> ResultsResult<()> {
    write_rows(
        path,
        header,
        rows.iter().map(|r| r.iter().map(f64::to_string).collect::<Vec<_>>()),
    )
}

/// Resampled `(time, temp)` trajectory.
pub fn write_trajectory(path: &Path, samples: &[(f64, f64)]) -> ResultsResult<()> {
    let header = ["time".to_string(), "temp".to_string()];
    write_rows(
        path,
        &header,
        samples.iter().map(|(t, temp)| [t.to_string(), temp.to_string()]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_core::ParamSet;

    #[test]
    fn paths_use_run_stem() {
        let params = ParamSet::from_pairs([("H", 0.2)]).unwrap();
        let run = RunDescriptor::new("J7", "sq16", "/data/r1", params).unwrap();
        let paths = RunSeriesPaths::for_run(&run);
        assert_eq!(paths.stages, Path::new("/data/r1/anal/J7sq16_sum.csv"));
        assert_eq!(
            paths.trajectory,
            Path::new("/data/r1/anal/J7sq16_temptime.csv")
        );
    }
}
