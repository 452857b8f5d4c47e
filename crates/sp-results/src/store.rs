//! Summary storage API.

use sp_catalog::OutputDef;
use std::fs;
use std::path::{Path, PathBuf};

use crate::table_io;
use crate::types::{FailureRecord, RunRecord, SummaryManifest, SummaryTable};
use crate::{ResultsError, ResultsResult};

const MANIFEST_FILE: &str = "manifest.json";

/// Owns `<root>/<summary_dir>` and the files written into it.
#[derive(Debug, Clone)]
pub struct SummaryStore {
    dir: PathBuf,
    output: OutputDef,
}

impl SummaryStore {
    pub fn for_root(root: &Path, output: &OutputDef) -> Self {
        Self {
            dir: root.join(&output.summary_dir),
            output: output.clone(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn summary_path(&self) -> PathBuf {
        self.dir.join(&self.output.summary_file)
    }

    pub fn failures_path(&self) -> PathBuf {
        self.dir.join(&self.output.failure_file)
    }

    pub fn runs_path(&self) -> PathBuf {
        self.dir.join(&self.output.runs_file)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    /// A summary with its manifest exists.
    pub fn has_summary(&self) -> bool {
        self.summary_path().exists() && self.manifest_path().exists()
    }

    pub fn write_summary(&self, table: &SummaryTable) -> ResultsResult<()> {
        table_io::write_summary(table, &self.summary_path(), self.output.precision)
    }

    pub fn load_summary(&self, param_columns: &[String]) -> ResultsResult<SummaryTable> {
        table_io::read_summary(&self.summary_path(), param_columns)
    }

    pub fn write_failures(
        &self,
        param_columns: &[String],
        records: &[FailureRecord],
    ) -> ResultsResult<()> {
        table_io::write_failures(&self.failures_path(), param_columns, records)
    }

    pub fn write_runs(
        &self,
        param_columns: &[String],
        property_columns: &[String],
        records: &[RunRecord],
    ) -> ResultsResult<()> {
        table_io::write_runs(
            &self.runs_path(),
            param_columns,
            property_columns,
            records,
            self.output.precision,
        )
    }

    pub fn save_manifest(&self, manifest: &SummaryManifest) -> ResultsResult<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(manifest)?;
        fs::write(self.manifest_path(), json)?;
        Ok(())
    }

    pub fn load_manifest(&self) -> ResultsResult<SummaryManifest> {
        let path = self.manifest_path();
        if !path.exists() {
            return Err(ResultsError::ManifestNotFound { path });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Drop the manifest so the next update recompiles.
    pub fn invalidate(&self) -> ResultsResult<()> {
        let path = self.manifest_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}
