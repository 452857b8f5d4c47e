//! Content-based fingerprint of an analysis.

use serde::Serialize;
use sha2::{Digest, Sha256};
use sp_catalog::{AnalysisConfig, RunDescriptor};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::ResultsResult;

/// On-disk state of one result file. A missing file has no size or time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStamp {
    pub path: PathBuf,
    pub len: Option<u64>,
    /// Modification time as (seconds, nanoseconds) since the Unix epoch.
    pub modified: Option<(u64, u32)>,
}

impl FileStamp {
    pub fn of(path: &Path) -> Self {
        let meta = fs::metadata(path).ok();
        let modified = meta
            .as_ref()
            .and_then(|m| m.modified().ok())
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| (d.as_secs(), d.subsec_nanos()));
        Self {
            path: path.to_path_buf(),
            len: meta.map(|m| m.len()),
            modified,
        }
    }
}

/// Fingerprint of the config, the resolved catalog, the state of every
/// result file and the tool version. Equal fingerprints mean the stored
/// summary can be reused.
pub fn compute_fingerprint(
    config: &AnalysisConfig,
    runs: &[RunDescriptor],
    inputs: &[FileStamp],
    tool_version: &str,
) -> ResultsResult<String> {
    let mut hasher = Sha256::new();

    hasher.update(serde_json::to_string(config)?.as_bytes());
    for run in runs {
        hasher.update(serde_json::to_string(run)?.as_bytes());
        hasher.update(b"\n");
    }
    for stamp in inputs {
        hasher.update(serde_json::to_string(stamp)?.as_bytes());
        hasher.update(b"\n");
    }
    hasher.update(tool_version.as_bytes());

    Ok(format!("{:x}", hasher.finalize()))
}
