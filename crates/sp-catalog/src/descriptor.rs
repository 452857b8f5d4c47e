use serde::{Deserialize, Serialize};
use sp_core::ParamSet;
use std::path::{Path, PathBuf};

use crate::{CatalogError, CatalogResult};

/// One simulation run: ids, location on disk and physical parameters.
///
/// Built only through [`RunDescriptor::new`]; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDescriptor {
    job_id: String,
    sim_id: String,
    path: PathBuf,
    params: ParamSet,
}

impl RunDescriptor {
    pub fn new(
        job_id: impl Into<String>,
        sim_id: impl Into<String>,
        path: impl Into<PathBuf>,
        params: ParamSet,
    ) -> CatalogResult<Self> {
        let path = path.into();
        if params.is_empty() {
            return Err(CatalogError::InvalidDescriptor {
                what: format!("run at {} has no parameters", path.display()),
            });
        }
        if path.as_os_str().is_empty() {
            return Err(CatalogError::InvalidDescriptor {
                what: "run path must not be empty".to_string(),
            });
        }
        Ok(Self {
            job_id: job_id.into(),
            sim_id: sim_id.into(),
            path,
            params,
        })
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn sim_id(&self) -> &str {
        &self.sim_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    /// `<job_id><sim_id>`, the stem used for per-run output files.
    pub fn file_stem(&self) -> String {
        format!("{}{}", self.job_id, self.sim_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_params() {
        let err = RunDescriptor::new("j", "s", "runs/a", ParamSet::new()).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidDescriptor { .. }));
    }

    #[test]
    fn keeps_ids_and_params() {
        let params = ParamSet::from_pairs([("H", 0.2)]).unwrap();
        let run = RunDescriptor::new("J1", "sq", "runs/a", params).unwrap();
        assert_eq!(run.file_stem(), "J1sq");
        assert_eq!(run.params().get("H"), Some(0.2));
    }
}
