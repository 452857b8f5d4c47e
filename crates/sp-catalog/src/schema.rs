//! Analysis configuration schema.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const LATEST_VERSION: u32 = 1;

/// Conventional config file name inside an analysis root.
pub const DEFAULT_CONFIG_FILE: &str = "analysis.yaml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    pub version: u32,
    pub name: String,
    pub catalog: CatalogDef,
    #[serde(default)]
    pub layout: LayoutDef,
    /// Parameter averaged over when building the summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicate_param: Option<String>,
    /// Allow-list of tracked properties; `None` tracks every field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<String>>,
    #[serde(default)]
    pub output: OutputDef,
}

impl AnalysisConfig {
    /// Every parameter a run carries, in declaration order.
    pub fn param_names(&self) -> Vec<String> {
        match &self.catalog {
            CatalogDef::Table { params, .. } => params.clone(),
            CatalogDef::Directory { levels, .. } => levels.iter().map(|l| l.name.clone()).collect(),
        }
    }

    /// Parameters that identify a summary row (replicate removed).
    pub fn identifying_params(&self) -> Vec<String> {
        self.param_names()
            .into_iter()
            .filter(|p| Some(p) != self.replicate_param.as_ref())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum CatalogDef {
    /// One row per run in a CSV parameter table.
    Table {
        path: PathBuf,
        #[serde(default = "default_job_column")]
        job_column: String,
        #[serde(default = "default_sim_column")]
        sim_column: String,
        #[serde(default = "default_path_column")]
        path_column: String,
        params: Vec<String>,
    },
    /// Nested directories, one level per parameter.
    Directory {
        #[serde(default = "default_root")]
        root: PathBuf,
        levels: Vec<LevelDef>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelDef {
    pub name: String,
    pub prefix: String,
    pub width: usize,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl LevelDef {
    pub fn grammar(&self) -> sp_core::CoreResult<sp_core::DirGrammar> {
        sp_core::DirGrammar::new(self.prefix.clone(), self.width, self.scale)
    }
}

/// Where a run keeps its result files. File names are templates with
/// `{job_id}`, `{sim_id}` and `{<param>}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum LayoutDef {
    /// `<run>/<stage_dir>/NNN/<file>`, one file per annealing stage.
    Annealed {
        #[serde(default = "default_stage_dir")]
        stage_dir: String,
        #[serde(default = "default_annealed_file")]
        file: String,
    },
    /// `<run>/<file>`, one result file per run.
    Single {
        #[serde(default = "default_single_file")]
        file: String,
    },
}

impl Default for LayoutDef {
    fn default() -> Self {
        LayoutDef::Annealed {
            stage_dir: default_stage_dir(),
            file: default_annealed_file(),
        }
    }
}

impl LayoutDef {
    pub fn file_template(&self) -> &str {
        match self {
            LayoutDef::Annealed { file, .. } | LayoutDef::Single { file } => file,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputDef {
    #[serde(default = "default_summary_dir")]
    pub summary_dir: String,
    #[serde(default = "default_summary_file")]
    pub summary_file: String,
    #[serde(default = "default_failure_file")]
    pub failure_file: String,
    #[serde(default = "default_runs_file")]
    pub runs_file: String,
    /// Decimal places for property values in written tables.
    #[serde(default = "default_precision")]
    pub precision: usize,
    /// Sample count of the per-run temperature trajectory.
    #[serde(default = "default_trajectory_points")]
    pub trajectory_points: usize,
}

impl Default for OutputDef {
    fn default() -> Self {
        Self {
            summary_dir: default_summary_dir(),
            summary_file: default_summary_file(),
            failure_file: default_failure_file(),
            runs_file: default_runs_file(),
            precision: default_precision(),
            trajectory_points: default_trajectory_points(),
        }
    }
}

fn default_job_column() -> String {
    "jobid".to_string()
}

fn default_sim_column() -> String {
    "simid".to_string()
}

fn default_path_column() -> String {
    "path".to_string()
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_scale() -> f64 {
    100.0
}

fn default_stage_dir() -> String {
    "anneal".to_string()
}

fn default_annealed_file() -> String {
    "{job_id}{sim_id}_anneal.csv".to_string()
}

fn default_single_file() -> String {
    "anneal/{sim_id}_anneal.csv".to_string()
}

fn default_summary_dir() -> String {
    "summary".to_string()
}

fn default_summary_file() -> String {
    "status.csv".to_string()
}

fn default_failure_file() -> String {
    "failures.csv".to_string()
}

fn default_runs_file() -> String {
    "runs.csv".to_string()
}

fn default_precision() -> usize {
    3
}

fn default_trajectory_points() -> usize {
    10_000
}
