//! Analysis config loading, saving, validation and introspection.

use sp_catalog::{AnalysisConfig, CatalogDef, DEFAULT_CONFIG_FILE, LayoutDef};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Load and validate an analysis config from a YAML file.
pub fn load_config(path: &Path) -> AppResult<AnalysisConfig> {
    if !path.is_file() {
        return Err(AppError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(sp_catalog::load_yaml(path)?)
}

/// Validate and save an analysis config to a YAML file.
pub fn save_config(path: &Path, config: &AnalysisConfig) -> AppResult<()> {
    sp_catalog::save_yaml(path, config)?;
    Ok(())
}

/// A loaded analysis: the config and the directory its relative paths
/// (and the summary directory) resolve against.
#[derive(Debug, Clone)]
pub struct AnalysisRoot {
    pub config_path: PathBuf,
    pub base_dir: PathBuf,
    pub config: AnalysisConfig,
}

impl AnalysisRoot {
    /// `root` is either an analysis directory holding `analysis.yaml`
    /// or a config file.
    pub fn open(root: &Path) -> AppResult<Self> {
        let config_path = if root.is_dir() {
            root.join(DEFAULT_CONFIG_FILE)
        } else {
            root.to_path_buf()
        };
        let config = load_config(&config_path)?;
        let base_dir = match config_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self {
            config_path,
            base_dir,
            config,
        })
    }
}

/// Summary of a config for listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSummary {
    pub name: String,
    pub catalog_kind: &'static str,
    pub layout_kind: &'static str,
    pub params: Vec<String>,
    pub replicate_param: Option<String>,
    pub property_count: Option<usize>,
}

pub fn describe_config(config: &AnalysisConfig) -> ConfigSummary {
    ConfigSummary {
        name: config.name.clone(),
        catalog_kind: match config.catalog {
            CatalogDef::Table { .. } => "table",
            CatalogDef::Directory { .. } => "directory",
        },
        layout_kind: match config.layout {
            LayoutDef::Annealed { .. } => "annealed",
            LayoutDef::Single { .. } => "single",
        },
        params: config.param_names(),
        replicate_param: config.replicate_param.clone(),
        property_count: config.properties.as_ref().map(Vec::len),
    }
}
