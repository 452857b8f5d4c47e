//! Catalog sources.

use std::path::Path;

use crate::directory::{DirectorySource, Level};
use crate::schema::{AnalysisConfig, CatalogDef};
use crate::table::TableSource;
use crate::{CatalogResult, RunDescriptor};

/// Anything that can produce the list of runs for an analysis.
pub trait CatalogSource {
    fn load(&self) -> CatalogResult<Vec<RunDescriptor>>;
}

/// Build the source described by `config`. Relative paths resolve
/// against `base_dir` (the directory holding the config file).
pub fn build_source(
    config: &AnalysisConfig,
    base_dir: &Path,
) -> CatalogResult<Box<dyn CatalogSource>> {
    let source: Box<dyn CatalogSource> = match &config.catalog {
        CatalogDef::Table {
            path,
            job_column,
            sim_column,
            path_column,
            params,
        } => Box::new(TableSource {
            path: base_dir.join(path),
            job_column: job_column.clone(),
            sim_column: sim_column.clone(),
            path_column: path_column.clone(),
            params: params.clone(),
        }),
        CatalogDef::Directory { root, levels } => {
            let levels = levels
                .iter()
                .map(|l| -> CatalogResult<Level> {
                    Ok(Level {
                        name: l.name.clone(),
                        grammar: l.grammar()?,
                    })
                })
                .collect::<CatalogResult<Vec<_>>>()?;
            Box::new(DirectorySource {
                root: base_dir.join(root),
                levels,
            })
        }
    };
    Ok(source)
}

/// Load every run the config describes.
pub fn load_catalog(config: &AnalysisConfig, base_dir: &Path) -> CatalogResult<Vec<RunDescriptor>> {
    build_source(config, base_dir)?.load()
}
