//! Analysis config validation.

use std::collections::HashSet;

use crate::schema::{AnalysisConfig, CatalogDef, LATEST_VERSION, LayoutDef};
use crate::template::FileTemplate;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate name: {name} in {context}")]
    DuplicateName { name: String, context: String },

    #[error("Missing reference: {name} in {context}")]
    MissingReference { name: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Empty list: {field}")]
    EmptyList { field: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_config(config: &AnalysisConfig) -> Result<(), ValidationError> {
    if config.version == 0 || config.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }

    validate_catalog(&config.catalog)?;

    let params = config.param_names();
    let declared: HashSet<&str> = params.iter().map(String::as_str).collect();

    if let Some(replicate) = &config.replicate_param
        && !declared.contains(replicate.as_str())
    {
        return Err(ValidationError::MissingReference {
            name: replicate.clone(),
            context: "replicate_param".to_string(),
        });
    }

    if let Some(properties) = &config.properties {
        if properties.is_empty() {
            return Err(ValidationError::EmptyList {
                field: "properties".to_string(),
            });
        }
        unique_names(properties, "properties")?;
        if let Some(clash) = properties.iter().find(|p| declared.contains(p.as_str())) {
            return Err(ValidationError::DuplicateName {
                name: clash.clone(),
                context: "properties and catalog params".to_string(),
            });
        }
    }

    validate_layout(&config.layout, &declared)?;

    let output = &config.output;
    if output.precision > 12 {
        return Err(ValidationError::InvalidValue {
            field: "output.precision".to_string(),
            value: output.precision.to_string(),
            reason: "at most 12 decimal places".to_string(),
        });
    }
    if output.trajectory_points < 2 {
        return Err(ValidationError::InvalidValue {
            field: "output.trajectory_points".to_string(),
            value: output.trajectory_points.to_string(),
            reason: "need at least two samples".to_string(),
        });
    }
    for (field, value) in [
        ("output.summary_dir", &output.summary_dir),
        ("output.summary_file", &output.summary_file),
        ("output.failure_file", &output.failure_file),
        ("output.runs_file", &output.runs_file),
    ] {
        if value.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                value: value.clone(),
                reason: "must not be empty".to_string(),
            });
        }
    }
    unique_names(
        &[
            output.summary_file.clone(),
            output.failure_file.clone(),
            output.runs_file.clone(),
        ],
        "output files",
    )?;

    Ok(())
}

fn validate_catalog(catalog: &CatalogDef) -> Result<(), ValidationError> {
    match catalog {
        CatalogDef::Table {
            path,
            job_column,
            sim_column,
            path_column,
            params,
        } => {
            if path.as_os_str().is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: "catalog.path".to_string(),
                    value: String::new(),
                    reason: "must not be empty".to_string(),
                });
            }
            if params.is_empty() {
                return Err(ValidationError::EmptyList {
                    field: "catalog.params".to_string(),
                });
            }
            let mut columns = params.clone();
            columns.extend([job_column.clone(), sim_column.clone(), path_column.clone()]);
            unique_names(&columns, "catalog columns")?;
        }
        CatalogDef::Directory { levels, .. } => {
            if levels.is_empty() {
                return Err(ValidationError::EmptyList {
                    field: "catalog.levels".to_string(),
                });
            }
            let names: Vec<String> = levels.iter().map(|l| l.name.clone()).collect();
            unique_names(&names, "catalog levels")?;
            for level in levels {
                level
                    .grammar()
                    .map_err(|e| ValidationError::InvalidValue {
                        field: format!("catalog.levels[{}]", level.name),
                        value: format!("{}/{}/{}", level.prefix, level.width, level.scale),
                        reason: e.to_string(),
                    })?;
            }
        }
    }
    Ok(())
}

fn validate_layout(layout: &LayoutDef, declared: &HashSet<&str>) -> Result<(), ValidationError> {
    if let LayoutDef::Annealed { stage_dir, .. } = layout
        && stage_dir.trim().is_empty()
    {
        return Err(ValidationError::InvalidValue {
            field: "layout.stage_dir".to_string(),
            value: stage_dir.clone(),
            reason: "must not be empty".to_string(),
        });
    }

    let raw = layout.file_template();
    let template = FileTemplate::parse(raw).map_err(|e| ValidationError::InvalidValue {
        field: "layout.file".to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    for name in template.param_refs() {
        if !declared.contains(name) {
            return Err(ValidationError::MissingReference {
                name: name.to_string(),
                context: "layout.file".to_string(),
            });
        }
    }
    Ok(())
}

fn unique_names(names: &[String], context: &str) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: context.to_string(),
                value: name.clone(),
                reason: "names must not be empty".to_string(),
            });
        }
        if !seen.insert(name) {
            return Err(ValidationError::DuplicateName {
                name: name.clone(),
                context: context.to_string(),
            });
        }
    }
    Ok(())
}
