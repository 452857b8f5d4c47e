//! Per-run result compiler.

use rayon::prelude::*;
use sp_catalog::{AnalysisConfig, RunDescriptor, TemplateError};
use sp_core::StageId;
use std::fs;
use std::path::{Path, PathBuf};

use crate::layout::ResultLayout;
use crate::parse::{self, ParseError};
use crate::{
    CompilationFailure, CompileOutcome, CompiledRun, FailureReason, StageRecord, StageSkip,
};

/// Compiles runs that share one result layout.
#[derive(Debug, Clone)]
pub struct RunCompiler {
    layout: ResultLayout,
}

impl RunCompiler {
    pub fn new(layout: ResultLayout) -> Self {
        Self { layout }
    }

    pub fn from_config(config: &AnalysisConfig) -> Result<Self, TemplateError> {
        Ok(Self::new(ResultLayout::from_def(&config.layout)?))
    }

    pub fn layout(&self) -> &ResultLayout {
        &self.layout
    }

    /// Compile one run. Never panics on bad input; every problem comes
    /// back as a [`CompilationFailure`].
    pub fn compile(&self, run: &RunDescriptor) -> CompileOutcome {
        let file_name = self
            .layout
            .file()
            .render(run.job_id(), run.sim_id(), run.params())
            .map_err(|e| CompilationFailure {
                run: run.clone(),
                reason: FailureReason::MissingFile,
                path: run.path().to_path_buf(),
                detail: format!("cannot resolve result file name: {e}"),
            })?;

        match &self.layout {
            ResultLayout::Annealed { stage_dir, .. } => {
                compile_annealed(run, &run.path().join(stage_dir), &file_name)
            }
            ResultLayout::Single { .. } => compile_single(run, &run.path().join(&file_name)),
        }
    }

    /// Result files `compile` would read for `run`, in reading order.
    /// Unreadable stage roots and unresolvable names give an empty list.
    pub fn result_files(&self, run: &RunDescriptor) -> Vec<PathBuf> {
        let Ok(file_name) = self
            .layout
            .file()
            .render(run.job_id(), run.sim_id(), run.params())
        else {
            return Vec::new();
        };
        match &self.layout {
            ResultLayout::Annealed { stage_dir, .. } => {
                let stage_root = run.path().join(stage_dir);
                list_stages(&stage_root)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|stage| stage_file(&stage_root, stage, &file_name))
                    .collect()
            }
            ResultLayout::Single { .. } => vec![run.path().join(&file_name)],
        }
    }

    /// Compile a batch. Output order matches `runs` in both modes.
    pub fn compile_all(&self, runs: &[RunDescriptor], parallel: bool) -> Vec<CompileOutcome> {
        if parallel {
            runs.par_iter().map(|run| self.compile(run)).collect()
        } else {
            runs.iter().map(|run| self.compile(run)).collect()
        }
    }
}

fn fail(run: &RunDescriptor, path: &Path, (reason, detail): ParseError) -> CompilationFailure {
    CompilationFailure {
        run: run.clone(),
        reason,
        path: path.to_path_buf(),
        detail,
    }
}

fn compile_single(run: &RunDescriptor, path: &Path) -> CompileOutcome {
    let content = parse::read_result_file(path).map_err(|e| fail(run, path, e))?;
    let header = parse::header_of(&content).map_err(|e| fail(run, path, e))?;
    let line = parse::result_line_of(&content).map_err(|e| fail(run, path, e))?;
    let result = parse::parse_values(&header, line, None).map_err(|e| fail(run, path, e))?;

    Ok(CompiledRun {
        run: run.clone(),
        header,
        result,
        final_stage: None,
        stages: Vec::new(),
        skipped: Vec::new(),
    })
}

/// Stage directories under `stage_root`, ascending.
fn list_stages(stage_root: &Path) -> Result<Vec<StageId>, ParseError> {
    let entries = fs::read_dir(stage_root)
        .map_err(|e| (FailureReason::MissingFile, format!("cannot list stages: {e}")))?;
    let mut stages: Vec<StageId> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().and_then(StageId::from_dir_name))
        .collect();
    stages.sort();
    Ok(stages)
}

fn stage_file(stage_root: &Path, stage: StageId, file_name: &str) -> PathBuf {
    stage_root.join(stage.dir_name()).join(file_name)
}

fn read_stage(path: &Path, header: &[String], stage: StageId) -> Result<StageRecord, ParseError> {
    let content = parse::read_result_file(path)?;
    let line = parse::result_line_of(&content)?;
    let fields = parse::parse_values(header, line, Some(stage))?;
    Ok(StageRecord { stage, fields })
}

fn compile_annealed(run: &RunDescriptor, stage_root: &Path, file_name: &str) -> CompileOutcome {
    let stage_ids = list_stages(stage_root).map_err(|e| fail(run, stage_root, e))?;
    let Some(&first) = stage_ids.first() else {
        return Err(fail(
            run,
            stage_root,
            (
                FailureReason::MissingFile,
                "no stage directories".to_string(),
            ),
        ));
    };

    // The lowest stage's file defines the header for the whole run.
    let first_path = stage_file(stage_root, first, file_name);
    let header = parse::read_result_file(&first_path)
        .and_then(|content| parse::header_of(&content))
        .map_err(|e| fail(run, &first_path, e))?;

    let mut stages = Vec::new();
    let mut skipped = Vec::new();
    for &stage in &stage_ids {
        let path = stage_file(stage_root, stage, file_name);
        match read_stage(&path, &header, stage) {
            Ok(record) => stages.push(record),
            Err((reason, detail)) => {
                tracing::debug!(
                    run = %run.path().display(),
                    stage = %stage.dir_name(),
                    %reason,
                    %detail,
                    "skipping annealing stage"
                );
                skipped.push(StageSkip {
                    stage,
                    reason,
                    detail,
                });
            }
        }
    }

    let Some(last) = stages.last() else {
        // Nothing accepted: report the most recent stage's problem.
        let (stage, reason, detail) = skipped
            .last()
            .map(|s| (s.stage, s.reason, s.detail.clone()))
            .unwrap_or((first, FailureReason::ShortFile, "no stages".to_string()));
        return Err(fail(
            run,
            &stage_file(stage_root, stage, file_name),
            (reason, format!("no stage produced a result; last: {detail}")),
        ));
    };

    Ok(CompiledRun {
        run: run.clone(),
        header,
        result: last.fields.clone(),
        final_stage: Some(last.stage),
        stages,
        skipped,
    })
}
