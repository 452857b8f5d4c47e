//! Analysis pipeline: catalog, compile, reduce, write, with caching.

use sp_catalog::{AnalysisConfig, RunDescriptor};
use sp_compile::{
    CompilationFailure, CompileOutcome, CompiledRun, RunCompiler, TemperatureTrajectory,
};
use sp_core::ParamSet;
use sp_core::timing::Timer;
use sp_reduce::Reducer;
use sp_results::{
    FailureRecord, FileStamp, RunRecord, RunSeriesPaths, SummaryManifest, SummaryStore,
    SummaryTable,
};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config_service::AnalysisRoot;
use crate::error::AppResult;
use crate::progress::{CompileProgress, PipelineProgressEvent, PipelineStage};

/// Runs compiled between two progress events.
const COMPILE_CHUNK: usize = 64;

const TIME_FIELD: &str = "time";
const TEMP_FIELD: &str = "temp";

/// Options for one pipeline pass.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Recompile even when the stored summary is up to date.
    pub force: bool,
    pub parallel: bool,
    /// Also write per-run stage series under `<run>/anal/`.
    pub write_run_series: bool,
    pub tool_version: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            force: false,
            parallel: true,
            write_run_series: false,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Request to bring one analysis root's summary up to date.
pub struct PipelineRequest<'a> {
    pub root: &'a Path,
    pub options: PipelineOptions,
}

/// Wall time per pipeline stage.
#[derive(Debug, Clone, Default)]
pub struct PipelineTiming {
    pub catalog_time_s: f64,
    pub compile_time_s: f64,
    pub reduce_time_s: f64,
    pub write_time_s: f64,
    pub run_series_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
}

#[derive(Debug, Clone)]
pub struct PipelineResponse {
    pub summary_path: PathBuf,
    pub failures_path: PathBuf,
    pub manifest: SummaryManifest,
    pub loaded_from_cache: bool,
    /// Failed runs of this pass; empty when loaded from cache.
    pub failures: Vec<CompilationFailure>,
    /// Groups dropped for lack of successes; empty when loaded from cache.
    pub empty_groups: Vec<ParamSet>,
    pub run_series_written: usize,
    pub timing: PipelineTiming,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(PipelineProgressEvent)>,
    stage: PipelineStage,
    started: Instant,
    message: Option<String>,
    compile: Option<CompileProgress>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        let mut event =
            PipelineProgressEvent::stage(stage, started.elapsed().as_secs_f64(), message);
        event.compile = compile;
        cb(event);
    }
}

/// Compile, reduce and write one root, or reuse its stored summary.
pub fn ensure_summary(request: &PipelineRequest) -> AppResult<PipelineResponse> {
    ensure_summary_with_progress(request, None)
}

/// [`ensure_summary`] streaming progress events.
pub fn ensure_summary_with_progress(
    request: &PipelineRequest,
    mut progress_cb: Option<&mut dyn FnMut(PipelineProgressEvent)>,
) -> AppResult<PipelineResponse> {
    let started = Instant::now();
    let mut timing = PipelineTiming::default();

    emit_progress(
        &mut progress_cb,
        PipelineStage::LoadingConfig,
        started,
        Some("Loading analysis config".to_string()),
        None,
    );
    let root = AnalysisRoot::open(request.root)?;
    let config = &root.config;
    tracing::info!(
        name = %config.name,
        config = %root.config_path.display(),
        "analysis root opened"
    );

    emit_progress(
        &mut progress_cb,
        PipelineStage::LoadingCatalog,
        started,
        Some("Loading run catalog".to_string()),
        None,
    );
    let timer = Timer::start("catalog");
    let runs = sp_catalog::load_catalog(config, &root.base_dir)?;
    timing.catalog_time_s = finish(timer);
    tracing::info!(runs = runs.len(), "catalog loaded");

    emit_progress(
        &mut progress_cb,
        PipelineStage::CheckingCache,
        started,
        Some("Checking summary cache".to_string()),
        None,
    );
    let store = SummaryStore::for_root(&root.base_dir, &config.output);
    let compiler = RunCompiler::from_config(config)?;
    let inputs: Vec<FileStamp> = runs
        .iter()
        .flat_map(|run| compiler.result_files(run))
        .map(|path| FileStamp::of(&path))
        .collect();
    let fingerprint = sp_results::compute_fingerprint(
        config,
        &runs,
        &inputs,
        &request.options.tool_version,
    )?;

    if !request.options.force
        && store.has_summary()
        && let Ok(manifest) = store.load_manifest()
        && manifest.fingerprint == fingerprint
    {
        emit_progress(
            &mut progress_cb,
            PipelineStage::LoadingCachedSummary,
            started,
            Some("Reusing stored summary".to_string()),
            None,
        );
        let timer = Timer::start("load_cache");
        // Make sure the stored table is still readable.
        let table = store.load_summary(&config.identifying_params())?;
        timing.load_cache_time_s = finish(timer);
        timing.total_time_s = started.elapsed().as_secs_f64();
        tracing::info!(rows = table.len(), "summary up to date");

        emit_progress(
            &mut progress_cb,
            PipelineStage::Completed,
            started,
            Some("Loaded cached summary".to_string()),
            None,
        );
        return Ok(PipelineResponse {
            summary_path: store.summary_path(),
            failures_path: store.failures_path(),
            manifest,
            loaded_from_cache: true,
            failures: Vec::new(),
            empty_groups: Vec::new(),
            run_series_written: 0,
            timing,
        });
    }

    // The old manifest must not vouch for a half-written summary.
    store.invalidate()?;

    let timer = Timer::start("compile");
    let outcomes = compile_with_progress(
        &compiler,
        &runs,
        request.options.parallel,
        &mut progress_cb,
        started,
    );
    timing.compile_time_s = finish(timer);

    let failures: Vec<CompilationFailure> = outcomes
        .iter()
        .filter_map(|o| o.as_ref().err().cloned())
        .collect();
    for failure in &failures {
        tracing::warn!(
            job = %failure.run.job_id(),
            sim = %failure.run.sim_id(),
            reason = %failure.reason,
            path = %failure.path.display(),
            detail = %failure.detail,
            "run failed to compile"
        );
    }

    emit_progress(
        &mut progress_cb,
        PipelineStage::Reducing,
        started,
        Some("Averaging replicates".to_string()),
        None,
    );
    let timer = Timer::start("reduce");
    let reduction = Reducer::from_config(config).reduce(&outcomes);
    timing.reduce_time_s = finish(timer);

    emit_progress(
        &mut progress_cb,
        PipelineStage::WritingSummary,
        started,
        Some("Writing summary tables".to_string()),
        None,
    );
    let timer = Timer::start("write");
    let param_names = config.param_names();
    store.write_summary(&reduction.table)?;
    store.write_failures(&param_names, &failure_records(&failures))?;
    store.write_runs(
        &param_names,
        &reduction.table.property_columns,
        &run_records(&outcomes, &reduction.table),
    )?;

    let manifest = SummaryManifest {
        fingerprint,
        name: config.name.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        tool_version: request.options.tool_version.clone(),
        run_count: outcomes.len(),
        success_count: outcomes.len() - failures.len(),
        failure_count: failures.len(),
        empty_group_count: reduction.empty_groups.len(),
        row_count: reduction.table.len(),
        param_columns: reduction.table.param_columns.clone(),
        property_columns: reduction.table.property_columns.clone(),
    };
    store.save_manifest(&manifest)?;
    timing.write_time_s = finish(timer);

    let mut run_series_written = 0;
    if request.options.write_run_series {
        emit_progress(
            &mut progress_cb,
            PipelineStage::WritingRunSeries,
            started,
            Some("Writing per-run stage series".to_string()),
            None,
        );
        let timer = Timer::start("run_series");
        run_series_written = write_run_series(&outcomes, config);
        timing.run_series_time_s = finish(timer);
    }

    timing.total_time_s = started.elapsed().as_secs_f64();
    tracing::info!(
        runs = manifest.run_count,
        succeeded = manifest.success_count,
        failed = manifest.failure_count,
        empty_groups = manifest.empty_group_count,
        rows = manifest.row_count,
        seconds = timing.total_time_s,
        "summary written"
    );

    emit_progress(
        &mut progress_cb,
        PipelineStage::Completed,
        started,
        Some("Summary completed".to_string()),
        None,
    );

    Ok(PipelineResponse {
        summary_path: store.summary_path(),
        failures_path: store.failures_path(),
        manifest,
        loaded_from_cache: false,
        failures,
        empty_groups: reduction.empty_groups,
        run_series_written,
        timing,
    })
}

/// Stop `timer` and log the stage duration.
fn finish(timer: Timer) -> f64 {
    let label = timer.label();
    let seconds = timer.stop();
    tracing::debug!(stage = label, seconds, "stage finished");
    seconds
}

fn compile_with_progress(
    compiler: &RunCompiler,
    runs: &[RunDescriptor],
    parallel: bool,
    progress_cb: &mut Option<&mut dyn FnMut(PipelineProgressEvent)>,
    started: Instant,
) -> Vec<CompileOutcome> {
    let total = runs.len();
    let mut outcomes = Vec::with_capacity(total);
    let mut failed = 0;

    emit_progress(
        progress_cb,
        PipelineStage::CompilingRuns,
        started,
        Some(format!("Compiling {total} runs")),
        Some(CompileProgress {
            compiled: 0,
            total,
            failed: 0,
            fraction_complete: 0.0,
        }),
    );

    for chunk in runs.chunks(COMPILE_CHUNK) {
        let batch = compiler.compile_all(chunk, parallel);
        failed += batch.iter().filter(|o| o.is_err()).count();
        outcomes.extend(batch);

        emit_progress(
            progress_cb,
            PipelineStage::CompilingRuns,
            started,
            None,
            Some(CompileProgress {
                compiled: outcomes.len(),
                total,
                failed,
                fraction_complete: outcomes.len() as f64 / total as f64,
            }),
        );
    }
    outcomes
}

fn failure_records(failures: &[CompilationFailure]) -> Vec<FailureRecord> {
    failures
        .iter()
        .map(|f| FailureRecord {
            params: f.run.params().values(),
            job_id: f.run.job_id().to_string(),
            sim_id: f.run.sim_id().to_string(),
            reason: f.reason.to_string(),
            path: f.path.display().to_string(),
            detail: f.detail.clone(),
        })
        .collect()
}

fn run_records(outcomes: &[CompileOutcome], table: &SummaryTable) -> Vec<RunRecord> {
    outcomes
        .iter()
        .filter_map(|o| o.as_ref().ok())
        .map(|c| RunRecord {
            job_id: c.run.job_id().to_string(),
            sim_id: c.run.sim_id().to_string(),
            params: c.run.params().values(),
            values: table
                .property_columns
                .iter()
                .map(|p| c.result.get(p))
                .collect(),
        })
        .collect()
}

/// Per-run series are side outputs: a run that cannot be written is
/// logged and skipped. Returns the number of runs written.
fn write_run_series(outcomes: &[CompileOutcome], config: &AnalysisConfig) -> usize {
    let mut written = 0;
    for compiled in outcomes.iter().filter_map(|o| o.as_ref().ok()) {
        if compiled.stages.is_empty() {
            continue;
        }
        match write_one_series(compiled, config.output.trajectory_points) {
            Ok(()) => written += 1,
            Err(e) => tracing::warn!(
                run = %compiled.run.path().display(),
                error = %e,
                "failed to write run series"
            ),
        }
    }
    written
}

fn write_one_series(compiled: &CompiledRun, points: usize) -> AppResult<()> {
    let paths = RunSeriesPaths::for_run(&compiled.run);
    let rows: Vec<Vec<f64>> = compiled
        .stages
        .iter()
        .map(|s| s.fields.iter().map(|(_, v)| v).collect())
        .collect();
    sp_results::write_stage_series(&paths.stages, &compiled.header, &rows)?;

    match TemperatureTrajectory::from_stages(&compiled.stages, TIME_FIELD, TEMP_FIELD) {
        Some(trajectory) => {
            sp_results::write_trajectory(&paths.trajectory, &trajectory.resample(points))?
        }
        None => tracing::debug!(
            run = %compiled.run.path().display(),
            "no time/temp fields; trajectory skipped"
        ),
    }
    Ok(())
}

/// Loaded summary of an analysis root.
#[derive(Debug, Clone)]
pub struct LoadedSummary {
    pub root: AnalysisRoot,
    pub table: SummaryTable,
}

/// Read a root's stored summary without recompiling.
pub fn load_summary(root: &Path) -> AppResult<LoadedSummary> {
    let root = AnalysisRoot::open(root)?;
    let store = SummaryStore::for_root(&root.base_dir, &root.config.output);
    let table = store.load_summary(&root.config.identifying_params())?;
    Ok(LoadedSummary { root, table })
}

/// Resolve a root's run catalog.
pub fn list_runs(root: &Path) -> AppResult<Vec<RunDescriptor>> {
    let root = AnalysisRoot::open(root)?;
    Ok(sp_catalog::load_catalog(&root.config, &root.base_dir)?)
}
