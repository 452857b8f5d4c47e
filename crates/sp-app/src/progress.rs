#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    LoadingConfig,
    LoadingCatalog,
    CheckingCache,
    LoadingCachedSummary,
    CompilingRuns,
    Reducing,
    WritingSummary,
    WritingRunSeries,
    Completed,
}

impl PipelineStage {
    pub fn label(self) -> &'static str {
        match self {
            PipelineStage::LoadingConfig => "config",
            PipelineStage::LoadingCatalog => "catalog",
            PipelineStage::CheckingCache => "cache",
            PipelineStage::LoadingCachedSummary => "cached",
            PipelineStage::CompilingRuns => "compile",
            PipelineStage::Reducing => "reduce",
            PipelineStage::WritingSummary => "write",
            PipelineStage::WritingRunSeries => "series",
            PipelineStage::Completed => "done",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompileProgress {
    pub compiled: usize,
    pub total: usize,
    pub failed: usize,
    pub fraction_complete: f64,
}

#[derive(Debug, Clone)]
pub struct PipelineProgressEvent {
    pub stage: PipelineStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub compile: Option<CompileProgress>,
}

impl PipelineProgressEvent {
    pub fn stage(stage: PipelineStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
            compile: None,
        }
    }
}
