//! Compiled record types.

use sp_catalog::RunDescriptor;
use sp_core::StageId;

use crate::FailureReason;

/// Parsed result line: one value per header field, header order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldRecord {
    fields: Vec<(String, f64)>,
}

impl FieldRecord {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            fields: Vec::with_capacity(n),
        }
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            fields: pairs.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }

    pub(crate) fn push(&mut self, name: &str, value: f64) {
        self.fields.push((name.to_string(), value));
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One accepted annealing stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageRecord {
    pub stage: StageId,
    pub fields: FieldRecord,
}

/// One annealing stage that was skipped, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSkip {
    pub stage: StageId,
    pub reason: FailureReason,
    pub detail: String,
}

/// A successfully compiled run.
#[derive(Debug, Clone)]
pub struct CompiledRun {
    pub run: RunDescriptor,
    /// Header fields of the run's result files.
    pub header: Vec<String>,
    /// Representative result: the last accepted stage, or the single
    /// result line.
    pub result: FieldRecord,
    /// Stage the result came from (annealed layout only).
    pub final_stage: Option<StageId>,
    /// Every accepted stage in ascending order (annealed layout only).
    pub stages: Vec<StageRecord>,
    pub skipped: Vec<StageSkip>,
}
