//! Replicate averaging.

use sp_catalog::AnalysisConfig;
use sp_compile::{CompileOutcome, CompiledRun, outcome_run};
use sp_core::{GroupKey, ParamSet, mean};
use sp_results::{SummaryRow, SummaryTable};
use std::collections::HashMap;

/// Groups compiled runs by their identifying parameters and averages
/// each tracked property over the successful members of a group.
#[derive(Debug, Clone, Default)]
pub struct Reducer {
    replicate_param: Option<String>,
    properties: Option<Vec<String>>,
    /// Identifying columns; taken from the first run when unset.
    param_columns: Option<Vec<String>>,
}

/// Output of one reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub table: SummaryTable,
    /// Identifying parameters of groups without a single success.
    pub empty_groups: Vec<ParamSet>,
}

struct Group<'a> {
    params: ParamSet,
    members: Vec<&'a CompiledRun>,
}

impl Reducer {
    pub fn new(replicate_param: Option<String>, properties: Option<Vec<String>>) -> Self {
        Self {
            replicate_param,
            properties,
            param_columns: None,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            param_columns: Some(config.identifying_params()),
            ..Self::new(config.replicate_param.clone(), config.properties.clone())
        }
    }

    fn identifying(&self, params: &ParamSet) -> ParamSet {
        match &self.replicate_param {
            Some(rep) => params.without(rep),
            None => params.clone(),
        }
    }

    /// Properties to track: the allow-list, or every field seen across
    /// successes in first-appearance order.
    pub fn tracked_properties(&self, outcomes: &[CompileOutcome]) -> Vec<String> {
        if let Some(list) = &self.properties {
            return list.clone();
        }
        let mut seen: Vec<String> = Vec::new();
        for compiled in outcomes.iter().filter_map(|o| o.as_ref().ok()) {
            for name in compiled.result.names() {
                if !seen.iter().any(|s| s == name) {
                    seen.push(name.to_string());
                }
            }
        }
        seen
    }

    pub fn reduce(&self, outcomes: &[CompileOutcome]) -> Reduction {
        let properties = self.tracked_properties(outcomes);

        let mut groups: Vec<Group<'_>> = Vec::new();
        let mut index: HashMap<GroupKey, usize> = HashMap::new();
        for outcome in outcomes {
            let params = self.identifying(outcome_run(outcome).params());
            let slot = *index.entry(params.group_key()).or_insert_with(|| {
                groups.push(Group {
                    params,
                    members: Vec::new(),
                });
                groups.len() - 1
            });
            if let Ok(compiled) = outcome {
                groups[slot].members.push(compiled);
            }
        }

        let param_columns: Vec<String> = match &self.param_columns {
            Some(columns) => columns.clone(),
            None => groups
                .first()
                .map(|g| g.params.names().map(str::to_string).collect())
                .unwrap_or_default(),
        };
        let mut table = SummaryTable::new(param_columns, properties);
        let mut empty_groups = Vec::new();

        for group in groups {
            if group.members.is_empty() {
                tracing::warn!(group = ?group.params, "no successful runs in group; row dropped");
                empty_groups.push(group.params);
                continue;
            }

            let values = table
                .property_columns
                .iter()
                .map(|prop| {
                    let samples: Vec<f64> = group
                        .members
                        .iter()
                        .filter_map(|run| run.result.get(prop))
                        .collect();
                    mean(&samples)
                })
                .collect();
            let params: Option<Vec<f64>> = table
                .param_columns
                .iter()
                .map(|c| group.params.get(c))
                .collect();
            match params {
                Some(params) if params.len() == group.params.len() => {
                    table.rows.push(SummaryRow { params, values });
                }
                _ => tracing::warn!(group = ?group.params, "inconsistent parameters; row dropped"),
            }
        }

        tracing::debug!(
            rows = table.len(),
            empty = empty_groups.len(),
            "reduced compiled runs"
        );
        Reduction {
            table,
            empty_groups,
        }
    }
}
