//! Result file name templates.
//!
//! `{job_id}{sim_id}_anneal.csv` renders to `A12sq32_anneal.csv` for a run
//! with job id `A12` and sim id `sq32`. Any other `{name}` placeholder is
//! replaced with the run's parameter of that name.

use sp_core::{ParamSet, format_param};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("Unclosed placeholder in template '{template}'")]
    Unclosed { template: String },

    #[error("Empty placeholder in template '{template}'")]
    EmptyPlaceholder { template: String },

    #[error("Template references unknown parameter '{name}'")]
    UnknownParam { name: String },
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    JobId,
    SimId,
    Param(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileTemplate {
    segments: Vec<Segment>,
}

impl FileTemplate {
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| TemplateError::Unclosed {
                template: template.to_string(),
            })?;
            let name = &after[..close];
            segments.push(match name {
                "" => {
                    return Err(TemplateError::EmptyPlaceholder {
                        template: template.to_string(),
                    });
                }
                "job_id" => Segment::JobId,
                "sim_id" => Segment::SimId,
                other => Segment::Param(other.to_string()),
            });
            rest = &after[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }
        Ok(Self { segments })
    }

    /// Parameter names the template refers to.
    pub fn param_refs(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn render(
        &self,
        job_id: &str,
        sim_id: &str,
        params: &ParamSet,
    ) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::JobId => out.push_str(job_id),
                Segment::SimId => out.push_str(sim_id),
                Segment::Param(name) => {
                    let value = params
                        .get(name)
                        .ok_or_else(|| TemplateError::UnknownParam { name: name.clone() })?;
                    out.push_str(&format_param(value));
                }
            }
        }
        Ok(out)
    }
}
