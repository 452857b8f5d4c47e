use sp_catalog::{FileTemplate, LayoutDef, TemplateError};

/// Resolved result-file layout of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultLayout {
    /// `<run>/<stage_dir>/NNN/<file>`
    Annealed { stage_dir: String, file: FileTemplate },
    /// `<run>/<file>`
    Single { file: FileTemplate },
}

impl ResultLayout {
    pub fn from_def(def: &LayoutDef) -> Result<Self, TemplateError> {
        Ok(match def {
            LayoutDef::Annealed { stage_dir, file } => ResultLayout::Annealed {
                stage_dir: stage_dir.clone(),
                file: FileTemplate::parse(file)?,
            },
            LayoutDef::Single { file } => ResultLayout::Single {
                file: FileTemplate::parse(file)?,
            },
        })
    }

    pub fn file(&self) -> &FileTemplate {
        match self {
            ResultLayout::Annealed { file, .. } | ResultLayout::Single { file } => file,
        }
    }
}
