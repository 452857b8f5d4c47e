//! Catalog discovered from a directory naming convention.

use sp_core::{DirGrammar, ParamSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::source::CatalogSource;
use crate::{CatalogError, CatalogResult, RunDescriptor};

/// One directory level of the hierarchy, e.g. `h###` for field strength.
#[derive(Debug, Clone)]
pub struct Level {
    pub name: String,
    pub grammar: DirGrammar,
}

/// Walks `root/<level 0>/<level 1>/...`, one parameter per level.
///
/// Siblings are visited in ascending parameter order whatever order the
/// filesystem lists them in. A parent without matching subdirectories is
/// skipped; a level with no match under any parent fails the whole load.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    pub root: PathBuf,
    pub levels: Vec<Level>,
}

struct Match {
    value: f64,
    name: String,
    path: PathBuf,
}

impl DirectorySource {
    /// Matching subdirectories of `dir`, sorted by parsed value.
    fn matching_children(&self, dir: &Path, grammar: &DirGrammar) -> CatalogResult<Vec<Match>> {
        let entries = fs::read_dir(dir).map_err(|source| CatalogError::ListDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut matches = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| CatalogError::ListDir {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if let Some(value) = grammar.parse(&name) {
                matches.push(Match { value, name, path });
            }
        }

        matches.sort_by(|a, b| a.value.total_cmp(&b.value).then_with(|| a.name.cmp(&b.name)));
        Ok(matches)
    }

    /// `found[d]` counts matches at level `d` over every visited parent.
    fn walk(
        &self,
        dir: &Path,
        depth: usize,
        trail: &mut Vec<(String, String, f64)>,
        found: &mut [usize],
        out: &mut Vec<RunDescriptor>,
    ) -> CatalogResult<()> {
        let Some(level) = self.levels.get(depth) else {
            let sim_id: String = trail.iter().map(|(_, dir_name, _)| dir_name.as_str()).collect();
            let params = ParamSet::from_pairs(trail.iter().map(|(p, _, v)| (p.clone(), *v)))?;
            out.push(RunDescriptor::new("", sim_id, dir, params)?);
            return Ok(());
        };

        let children = self.matching_children(dir, &level.grammar)?;
        if children.is_empty() {
            tracing::warn!(
                parent = %dir.display(),
                level = %level.name,
                grammar = %level.grammar,
                "no matching subdirectories; branch skipped"
            );
            return Ok(());
        }
        found[depth] += children.len();
        for child in children {
            trail.push((level.name.clone(), child.name, child.value));
            self.walk(&child.path, depth + 1, trail, found, out)?;
            trail.pop();
        }
        Ok(())
    }
}

impl CatalogSource for DirectorySource {
    fn load(&self) -> CatalogResult<Vec<RunDescriptor>> {
        if self.levels.is_empty() {
            return Err(CatalogError::InvalidDescriptor {
                what: "directory catalog needs at least one level".to_string(),
            });
        }
        let mut runs = Vec::new();
        let mut found = vec![0; self.levels.len()];
        self.walk(&self.root, 0, &mut Vec::new(), &mut found, &mut runs)?;
        if let Some(depth) = found.iter().position(|&n| n == 0) {
            return Err(CatalogError::EmptyLevel {
                parent: self.root.clone(),
                grammar: self.levels[depth].grammar.to_string(),
            });
        }
        tracing::debug!(
            root = %self.root.display(),
            runs = runs.len(),
            "walked directory catalog"
        );
        Ok(runs)
    }
}
