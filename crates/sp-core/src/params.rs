//! Ordered named parameter sets.

use crate::numeric::ensure_finite;
use crate::{CoreError, CoreResult};

/// Physical parameters of one run, kept in declaration order.
///
/// Names are unique and every value is finite. Integer-valued parameters
/// (replicate index) are stored as `f64` like the rest.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamSet {
    entries: Vec<(String, f64)>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, S>(pairs: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for (name, value) in pairs {
            set.push(name, value)?;
        }
        Ok(set)
    }

    pub fn push(&mut self, name: impl Into<String>, value: f64) -> CoreResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(CoreError::InvalidArg {
                what: "parameter name must not be empty".to_string(),
            });
        }
        if self.contains(&name) {
            return Err(CoreError::DuplicateParam { name });
        }
        ensure_finite(value, &name)?;
        self.entries.push((name, value));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    /// Copy of the set with `name` removed (no-op when absent).
    pub fn without(&self, name: &str) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(n, _)| n != name)
                .cloned()
                .collect(),
        }
    }

    /// Hashable identity of the set. `-0.0` and `0.0` map to the same key.
    pub fn group_key(&self) -> GroupKey {
        GroupKey(
            self.entries
                .iter()
                .map(|(n, v)| {
                    let v = if *v == 0.0 { 0.0 } else { *v };
                    (n.clone(), v.to_bits())
                })
                .collect(),
        )
    }
}

/// Exact-match grouping key for a [`ParamSet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey(Vec<(String, u64)>);
