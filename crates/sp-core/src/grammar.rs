//! Directory-name parameter grammar.
//!
//! Simulation directories encode one physical parameter each as
//! `<prefix><zero-padded integer>`, where the integer is the value
//! multiplied by a scale factor: `h030` is a field strength of 0.30,
//! `e05` an area fraction of 0.05. The grammar is evaluated on plain
//! strings so it can be tested without touching the filesystem.

use core::fmt;

use crate::{CoreError, CoreResult};

/// `<prefix><width digits>`, value = integer / scale.
#[derive(Debug, Clone, PartialEq)]
pub struct DirGrammar {
    prefix: String,
    width: usize,
    scale: f64,
}

impl DirGrammar {
    pub fn new(prefix: impl Into<String>, width: usize, scale: f64) -> CoreResult<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(CoreError::InvalidArg {
                what: "grammar prefix must not be empty".to_string(),
            });
        }
        if prefix.chars().any(|c| c.is_ascii_digit()) {
            return Err(CoreError::InvalidArg {
                what: format!("grammar prefix '{prefix}' must not contain digits"),
            });
        }
        if width == 0 || width > 9 {
            return Err(CoreError::InvalidArg {
                what: format!("grammar width {width} outside 1..=9"),
            });
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(CoreError::InvalidArg {
                what: format!("grammar scale {scale} must be positive"),
            });
        }
        Ok(Self {
            prefix,
            width,
            scale,
        })
    }

    /// Grammar with the usual `/100` scale.
    pub fn percent(prefix: impl Into<String>, width: usize) -> CoreResult<Self> {
        Self::new(prefix, width, 100.0)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns the encoded value, or `None` when `name` is not a match.
    pub fn parse(&self, name: &str) -> Option<f64> {
        let digits = name.strip_prefix(self.prefix.as_str())?;
        if digits.len() != self.width || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let n: u64 = digits.parse().ok()?;
        Some(n as f64 / self.scale)
    }

    /// Like [`parse`](Self::parse) but reports the mismatch.
    pub fn try_parse(&self, name: &str) -> CoreResult<f64> {
        self.parse(name).ok_or_else(|| CoreError::GrammarMismatch {
            name: name.to_string(),
            grammar: self.to_string(),
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.parse(name).is_some()
    }

    /// Encode a value back into a directory name (`0.30` -> `h030`).
    pub fn format(&self, value: f64) -> CoreResult<String> {
        let scaled = (value * self.scale).round();
        let limit = 10f64.powi(self.width as i32);
        if !scaled.is_finite() || scaled < 0.0 || scaled >= limit {
            return Err(CoreError::Unencodable {
                value,
                grammar: self.to_string(),
            });
        }
        Ok(format!(
            "{}{:0width$}",
            self.prefix,
            scaled as u64,
            width = self.width
        ))
    }
}

impl fmt::Display for DirGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} (/{})",
            self.prefix,
            "#".repeat(self.width),
            self.scale
        )
    }
}
