use core::fmt;

/// Index of one annealing stage.
///
/// Stage directories are named with exactly three decimal digits
/// (`000`, `001`, ...), so valid indices are `0..=999`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StageId(u16);

impl StageId {
    pub const MAX: u16 = 999;

    pub fn new(index: u16) -> Option<Self> {
        (index <= Self::MAX).then_some(Self(index))
    }

    /// Parse a stage directory name. Anything other than three ASCII
    /// digits is rejected.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        if name.len() != 3 || !name.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        name.parse().ok().map(Self)
    }

    pub fn index(self) -> u16 {
        self.0
    }

    pub fn dir_name(self) -> String {
        format!("{:03}", self.0)
    }
}

impl fmt::Debug for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StageId({:03})", self.0)
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
