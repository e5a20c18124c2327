use serde::Serialize;

/// Stable index of a voyage within a prepared dataset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct VoyageId(u32);

impl VoyageId {
    pub const fn new(index: u32) -> Self {
        VoyageId(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for VoyageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "voyage#{}", self.0)
    }
}
