//! Device identifiers.

/// A globally unique, totally ordered device identifier.
///
/// The identifier doubles as the default election value (lower wins) and as
/// the parent reference inside spanning-tree keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DeviceId(pub u64);

impl DeviceId {
    /// Create a new identifier.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw numeric value.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Position of this device in an id-indexed arena.
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u64> for DeviceId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
