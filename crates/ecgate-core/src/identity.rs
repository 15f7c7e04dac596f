//! Identity types for database entries and effect slots

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a usable database entry (skill, item, state)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl ItemId {
    /// Create a new item ID
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item:{}", self.0)
    }
}

/// 1-based position of an effect inside its owning entry's effect list
///
/// Index 0 means "not found" and matches no annotation. Indices follow list
/// order, so editing the list shifts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectIndex(pub usize);

impl EffectIndex {
    /// The index given to effects that are not part of the list
    pub const NONE: EffectIndex = EffectIndex(0);

    /// Build the index for the effect at `position` (0-based) in a list
    pub fn from_position(position: usize) -> Self {
        Self(position + 1)
    }

    /// Whether this index refers to a real list slot
    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    /// Get the raw 1-based index
    pub fn raw(&self) -> usize {
        self.0
    }
}

impl fmt::Display for EffectIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id() {
        let id = ItemId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "item:42");
    }

    #[test]
    fn test_effect_index() {
        assert_eq!(EffectIndex::from_position(0), EffectIndex(1));
        assert!(EffectIndex::NONE.is_none());
        assert_eq!(EffectIndex(3).to_string(), "3");
    }
}
