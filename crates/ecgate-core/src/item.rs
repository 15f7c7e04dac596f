//! Usable database entries: a note, its parsed tags and an effect list

use crate::{EffectDef, EffectIndex, ItemId, Meta};
use serde::{Deserialize, Serialize};

/// A skill, item or state as loaded from the host database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    /// Free-text note written by designers
    #[serde(default)]
    pub note: String,
    /// Tags parsed from `note`; rebuilt by [`ItemDef::refresh_meta`]
    #[serde(skip)]
    pub meta: Meta,
    #[serde(default)]
    pub effects: Vec<EffectDef>,
}

impl ItemDef {
    /// Create an entry and parse its note
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        note: impl Into<String>,
        effects: Vec<EffectDef>,
    ) -> Self {
        let note = note.into();
        Self {
            id,
            name: name.into(),
            meta: Meta::parse(&note),
            note,
            effects,
        }
    }

    /// Re-parse `note` into `meta`
    pub fn refresh_meta(&mut self) {
        self.meta = Meta::parse(&self.note);
    }

    /// 1-based position of `effect` in this entry's list
    ///
    /// Matching is by identity: an equal effect that does not live in
    /// `self.effects` resolves to [`EffectIndex::NONE`].
    pub fn effect_index(&self, effect: &EffectDef) -> EffectIndex {
        self.effects
            .iter()
            .position(|e| std::ptr::eq(e, effect))
            .map(EffectIndex::from_position)
            .unwrap_or(EffectIndex::NONE)
    }

    /// Effects the host runs in its global pass, with their indices
    pub fn common_events(&self) -> impl Iterator<Item = (EffectIndex, &EffectDef)> {
        self.effects
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_common_event())
            .map(|(i, e)| (EffectIndex::from_position(i), e))
    }
}
