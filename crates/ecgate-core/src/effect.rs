//! Effect descriptors attached to skills, items and states
//!
//! Effects are owned by the host database and are read-only here. The gate
//! only distinguishes one kind, [`EffectKind::CommonEvent`], which the host
//! runs in its target-independent global pass.

use serde::{Deserialize, Serialize};

/// Kind of an effect, mirroring the host's effect codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Recover HP (code 11)
    RecoverHp,
    /// Recover MP (code 12)
    RecoverMp,
    /// Gain TP (code 13)
    GainTp,
    /// Add a state (code 21)
    AddState,
    /// Remove a state (code 22)
    RemoveState,
    /// Add a buff (code 31)
    AddBuff,
    /// Add a debuff (code 32)
    AddDebuff,
    /// Remove a buff (code 33)
    RemoveBuff,
    /// Remove a debuff (code 34)
    RemoveDebuff,
    /// Special effect such as escape (code 41)
    Special,
    /// Permanent parameter growth (code 42)
    Grow,
    /// Learn a skill (code 43)
    LearnSkill,
    /// Reserve a common event (code 44)
    CommonEvent,
}

impl EffectKind {
    /// The host's numeric code for this kind
    pub fn code(&self) -> u32 {
        match self {
            EffectKind::RecoverHp => 11,
            EffectKind::RecoverMp => 12,
            EffectKind::GainTp => 13,
            EffectKind::AddState => 21,
            EffectKind::RemoveState => 22,
            EffectKind::AddBuff => 31,
            EffectKind::AddDebuff => 32,
            EffectKind::RemoveBuff => 33,
            EffectKind::RemoveDebuff => 34,
            EffectKind::Special => 41,
            EffectKind::Grow => 42,
            EffectKind::LearnSkill => 43,
            EffectKind::CommonEvent => 44,
        }
    }

    /// Look up a kind by the host's numeric code
    pub fn from_code(code: u32) -> Option<Self> {
        let kind = match code {
            11 => EffectKind::RecoverHp,
            12 => EffectKind::RecoverMp,
            13 => EffectKind::GainTp,
            21 => EffectKind::AddState,
            22 => EffectKind::RemoveState,
            31 => EffectKind::AddBuff,
            32 => EffectKind::AddDebuff,
            33 => EffectKind::RemoveBuff,
            34 => EffectKind::RemoveDebuff,
            41 => EffectKind::Special,
            42 => EffectKind::Grow,
            43 => EffectKind::LearnSkill,
            44 => EffectKind::CommonEvent,
            _ => return None,
        };
        Some(kind)
    }
}

/// One atomic outcome inside an entry's effect list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDef {
    /// What the effect does
    pub kind: EffectKind,
    /// State, parameter, skill or common event id, depending on the kind
    #[serde(default)]
    pub data_id: u32,
    /// First numeric argument (rate for recoveries, chance for states)
    #[serde(default)]
    pub value1: f64,
    /// Second numeric argument (flat amount for recoveries)
    #[serde(default)]
    pub value2: f64,
}

impl EffectDef {
    /// Create an effect with no arguments
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            data_id: 0,
            value1: 0.0,
            value2: 0.0,
        }
    }

    /// Create a common event effect
    pub fn common_event(event_id: u32) -> Self {
        Self {
            data_id: event_id,
            ..Self::new(EffectKind::CommonEvent)
        }
    }

    /// Create an HP recovery effect
    pub fn recover_hp(rate: f64, amount: f64) -> Self {
        Self {
            value1: rate,
            value2: amount,
            ..Self::new(EffectKind::RecoverHp)
        }
    }

    /// Create an add-state effect
    pub fn add_state(state_id: u32, chance: f64) -> Self {
        Self {
            data_id: state_id,
            value1: chance,
            ..Self::new(EffectKind::AddState)
        }
    }

    /// Whether the host runs this effect in its global pass
    pub fn is_common_event(&self) -> bool {
        self.kind == EffectKind::CommonEvent
    }
}
