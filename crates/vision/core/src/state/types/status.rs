//! Status effects carried by characters.
//!
//! An effect may be present but inert: disabled by the user, or suppressed
//! by the rules (e.g. an unequipped item's effect). Only effects that are
//! neither contribute to senses or count as a status.

use super::common::EffectId;

/// Core statuses the detection modes care about.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StatusId {
    Blind,
    Deaf,
    Invisible,
}

/// Buffs that change which senses a character has.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SenseEffect {
    /// See normally in magical and nonmagical darkness.
    DevilsSight,
    /// See invisible creatures.
    SeeInvisibility,
    /// Blindsight becomes sound-based.
    Echolocation,
}

/// A single effect on a character.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub id: EffectId,
    pub label: String,
    /// Core status this effect represents, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: Option<StatusId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub disabled: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub suppressed: bool,
}

impl StatusEffect {
    pub fn new(id: EffectId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            status: None,
            disabled: false,
            suppressed: false,
        }
    }

    pub fn with_status(mut self, status: StatusId) -> Self {
        self.status = Some(status);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn suppressed(mut self) -> Self {
        self.suppressed = true;
        self
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        !self.disabled && !self.suppressed
    }
}
