use std::collections::BTreeMap;

use super::common::{CharacterId, UserId};
use super::status::{StatusEffect, StatusId};

/// Kind of character record, as defined by the host game system.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
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
pub enum CharacterCategory {
    /// Player character.
    #[default]
    Character,
    Npc,
    Vehicle,
    Group,
}

/// Permission a user holds on a character. Ordered from least to most.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OwnershipLevel {
    #[default]
    None,
    Limited,
    Observer,
    Owner,
}

/// The user on whose behalf synchronization runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewer {
    pub id: UserId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_gm: bool,
}

impl Viewer {
    pub const fn player(id: UserId) -> Self {
        Self { id, is_gm: false }
    }

    pub const fn gamemaster(id: UserId) -> Self {
        Self { id, is_gm: true }
    }
}

/// A sense value as it arrives from character data.
///
/// Sheets store senses loosely; anything other than a finite positive number
/// simply does not count.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum SenseValue {
    Number(f64),
    Flag(bool),
    Text(String),
    /// Null, or a shape no sheet should hold (lists, tables).
    Missing,
}

/// Wire form of [`SenseValue`]; accepts any shape so one odd entry never
/// rejects the whole character.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RawSenseValue {
    Number(f64),
    Flag(bool),
    Text(String),
    Missing,
    Malformed(serde::de::IgnoredAny),
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SenseValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <RawSenseValue as serde::Deserialize>::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(feature = "serde")]
impl From<RawSenseValue> for SenseValue {
    fn from(raw: RawSenseValue) -> Self {
        match raw {
            RawSenseValue::Number(range) => Self::Number(range),
            RawSenseValue::Flag(flag) => Self::Flag(flag),
            RawSenseValue::Text(text) => Self::Text(text),
            RawSenseValue::Missing | RawSenseValue::Malformed(_) => Self::Missing,
        }
    }
}

impl SenseValue {
    /// Returns the range if this value is a usable positive number.
    pub fn as_range(&self) -> Option<f64> {
        match *self {
            Self::Number(range) if range.is_finite() && range > 0.0 => Some(range),
            _ => None,
        }
    }
}

impl From<f64> for SenseValue {
    fn from(range: f64) -> Self {
        Self::Number(range)
    }
}

/// Character record: senses, effects and ownership.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: CharacterCategory,
    #[cfg_attr(feature = "serde", serde(default))]
    pub senses: BTreeMap<String, SenseValue>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<StatusEffect>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ownership: BTreeMap<UserId, OwnershipLevel>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub default_ownership: OwnershipLevel,
}

impl Character {
    pub fn new(id: CharacterId, name: impl Into<String>, category: CharacterCategory) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            ..Self::default()
        }
    }

    pub fn with_sense(mut self, sense: impl Into<String>, value: impl Into<SenseValue>) -> Self {
        self.senses.insert(sense.into(), value.into());
        self
    }

    pub fn with_effect(mut self, effect: StatusEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_owner(mut self, user: UserId, level: OwnershipLevel) -> Self {
        self.ownership.insert(user, level);
        self
    }

    /// Permission the viewer holds on this character. Game masters own everything.
    pub fn user_level(&self, viewer: &Viewer) -> OwnershipLevel {
        if viewer.is_gm {
            return OwnershipLevel::Owner;
        }
        self.ownership
            .get(&viewer.id)
            .copied()
            .unwrap_or(self.default_ownership)
    }

    /// Effects that are neither disabled nor suppressed.
    pub fn active_effects(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter().filter(|effect| effect.is_active())
    }

    pub fn has_status(&self, status: StatusId) -> bool {
        self.active_effects()
            .any(|effect| effect.status == Some(status))
    }

    /// Label used in diagnostics: `Name (#id)`.
    pub fn describe(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }
}
