use std::collections::BTreeMap;

use crate::state::{DetectionModeEntry, DetectionModeId};

/// A perceptual capability a character can have.
///
/// Declaration order is the order detection entries are emitted in.
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
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[strum(serialize_all = "camelCase")]
pub enum Capability {
    DevilsSight,
    Truesight,
    SeeInvisibility,
    Darkvision,
    Blindsight,
    Echolocation,
    Tremorsense,
}

impl Capability {
    /// Senses read straight off the character sheet.
    pub const SENSES: [Self; 4] = [
        Self::Darkvision,
        Self::Blindsight,
        Self::Tremorsense,
        Self::Truesight,
    ];

    /// Sheet key for capabilities that come from a sense attribute.
    pub fn sense_key(self) -> Option<&'static str> {
        match self {
            Self::Darkvision => Some("darkvision"),
            Self::Blindsight => Some("blindsight"),
            Self::Tremorsense => Some("tremorsense"),
            Self::Truesight => Some("truesight"),
            Self::DevilsSight | Self::SeeInvisibility | Self::Echolocation => None,
        }
    }

    /// Detection mode granted by this capability. Darkvision is purely a
    /// vision mode and grants none.
    pub fn detection_mode(self) -> Option<DetectionModeId> {
        match self {
            Self::DevilsSight => Some(DetectionModeId::DevilsSight),
            Self::Truesight => Some(DetectionModeId::SeeAll),
            Self::SeeInvisibility => Some(DetectionModeId::SeeInvisibility),
            Self::Blindsight => Some(DetectionModeId::Blindsight),
            Self::Echolocation => Some(DetectionModeId::Echolocation),
            Self::Tremorsense => Some(DetectionModeId::FeelTremor),
            Self::Darkvision => None,
        }
    }
}

/// Resolved capabilities of one character, keyed by capability.
///
/// Built fresh for every resolution and never mutated once handed out.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CapabilitySet {
    ranges: BTreeMap<Capability, f64>,
}

impl CapabilitySet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, capability: Capability, range: f64) {
        self.ranges.insert(capability, range);
    }

    pub(crate) fn remove(&mut self, capability: Capability) -> Option<f64> {
        self.ranges.remove(&capability)
    }

    pub fn range(&self, capability: Capability) -> Option<f64> {
        self.ranges.get(&capability).copied()
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.ranges.contains_key(&capability)
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Capability, f64)> + '_ {
        self.ranges.iter().map(|(capability, range)| (*capability, *range))
    }

    /// One enabled detection entry per capability that maps to a mode.
    pub fn detection_entries(&self) -> Vec<DetectionModeEntry> {
        self.iter()
            .filter_map(|(capability, range)| {
                capability
                    .detection_mode()
                    .map(|id| DetectionModeEntry::enabled(id, range))
            })
            .collect()
    }
}

impl FromIterator<(Capability, f64)> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = (Capability, f64)>>(iter: I) -> Self {
        Self {
            ranges: iter.into_iter().collect(),
        }
    }
}
