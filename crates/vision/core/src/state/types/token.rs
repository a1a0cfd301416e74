//! Tokens and their persisted perceptual configuration.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use super::common::{CharacterId, Point, TokenId};
use super::status::StatusId;
use crate::vision::VisionModeId;

/// Stable identifier of a detection mode.
///
/// Hosts may configure modes this crate knows nothing about; their ids are
/// kept verbatim in [`DetectionModeId::Host`] so the entries survive
/// reconciliation and serialize back unchanged.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DetectionModeId {
    BasicSight,
    DevilsSight,
    SeeAll,
    SeeInvisibility,
    Blindsight,
    Echolocation,
    FeelTremor,
    /// Host-provided; never written by the reconciler.
    Hearing,
    /// Host-provided; never written by the reconciler.
    SenseInvisibility,
    /// Any other host-authored mode.
    Host(String),
}

impl DetectionModeId {
    /// Ids owned by sense linking. Entries with any other id belong to the
    /// host and are left alone.
    pub const MANAGED: [Self; 6] = [
        Self::DevilsSight,
        Self::SeeAll,
        Self::SeeInvisibility,
        Self::Blindsight,
        Self::Echolocation,
        Self::FeelTremor,
    ];

    const KNOWN: [Self; 9] = [
        Self::BasicSight,
        Self::DevilsSight,
        Self::SeeAll,
        Self::SeeInvisibility,
        Self::Blindsight,
        Self::Echolocation,
        Self::FeelTremor,
        Self::Hearing,
        Self::SenseInvisibility,
    ];

    pub fn is_managed(&self) -> bool {
        Self::MANAGED.contains(self)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::BasicSight => "basicSight",
            Self::DevilsSight => "devilsSight",
            Self::SeeAll => "seeAll",
            Self::SeeInvisibility => "seeInvisibility",
            Self::Blindsight => "blindsight",
            Self::Echolocation => "echolocation",
            Self::FeelTremor => "feelTremor",
            Self::Hearing => "hearing",
            Self::SenseInvisibility => "senseInvisibility",
            Self::Host(id) => id,
        }
    }
}

impl From<&str> for DetectionModeId {
    fn from(id: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|known| known.as_str() == id)
            .unwrap_or_else(|| Self::Host(id.to_owned()))
    }
}

impl FromStr for DetectionModeId {
    type Err = Infallible;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(id))
    }
}

impl AsRef<str> for DetectionModeId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DetectionModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for DetectionModeId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for DetectionModeId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl serde::de::Visitor<'_> for IdVisitor {
            type Value = DetectionModeId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a detection mode id")
            }

            fn visit_str<E: serde::de::Error>(self, id: &str) -> Result<Self::Value, E> {
                Ok(DetectionModeId::from(id))
            }
        }

        // Identifiers cover both bare RON names and JSON strings.
        deserializer.deserialize_identifier(IdVisitor)
    }
}

/// One detection mode configured on a token.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectionModeEntry {
    pub id: DetectionModeId,
    pub enabled: bool,
    pub range: f64,
}

impl DetectionModeEntry {
    pub const fn enabled(id: DetectionModeId, range: f64) -> Self {
        Self {
            id,
            enabled: true,
            range,
        }
    }
}

/// Sight settings persisted on a token.
///
/// `attenuation` and `color` are user-authored tint settings: the reconciler
/// reads neither and never writes them.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SightConfig {
    pub enabled: bool,
    pub vision_mode: VisionModeId,
    pub range: f64,
    /// Cone width in degrees; 360 means all around.
    pub angle: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub brightness: f64,
    pub attenuation: f64,
    pub color: Option<String>,
}

impl Default for SightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            vision_mode: VisionModeId::Basic,
            range: 0.0,
            angle: 360.0,
            contrast: 0.0,
            saturation: 0.0,
            brightness: 0.0,
            attenuation: 0.1,
            color: None,
        }
    }
}

/// A placement of a character (or an unlinked figure) in the scene.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub id: TokenId,
    pub name: String,
    /// Owning character; `None` for unlinked tokens.
    #[cfg_attr(feature = "serde", serde(default))]
    pub character: Option<CharacterId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub position: Point,
    /// Facing in degrees; 0 faces down the y axis.
    #[cfg_attr(feature = "serde", serde(default))]
    pub rotation: f64,
    /// Radius of the token's own footprint; points inside it bypass facing.
    #[cfg_attr(feature = "serde", serde(default))]
    pub external_radius: f64,
    /// Status markers on tokens that have no character behind them.
    #[cfg_attr(feature = "serde", serde(default))]
    pub statuses: Vec<StatusId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sight: SightConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub detection_modes: Vec<DetectionModeEntry>,
}

impl Token {
    pub fn new(id: TokenId, name: impl Into<String>, character: Option<CharacterId>) -> Self {
        Self {
            id,
            name: name.into(),
            character,
            ..Self::default()
        }
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn facing(mut self, rotation: f64, angle: f64) -> Self {
        self.rotation = rotation;
        self.sight.angle = angle;
        self
    }

    pub fn with_external_radius(mut self, radius: f64) -> Self {
        self.external_radius = radius;
        self
    }

    pub fn with_status(mut self, status: StatusId) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn with_detection_mode(mut self, entry: DetectionModeEntry) -> Self {
        self.detection_modes.push(entry);
        self
    }

    pub fn with_sight(mut self, sight: SightConfig) -> Self {
        self.sight = sight;
        self
    }

    pub fn detection_mode(&self, id: &DetectionModeId) -> Option<&DetectionModeEntry> {
        self.detection_modes.iter().find(|entry| entry.id == *id)
    }

    /// Label used in diagnostics: `Name (#id)`.
    pub fn describe(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }
}
