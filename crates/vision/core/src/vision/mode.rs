use std::collections::BTreeMap;

use crate::error::VisionError;

/// Stable identifier of a vision mode.
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
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[strum(serialize_all = "camelCase")]
pub enum VisionModeId {
    #[default]
    Basic,
    Darkvision,
    DevilsSight,
    Monochromatic,
    LightAmplification,
    /// Active while blinded without blindsight.
    Blindness,
    /// Active while blinded with blindsight.
    Tremorsense,
    /// A mode id this crate does not recognise. Never registered, so a
    /// source configured with it renders with basic vision.
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

/// Shader uniforms the renderer applies to the whole canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CanvasUniforms {
    pub enable: bool,
    pub contrast: f64,
    pub saturation: f64,
    pub brightness: f64,
}

/// Per-token display parameters a mode imposes when selected.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisionDefaults {
    pub contrast: f64,
    pub saturation: f64,
    pub brightness: f64,
    pub range: Option<f64>,
}

/// Everything the host's rendering pipeline needs to know about a mode.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisionModeDefinition {
    pub id: VisionModeId,
    pub label: String,
    pub canvas: CanvasUniforms,
    pub defaults: VisionDefaults,
    /// Background lighting must be visible for this mode.
    pub background_required: bool,
    /// Darkness adapts to the mode instead of hiding everything.
    pub adaptive_darkness: bool,
}

impl VisionModeDefinition {
    fn new(id: VisionModeId, label: &str) -> Self {
        Self {
            id,
            label: label.to_owned(),
            canvas: CanvasUniforms::default(),
            defaults: VisionDefaults::default(),
            background_required: false,
            adaptive_darkness: false,
        }
    }
}

/// Vision mode definitions by id, exposed to the host renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct VisionModeRegistry {
    modes: BTreeMap<VisionModeId, VisionModeDefinition>,
}

impl VisionModeRegistry {
    pub fn empty() -> Self {
        Self {
            modes: BTreeMap::new(),
        }
    }

    /// The modes sense linking relies on, with their fixed display constants.
    pub fn standard() -> Self {
        let mut registry = Self::empty();

        registry.register(VisionModeDefinition::new(VisionModeId::Basic, "Basic Vision"));

        registry.register(VisionModeDefinition {
            canvas: CanvasUniforms {
                enable: true,
                contrast: 0.0,
                saturation: -1.0,
                brightness: 0.0,
            },
            defaults: VisionDefaults {
                contrast: 0.0,
                saturation: -1.0,
                brightness: 0.65,
                range: None,
            },
            background_required: true,
            adaptive_darkness: true,
            ..VisionModeDefinition::new(VisionModeId::Darkvision, "Darkvision")
        });

        registry.register(VisionModeDefinition {
            canvas: CanvasUniforms {
                enable: true,
                contrast: 0.0,
                saturation: 0.0,
                brightness: 0.0,
            },
            defaults: VisionDefaults {
                contrast: 0.0,
                saturation: 0.0,
                brightness: 0.65,
                range: Some(120.0),
            },
            background_required: true,
            adaptive_darkness: true,
            ..VisionModeDefinition::new(VisionModeId::DevilsSight, "Devil's Sight")
        });

        registry.register(VisionModeDefinition {
            canvas: CanvasUniforms {
                enable: true,
                contrast: 0.0,
                saturation: -1.0,
                brightness: 0.0,
            },
            defaults: VisionDefaults {
                saturation: -1.0,
                ..VisionDefaults::default()
            },
            background_required: true,
            ..VisionModeDefinition::new(VisionModeId::Monochromatic, "Monochromatic")
        });

        registry.register(VisionModeDefinition {
            canvas: CanvasUniforms {
                enable: true,
                contrast: 0.0,
                saturation: -0.5,
                brightness: 0.25,
            },
            defaults: VisionDefaults {
                contrast: 0.0,
                saturation: -0.5,
                brightness: 0.33,
                range: None,
            },
            background_required: true,
            adaptive_darkness: true,
            ..VisionModeDefinition::new(VisionModeId::LightAmplification, "Light Amplification")
        });

        registry.register(VisionModeDefinition {
            canvas: CanvasUniforms {
                enable: true,
                contrast: 0.0,
                saturation: -1.0,
                brightness: -1.0,
            },
            ..VisionModeDefinition::new(VisionModeId::Blindness, "Blindness")
        });

        registry.register(VisionModeDefinition {
            canvas: CanvasUniforms {
                enable: true,
                contrast: 0.0,
                saturation: -0.8,
                brightness: -0.3,
            },
            defaults: VisionDefaults {
                contrast: 0.0,
                saturation: -0.8,
                brightness: 0.0,
                range: None,
            },
            background_required: true,
            ..VisionModeDefinition::new(VisionModeId::Tremorsense, "Tremorsense")
        });

        registry
    }

    /// Adds or replaces a definition.
    pub fn register(&mut self, definition: VisionModeDefinition) {
        self.modes.insert(definition.id, definition);
    }

    pub fn unregister(&mut self, id: VisionModeId) -> Option<VisionModeDefinition> {
        self.modes.remove(&id)
    }

    pub fn get(&self, id: VisionModeId) -> Option<&VisionModeDefinition> {
        self.modes.get(&id)
    }

    pub fn contains(&self, id: VisionModeId) -> bool {
        self.modes.contains_key(&id)
    }

    /// Looks up a definition the caller cannot proceed without.
    ///
    /// `token` and `character` only label the diagnostic.
    pub fn require(
        &self,
        id: VisionModeId,
        token: &str,
        character: &str,
    ) -> Result<&VisionModeDefinition, VisionError> {
        self.get(id).ok_or_else(|| VisionError::UnknownVisionMode {
            mode: id,
            token: token.to_owned(),
            character: character.to_owned(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &VisionModeDefinition> {
        self.modes.values()
    }
}

impl Default for VisionModeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
