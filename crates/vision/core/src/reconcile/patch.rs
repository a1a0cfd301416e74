use bitflags::bitflags;

use crate::state::{DetectionModeEntry, Token};
use crate::vision::VisionModeId;

bitflags! {
    /// Tracks which perception fields of a token a patch rewrites.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct PatchFields: u8 {
        const VISION_MODE     = 1 << 0;
        const RANGE           = 1 << 1;
        const CONTRAST        = 1 << 2;
        const SATURATION      = 1 << 3;
        const BRIGHTNESS      = 1 << 4;
        const DETECTION_MODES = 1 << 5;
    }
}

/// Changed sight fields. `None` means "leave as is".
///
/// There is deliberately no slot for `attenuation` or `color`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SightPatch {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub vision_mode: Option<VisionModeId>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub range: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub contrast: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub saturation: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub brightness: Option<f64>,
}

impl SightPatch {
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    pub fn fields(&self) -> PatchFields {
        let mut fields = PatchFields::empty();
        fields.set(PatchFields::VISION_MODE, self.vision_mode.is_some());
        fields.set(PatchFields::RANGE, self.range.is_some());
        fields.set(PatchFields::CONTRAST, self.contrast.is_some());
        fields.set(PatchFields::SATURATION, self.saturation.is_some());
        fields.set(PatchFields::BRIGHTNESS, self.brightness.is_some());
        fields
    }
}

/// Minimal update to one token's perceptual configuration.
///
/// When present, `detection_modes` is the complete replacement list: host
/// entries preserved in place, managed entries rebuilt.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerceptionPatch {
    #[cfg_attr(feature = "serde", serde(default))]
    pub sight: SightPatch,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub detection_modes: Option<Vec<DetectionModeEntry>>,
}

impl PerceptionPatch {
    pub fn fields(&self) -> PatchFields {
        let mut fields = self.sight.fields();
        fields.set(PatchFields::DETECTION_MODES, self.detection_modes.is_some());
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Writes the patched fields into `token`.
    pub fn apply(&self, token: &mut Token) {
        let sight = &mut token.sight;
        if let Some(mode) = self.sight.vision_mode {
            sight.vision_mode = mode;
        }
        if let Some(range) = self.sight.range {
            sight.range = range;
        }
        if let Some(contrast) = self.sight.contrast {
            sight.contrast = contrast;
        }
        if let Some(saturation) = self.sight.saturation {
            sight.saturation = saturation;
        }
        if let Some(brightness) = self.sight.brightness {
            sight.brightness = brightness;
        }
        if let Some(modes) = &self.detection_modes {
            token.detection_modes = modes.clone();
        }
    }
}
