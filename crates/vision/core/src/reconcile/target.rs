use std::collections::BTreeMap;

use crate::error::VisionError;
use crate::senses::CapabilitySet;
use crate::state::{DetectionModeEntry, DetectionModeId, Token};
use crate::vision::{VisionModeId, VisionModeRegistry, select_vision_mode};

use super::patch::{PerceptionPatch, SightPatch};

/// Perceptual configuration every token of a character should converge to.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetPerception {
    pub vision_mode: VisionModeId,
    pub range: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub brightness: f64,
    /// Managed entries only, in capability order.
    pub detection_modes: Vec<DetectionModeEntry>,
}

impl TargetPerception {
    /// Derives the target from resolved capabilities.
    ///
    /// Display parameters come from the selected mode's definition; a missing
    /// definition is reported against `token` and `character`.
    pub fn build(
        capabilities: &CapabilitySet,
        registry: &VisionModeRegistry,
        token: &str,
        character: &str,
    ) -> Result<Self, VisionError> {
        let selection = select_vision_mode(capabilities);
        let defaults = registry.require(selection.mode, token, character)?.defaults;

        Ok(Self {
            vision_mode: selection.mode,
            range: selection.range,
            contrast: defaults.contrast,
            saturation: defaults.saturation,
            brightness: defaults.brightness,
            detection_modes: capabilities.detection_entries(),
        })
    }
}

/// Diffs a token against its target and returns the minimal patch, if any.
///
/// Managed detection entries compare as a set keyed by id. When they differ
/// the replacement list keeps host entries where they are and appends the
/// target entries after them.
pub fn reconcile_token(target: &TargetPerception, token: &Token) -> Option<PerceptionPatch> {
    let sight = &token.sight;
    let changed = |current: f64, wanted: f64| (current != wanted).then_some(wanted);

    let sight_patch = SightPatch {
        vision_mode: (sight.vision_mode != target.vision_mode).then_some(target.vision_mode),
        range: changed(sight.range, target.range),
        contrast: changed(sight.contrast, target.contrast),
        saturation: changed(sight.saturation, target.saturation),
        brightness: changed(sight.brightness, target.brightness),
    };

    let detection_modes = (!managed_entries_match(&token.detection_modes, &target.detection_modes))
        .then(|| {
            token
                .detection_modes
                .iter()
                .filter(|entry| !entry.id.is_managed())
                .chain(&target.detection_modes)
                .cloned()
                .collect()
        });

    let patch = PerceptionPatch {
        sight: sight_patch,
        detection_modes,
    };
    (!patch.is_empty()).then_some(patch)
}

fn managed_entries_match(current: &[DetectionModeEntry], target: &[DetectionModeEntry]) -> bool {
    let managed: Vec<_> = current.iter().filter(|entry| entry.id.is_managed()).collect();
    let by_id: BTreeMap<&DetectionModeId, &DetectionModeEntry> =
        managed.iter().map(|&entry| (&entry.id, entry)).collect();

    // Duplicate managed ids never match a target, which holds one entry per id.
    managed.len() == target.len()
        && by_id.len() == managed.len()
        && target
            .iter()
            .all(|wanted| by_id.get(&wanted.id).is_some_and(|entry| *entry == wanted))
}
