use crate::error::VisionError;
use crate::senses::{Capability, CapabilitySet};
use crate::state::{DetectionModeId, SceneState, StatusId, TokenId};

use super::mode::{VisionModeDefinition, VisionModeId, VisionModeRegistry};

/// The single vision mode a character's tokens should use, with its range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisionSelection {
    pub mode: VisionModeId,
    pub range: f64,
}

impl VisionSelection {
    pub const BASIC: Self = Self {
        mode: VisionModeId::Basic,
        range: 0.0,
    };
}

/// Picks the vision mode by strict priority.
///
/// Devil's-sight class wins (truesight also qualifies), then darkvision,
/// then unaided basic vision at range 0. When the devil's-sight class wins
/// its range is the largest of every darkness-piercing capability present,
/// so a shorter truesight never shrinks a longer darkvision.
pub fn select_vision_mode(capabilities: &CapabilitySet) -> VisionSelection {
    let class_present = capabilities.contains(Capability::DevilsSight)
        || capabilities.contains(Capability::Truesight);

    if class_present {
        let range = [
            Capability::DevilsSight,
            Capability::Truesight,
            Capability::Darkvision,
        ]
        .into_iter()
        .filter_map(|capability| capabilities.range(capability))
        .fold(0.0, f64::max);
        return VisionSelection {
            mode: VisionModeId::DevilsSight,
            range,
        };
    }

    match capabilities.range(Capability::Darkvision) {
        Some(range) => VisionSelection {
            mode: VisionModeId::Darkvision,
            range,
        },
        None => VisionSelection::BASIC,
    }
}

/// Vision a token's vision source actually renders with right now.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveVision<'r> {
    pub mode: VisionModeId,
    pub radius: f64,
    pub definition: &'r VisionModeDefinition,
}

/// Resolves the active vision mode for a token's vision source.
///
/// A blinded token falls back to tremorsense when it has an enabled
/// blindsight entry, and to blindness (limited to its own footprint)
/// otherwise. A sighted token uses its configured mode, or basic vision when
/// that mode is not registered.
pub fn resolve_active_vision<'r>(
    registry: &'r VisionModeRegistry,
    scene: &SceneState,
    token: TokenId,
) -> Result<ActiveVision<'r>, VisionError> {
    let blinded = scene.has_status(token, StatusId::Blind);
    let source = scene
        .borrow_token(token)
        .ok_or(VisionError::TokenNotFound(token))?;

    let (mode, radius) = if blinded {
        let blindsight = source
            .detection_modes
            .iter()
            .find(|entry| entry.enabled && entry.id == DetectionModeId::Blindsight)
            .map_or(0.0, |entry| entry.range);
        if blindsight > 0.0 {
            (VisionModeId::Tremorsense, blindsight)
        } else {
            (VisionModeId::Blindness, source.external_radius)
        }
    } else if registry.contains(source.sight.vision_mode) {
        (source.sight.vision_mode, source.sight.range)
    } else {
        (VisionModeId::Basic, source.sight.range)
    };

    let character = source
        .character
        .and_then(|id| scene.borrow_character(id))
        .map_or_else(|| "none".to_owned(), |character| character.describe());
    let definition = registry.require(mode, &source.describe(), &character)?;

    Ok(ActiveVision {
        mode,
        radius,
        definition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LinkConfig;
    use crate::state::{
        Character, CharacterCategory, CharacterId, DetectionModeEntry, EffectId, SightConfig,
        StatusEffect, Token,
    };

    fn resolve(character: Character) -> VisionSelection {
        select_vision_mode(&CapabilitySet::resolve(&character, &LinkConfig::default()))
    }

    fn character() -> Character {
        Character::new(CharacterId(1), "Aria", CharacterCategory::Character)
    }

    #[test]
    fn truesight_outranks_darkvision_and_keeps_the_larger_range() {
        let selection = resolve(
            character()
                .with_sense("truesight", 30.0)
                .with_sense("darkvision", 60.0),
        );
        assert_eq!(selection.mode, VisionModeId::DevilsSight);
        assert_eq!(selection.range, 60.0);
    }

    #[test]
    fn devils_sight_and_truesight_take_the_max_range() {
        let selection = resolve(
            character()
                .with_sense("truesight", 30.0)
                .with_effect(StatusEffect::new(EffectId(1), "Devil's Sight")),
        );
        assert_eq!(selection, VisionSelection {
            mode: VisionModeId::DevilsSight,
            range: 120.0
        });

        let selection = resolve(
            character()
                .with_sense("truesight", 150.0)
                .with_effect(StatusEffect::new(EffectId(1), "Devil's Sight")),
        );
        assert_eq!(selection.range, 150.0);
    }

    #[test]
    fn darkvision_then_basic() {
        assert_eq!(
            resolve(character().with_sense("darkvision", 60.0)),
            VisionSelection {
                mode: VisionModeId::Darkvision,
                range: 60.0
            }
        );
        assert_eq!(resolve(character()), VisionSelection::BASIC);
    }

    fn scene_with(token: Token, blind: bool) -> SceneState {
        let mut character = character();
        if blind {
            character = character
                .with_effect(StatusEffect::new(EffectId(9), "Blinded").with_status(StatusId::Blind));
        }
        let mut scene = SceneState::new(true);
        scene.insert_character(character);
        scene.insert_token(token);
        scene
    }

    #[test]
    fn blinded_token_with_blindsight_uses_tremorsense() {
        let token = Token::new(TokenId(1), "Aria", Some(CharacterId(1)))
            .with_detection_mode(DetectionModeEntry::enabled(DetectionModeId::Blindsight, 15.0));
        let scene = scene_with(token, true);
        let registry = VisionModeRegistry::standard();

        let active = resolve_active_vision(&registry, &scene, TokenId(1)).unwrap();
        assert_eq!(active.mode, VisionModeId::Tremorsense);
        assert_eq!(active.radius, 15.0);
    }

    #[test]
    fn blinded_token_without_blindsight_sees_only_its_footprint() {
        let token =
            Token::new(TokenId(1), "Aria", Some(CharacterId(1))).with_external_radius(2.5);
        let scene = scene_with(token, true);
        let registry = VisionModeRegistry::standard();

        let active = resolve_active_vision(&registry, &scene, TokenId(1)).unwrap();
        assert_eq!(active.mode, VisionModeId::Blindness);
        assert_eq!(active.radius, 2.5);
    }

    #[test]
    fn unregistered_configured_mode_falls_back_to_basic() {
        let token = Token::new(TokenId(1), "Aria", Some(CharacterId(1))).with_sight(SightConfig {
            vision_mode: VisionModeId::LightAmplification,
            range: 30.0,
            ..SightConfig::default()
        });
        let scene = scene_with(token, false);
        let mut registry = VisionModeRegistry::standard();
        registry.unregister(VisionModeId::LightAmplification);

        let active = resolve_active_vision(&registry, &scene, TokenId(1)).unwrap();
        assert_eq!(active.mode, VisionModeId::Basic);
        assert_eq!(active.radius, 30.0);
    }

    #[test]
    fn unrecognised_configured_mode_loads_and_falls_back_to_basic() {
        let token: Token = serde_json::from_str(
            r#"{
                "id": 1,
                "name": "Aria",
                "sight": { "vision_mode": "lightAmplification2", "range": 45.0 }
            }"#,
        )
        .unwrap();
        assert_eq!(token.sight.vision_mode, VisionModeId::Unknown);

        let scene = scene_with(token, false);
        let registry = VisionModeRegistry::standard();
        let active = resolve_active_vision(&registry, &scene, TokenId(1)).unwrap();
        assert_eq!(active.mode, VisionModeId::Basic);
        assert_eq!(active.radius, 45.0);
    }

    #[test]
    fn missing_definition_is_reported_with_names() {
        let token = Token::new(TokenId(1), "Aria", Some(CharacterId(1)));
        let scene = scene_with(token, true);
        let mut registry = VisionModeRegistry::standard();
        registry.unregister(VisionModeId::Blindness);

        let err = resolve_active_vision(&registry, &scene, TokenId(1)).unwrap_err();
        assert_eq!(err, VisionError::UnknownVisionMode {
            mode: VisionModeId::Blindness,
            token: "Aria (#1)".into(),
            character: "Aria (#1)".into(),
        });
    }
}
