//! Temporary suppression of invisibility and non-sight senses.
//!
//! See-invisibility asks "would plain sight find this target if it were not
//! invisible?". The host's visibility test answers plain-sight questions but
//! consults every detection mode on the observer, including see-invisibility
//! itself. [`SuppressionGuard`] strips the observer down to its sight-type
//! entries and lifts the target's invisibility for the duration of one host
//! call, and puts both back when dropped.

use tracing::trace;

use crate::error::VisionError;
use crate::host::VisibilityQuery;
use crate::state::{
    CharacterId, DetectionModeEntry, EffectId, Point, SceneState, StatusId, TokenId,
};

use super::{DetectionContext, DetectionRegistry, DetectionType};

/// Records exactly what was suppressed and restores it on drop.
///
/// Each step is recorded as soon as it is applied, so a guard dropped halfway
/// through acquisition restores only what it changed. Nested guards stack:
/// an inner guard snapshots the already-suppressed state and restores that.
#[must_use = "suppression ends when the guard is dropped"]
pub struct SuppressionGuard<'s> {
    scene: &'s SceneState,
    observer: TokenId,
    target: TokenId,
    saved_modes: Option<Vec<DetectionModeEntry>>,
    disabled_effects: Option<(CharacterId, Vec<EffectId>)>,
    saved_statuses: Option<Vec<StatusId>>,
}

impl<'s> SuppressionGuard<'s> {
    pub fn acquire(
        scene: &'s SceneState,
        registry: &DetectionRegistry,
        observer: TokenId,
        target: TokenId,
    ) -> Self {
        let mut guard = Self {
            scene,
            observer,
            target,
            saved_modes: None,
            disabled_effects: None,
            saved_statuses: None,
        };
        guard.suppress_senses(registry);
        guard.suppress_invisibility();
        guard
    }

    fn suppress_senses(&mut self, registry: &DetectionRegistry) {
        self.saved_modes = self.scene.update_token(self.observer, |token| {
            let sight_only = token
                .detection_modes
                .iter()
                .filter(|entry| registry.detection_type(&entry.id) == Some(DetectionType::Sight))
                .cloned()
                .collect();
            std::mem::replace(&mut token.detection_modes, sight_only)
        });
    }

    fn suppress_invisibility(&mut self) {
        let backing = self
            .scene
            .borrow_token(self.target)
            .and_then(|token| token.character);

        if let Some(character) = backing
            && let Some(disabled) = self.scene.update_character(character, |character| {
                let mut disabled = Vec::new();
                for effect in character.effects.iter_mut() {
                    if effect.is_active() && effect.status == Some(StatusId::Invisible) {
                        effect.disabled = true;
                        disabled.push(effect.id);
                    }
                }
                disabled
            })
        {
            self.disabled_effects = Some((character, disabled));
            return;
        }

        self.saved_statuses = self.scene.update_token(self.target, |token| {
            let saved = token.statuses.clone();
            token.statuses.retain(|status| *status != StatusId::Invisible);
            saved
        });
    }

    fn restore(&mut self) {
        if let Some(modes) = self.saved_modes.take() {
            self.scene
                .update_token(self.observer, |token| token.detection_modes = modes);
        }

        if let Some((character, disabled)) = self.disabled_effects.take() {
            self.scene.update_character(character, |character| {
                for effect in character.effects.iter_mut() {
                    if disabled.contains(&effect.id) {
                        effect.disabled = false;
                    }
                }
            });
        }

        if let Some(statuses) = self.saved_statuses.take() {
            self.scene
                .update_token(self.target, |token| token.statuses = statuses);
        }
    }
}

impl Drop for SuppressionGuard<'_> {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Host visibility of `point` with the target's invisibility lifted and the
/// observer limited to sight-type detection.
///
/// Scene state is restored before this returns, whether the host succeeded,
/// failed or re-entered another probe.
pub fn probe_visibility(
    ctx: &DetectionContext<'_>,
    observer: TokenId,
    target: TokenId,
    point: Point,
) -> Result<bool, VisionError> {
    let _guard = SuppressionGuard::acquire(ctx.scene, ctx.registry, observer, target);
    trace!(%observer, %target, "probing visibility under suppression");

    let visible = ctx.host.test_visibility(
        point,
        VisibilityQuery {
            tolerance: 0.0,
            object: Some(target),
        },
    )?;
    Ok(visible)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::detection::testing::ScriptedHost;
    use crate::detection::{ObserverView, TargetView};
    use crate::state::{
        Character, CharacterCategory, DetectionModeId, StatusEffect, Token,
    };

    const OBSERVER: TokenId = TokenId(1);
    const TARGET: TokenId = TokenId(2);

    fn observer() -> Token {
        Token::new(OBSERVER, "Seer", None)
            .with_detection_mode(DetectionModeEntry::enabled(DetectionModeId::BasicSight, 60.0))
            .with_detection_mode(DetectionModeEntry::enabled(DetectionModeId::SeeInvisibility, 60.0))
            .with_detection_mode(DetectionModeEntry::enabled(DetectionModeId::Blindsight, 10.0))
            .with_detection_mode(DetectionModeEntry::enabled(DetectionModeId::Hearing, 30.0))
    }

    /// Scene with an unbacked, transiently invisible target.
    fn transient_scene() -> SceneState {
        let mut scene = SceneState::new(true);
        scene.insert_token(observer());
        scene.insert_token(
            Token::new(TARGET, "Wisp", None)
                .at(Point::new(0.0, 10.0))
                .with_status(StatusId::Invisible),
        );
        scene
    }

    /// Scene whose target's invisibility comes from a character effect.
    fn backed_scene() -> SceneState {
        let mut scene = SceneState::new(true);
        scene.insert_token(observer());
        scene.insert_character(
            Character::new(CharacterId(7), "Shade", CharacterCategory::Npc)
                .with_effect(
                    StatusEffect::new(EffectId(1), "Invisibility").with_status(StatusId::Invisible),
                )
                .with_effect(
                    StatusEffect::new(EffectId(2), "Greater Invisibility")
                        .with_status(StatusId::Invisible)
                        .disabled(),
                ),
        );
        scene.insert_token(Token::new(TARGET, "Shade", Some(CharacterId(7))).at(Point::new(0.0, 10.0)));
        scene
    }

    fn probe(scene: &SceneState, host: &ScriptedHost<'_>) -> Result<bool, VisionError> {
        let registry = DetectionRegistry::standard();
        let ctx = DetectionContext::new(scene, host, &registry);
        probe_visibility(&ctx, OBSERVER, TARGET, Point::new(0.0, 10.0))
    }

    fn observer_ids(scene: &SceneState) -> Vec<DetectionModeId> {
        scene
            .borrow_token(OBSERVER)
            .unwrap()
            .detection_modes
            .iter()
            .map(|entry| entry.id.clone())
            .collect()
    }

    #[test]
    fn state_is_suppressed_during_the_host_call() {
        let scene = transient_scene();
        let seen = Cell::new(None);
        let host = ScriptedHost::open();
        *host.on_visibility.borrow_mut() = Some(Box::new(|| {
            seen.set(Some((
                observer_ids(&scene),
                scene.has_status(TARGET, StatusId::Invisible),
            )));
        }));

        assert!(probe(&scene, &host).unwrap());
        let (modes, invisible) = seen.take().unwrap();
        // Blindsight is not sight-based, hearing is not registered.
        assert_eq!(modes, vec![
            DetectionModeId::BasicSight,
            DetectionModeId::SeeInvisibility
        ]);
        assert!(!invisible);
    }

    #[test]
    fn transient_marker_survives_any_outcome() {
        let before = transient_scene().snapshot();

        for host in [
            ScriptedHost::open(),
            ScriptedHost {
                visible: false,
                ..ScriptedHost::default()
            },
            ScriptedHost {
                fail: true,
                ..ScriptedHost::default()
            },
        ] {
            let scene = transient_scene();
            let _ = probe(&scene, &host);
            assert!(scene.has_status(TARGET, StatusId::Invisible));
            assert_eq!(scene.snapshot(), before);
        }
    }

    #[test]
    fn backed_effects_are_re_enabled_after_host_error() {
        let scene = backed_scene();
        let before = scene.snapshot();
        let host = ScriptedHost {
            fail: true,
            ..ScriptedHost::default()
        };

        let err = probe(&scene, &host).unwrap_err();
        assert!(matches!(err, VisionError::Host(_)));
        assert!(scene.has_status(TARGET, StatusId::Invisible));
        // The effect that was already disabled stays disabled.
        assert_eq!(scene.snapshot(), before);
    }

    #[test]
    fn nested_probes_see_suppressed_state_and_restore_once() {
        let scene = backed_scene();
        let before = scene.snapshot();
        let registry = DetectionRegistry::standard();

        let inner_seen = Cell::new(None);
        let inner_host = ScriptedHost::open();
        *inner_host.on_visibility.borrow_mut() = Some(Box::new(|| {
            inner_seen.set(Some(scene.has_status(TARGET, StatusId::Invisible)));
        }));

        let outer_host = ScriptedHost::open();
        *outer_host.on_visibility.borrow_mut() = Some(Box::new(|| {
            let ctx = DetectionContext::new(&scene, &inner_host, &registry);
            let _ = probe_visibility(&ctx, OBSERVER, TARGET, Point::new(0.0, 10.0));
            // Back in the outer probe: still suppressed.
            assert!(!scene.has_status(TARGET, StatusId::Invisible));
        }));

        let ctx = DetectionContext::new(&scene, &outer_host, &registry);
        assert!(probe_visibility(&ctx, OBSERVER, TARGET, Point::new(0.0, 10.0)).unwrap());
        assert_eq!(inner_seen.take(), Some(false));
        assert_eq!(scene.snapshot(), before);
    }

    #[test]
    fn see_invisibility_uses_the_probe() {
        let scene = transient_scene();
        let registry = DetectionRegistry::standard();
        let host = ScriptedHost::open();
        let ctx = DetectionContext::new(&scene, &host, &registry);
        let observer = ObserverView::capture(&scene, OBSERVER).unwrap();
        let target = TargetView::capture(&scene, TARGET).unwrap();
        let entry = DetectionModeEntry::enabled(DetectionModeId::SeeInvisibility, 60.0);

        assert!(registry
            .test_visibility(&ctx, &observer, &entry, &target, &[target.position])
            .unwrap());
        assert_eq!(host.visibility_calls.get(), 1);
        assert!(scene.has_status(TARGET, StatusId::Invisible));
    }

    #[test]
    fn see_invisibility_ignores_visible_targets_and_blind_observers() {
        let registry = DetectionRegistry::standard();
        let host = ScriptedHost::open();
        let entry = DetectionModeEntry::enabled(DetectionModeId::SeeInvisibility, 60.0);

        let mut scene = transient_scene();
        scene.token_mut(TARGET).unwrap().statuses.clear();
        let ctx = DetectionContext::new(&scene, &host, &registry);
        let observer = ObserverView::capture(&scene, OBSERVER).unwrap();
        let target = TargetView::capture(&scene, TARGET).unwrap();
        assert!(!registry
            .test_visibility(&ctx, &observer, &entry, &target, &[target.position])
            .unwrap());

        let mut scene = transient_scene();
        scene.token_mut(OBSERVER).unwrap().statuses.push(StatusId::Blind);
        let ctx = DetectionContext::new(&scene, &host, &registry);
        assert!(!registry
            .test_visibility(&ctx, &observer, &entry, &target, &[target.position])
            .unwrap());
        assert_eq!(host.visibility_calls.get(), 0);
    }
}
