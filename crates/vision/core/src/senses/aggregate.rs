use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::config::LinkConfig;
use crate::state::{Character, SenseEffect, SenseValue, StatusEffect};

use super::capability::{Capability, CapabilitySet};

/// Derives a character's capabilities from sense ranges and effects.
///
/// 1. Seed from the handled senses with a positive numeric range.
/// 2. Overlay active sense effects in a fixed order: see-in-dark, then
///    see-invisible, then echo-sense (which re-keys blindsight).
///
/// Inert effects (disabled or suppressed) are skipped and malformed sense
/// values are dropped without complaint.
pub fn aggregate<'a>(
    senses: &BTreeMap<String, SenseValue>,
    effects: impl IntoIterator<Item = &'a StatusEffect>,
    config: &LinkConfig,
) -> CapabilitySet {
    let mut capabilities = CapabilitySet::new();

    for capability in Capability::SENSES {
        let range = capability
            .sense_key()
            .and_then(|key| senses.get(key))
            .and_then(SenseValue::as_range);
        if let Some(range) = range {
            capabilities.insert(capability, range);
        }
    }

    let active: BTreeSet<SenseEffect> = effects
        .into_iter()
        .filter(|effect| effect.is_active())
        .filter_map(|effect| config.sense_effect(&effect.label))
        .collect();

    if active.contains(&SenseEffect::DevilsSight) {
        let range = capabilities
            .range(Capability::DevilsSight)
            .map_or(config.devils_sight_range, |existing| {
                existing.max(config.devils_sight_range)
            });
        capabilities.insert(Capability::DevilsSight, range);
    }

    if active.contains(&SenseEffect::SeeInvisibility) {
        capabilities.insert(Capability::SeeInvisibility, LinkConfig::UNLIMITED_RANGE);
    }

    if active.contains(&SenseEffect::Echolocation)
        && let Some(range) = capabilities.remove(Capability::Blindsight)
    {
        capabilities.insert(Capability::Echolocation, range);
    }

    trace!(?capabilities, "aggregated capabilities");
    capabilities
}

impl CapabilitySet {
    /// Capabilities of `character` under `config`.
    pub fn resolve(character: &Character, config: &LinkConfig) -> Self {
        aggregate(&character.senses, character.active_effects(), config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CharacterCategory, CharacterId, EffectId};

    fn character() -> Character {
        Character::new(CharacterId(1), "Aria", CharacterCategory::Character)
    }

    fn effect(id: u32, label: &str) -> StatusEffect {
        StatusEffect::new(EffectId(id), label)
    }

    #[test]
    fn seeds_only_handled_positive_senses() {
        let character = character()
            .with_sense("darkvision", 60.0)
            .with_sense("blindsight", 0.0)
            .with_sense("tremorsense", SenseValue::Text("30".into()))
            .with_sense("truesight", -10.0)
            .with_sense("telepathy", 120.0);

        let capabilities = CapabilitySet::resolve(&character, &LinkConfig::default());

        assert_eq!(
            capabilities.iter().collect::<Vec<_>>(),
            vec![(Capability::Darkvision, 60.0)]
        );
    }

    #[test]
    fn devils_sight_effect_grants_fixed_range() {
        let character = character()
            .with_sense("darkvision", 60.0)
            .with_effect(effect(1, "Devil's Sight"));

        let capabilities = CapabilitySet::resolve(&character, &LinkConfig::default());

        assert_eq!(capabilities.range(Capability::DevilsSight), Some(120.0));
        assert_eq!(capabilities.range(Capability::Darkvision), Some(60.0));
    }

    #[test]
    fn see_invisibility_is_effectively_unlimited() {
        let character = character().with_effect(effect(1, "See Invisibility"));

        let capabilities = CapabilitySet::resolve(&character, &LinkConfig::default());

        assert_eq!(
            capabilities.range(Capability::SeeInvisibility),
            Some(LinkConfig::UNLIMITED_RANGE)
        );
    }

    #[test]
    fn echolocation_replaces_blindsight() {
        let character = character()
            .with_sense("blindsight", 30.0)
            .with_effect(effect(1, "Echolocation"));

        let capabilities = CapabilitySet::resolve(&character, &LinkConfig::default());

        assert_eq!(capabilities.range(Capability::Echolocation), Some(30.0));
        assert!(!capabilities.contains(Capability::Blindsight));
    }

    #[test]
    fn echolocation_without_blindsight_adds_nothing() {
        let character = character().with_effect(effect(1, "Echolocation"));

        assert!(CapabilitySet::resolve(&character, &LinkConfig::default()).is_empty());
    }

    #[test]
    fn inert_effects_are_ignored() {
        let character = character()
            .with_effect(effect(1, "Devil's Sight").disabled())
            .with_effect(effect(2, "See Invisibility").suppressed());

        assert!(CapabilitySet::resolve(&character, &LinkConfig::default()).is_empty());
    }

    #[test]
    fn labels_come_from_config() {
        let config = LinkConfig::default().with_effect_label("Vista Oscura", SenseEffect::DevilsSight);
        let character = character().with_effect(effect(1, "Vista Oscura"));

        let capabilities = CapabilitySet::resolve(&character, &config);

        assert_eq!(capabilities.range(Capability::DevilsSight), Some(120.0));
    }

    #[test]
    fn detection_entries_follow_capability_order() {
        let character = character()
            .with_sense("tremorsense", 30.0)
            .with_sense("blindsight", 20.0)
            .with_sense("truesight", 60.0)
            .with_sense("darkvision", 60.0);

        let ids: Vec<_> = CapabilitySet::resolve(&character, &LinkConfig::default())
            .detection_entries()
            .into_iter()
            .map(|entry| (entry.id, entry.range))
            .collect();

        use crate::state::DetectionModeId::*;
        assert_eq!(ids, vec![(SeeAll, 60.0), (Blindsight, 20.0), (FeelTremor, 30.0)]);
    }
}
