use std::collections::{BTreeMap, BTreeSet};
use std::env;

use crate::state::{CharacterCategory, SenseEffect};

/// Settings that govern automatic sense linking.
///
/// Read-only to the engine; hosts load it once (see the runtime's
/// `ConfigLoader`) and hand it to the reconciler.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkConfig {
    /// Master switch: when false the reconciler never touches a token.
    pub link_actor_senses: bool,
    /// Character categories whose tokens are managed.
    pub managed_categories: BTreeSet<CharacterCategory>,
    /// Range granted by the see-in-dark effect.
    pub devils_sight_range: f64,
    /// Effect labels recognised as sense effects.
    pub effect_labels: BTreeMap<String, SenseEffect>,
}

impl LinkConfig {
    pub const DEFAULT_DEVILS_SIGHT_RANGE: f64 = 120.0;

    /// Stand-in for "unlimited" detection range. Finite so it survives
    /// serialization and plain comparisons.
    pub const UNLIMITED_RANGE: f64 = f64::MAX;

    pub fn new() -> Self {
        Self {
            link_actor_senses: true,
            managed_categories: BTreeSet::from([CharacterCategory::Character]),
            devils_sight_range: Self::DEFAULT_DEVILS_SIGHT_RANGE,
            effect_labels: Self::default_effect_labels(),
        }
    }

    pub fn default_effect_labels() -> BTreeMap<String, SenseEffect> {
        BTreeMap::from([
            ("Devil's Sight".to_owned(), SenseEffect::DevilsSight),
            ("See Invisibility".to_owned(), SenseEffect::SeeInvisibility),
            ("Echolocation".to_owned(), SenseEffect::Echolocation),
        ])
    }

    pub fn with_linking(mut self, enabled: bool) -> Self {
        self.link_actor_senses = enabled;
        self
    }

    pub fn with_managed_categories(
        mut self,
        categories: impl IntoIterator<Item = CharacterCategory>,
    ) -> Self {
        self.managed_categories = categories.into_iter().collect();
        self
    }

    pub fn with_effect_label(mut self, label: impl Into<String>, effect: SenseEffect) -> Self {
        self.effect_labels.insert(label.into(), effect);
        self
    }

    /// Returns the sense effect a label stands for, if any.
    pub fn sense_effect(&self, label: &str) -> Option<SenseEffect> {
        self.effect_labels.get(label).copied()
    }

    pub fn manages(&self, category: CharacterCategory) -> bool {
        self.managed_categories.contains(&category)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies `VISION_LINK_SENSES`, `VISION_MANAGED_CATEGORIES` and
    /// `VISION_DEVILS_SIGHT_RANGE` on top of `self`. Unparsable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(enabled) = read_env::<bool>("VISION_LINK_SENSES") {
            self.link_actor_senses = enabled;
        }

        if let Some(categories) = env::var("VISION_MANAGED_CATEGORIES")
            .ok()
            .and_then(|raw| parse_categories(&raw))
        {
            self.managed_categories = categories;
        }

        if let Some(range) = read_env::<f64>("VISION_DEVILS_SIGHT_RANGE")
            && range.is_finite()
            && range > 0.0
        {
            self.devils_sight_range = range;
        }

        self
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

/// Parses a comma-separated category list; `None` if any entry is unknown
/// or the list is empty.
fn parse_categories(raw: &str) -> Option<BTreeSet<CharacterCategory>> {
    let categories = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse().ok())
        .collect::<Option<BTreeSet<_>>>()?;
    (!categories.is_empty()).then_some(categories)
}
