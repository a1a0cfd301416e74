//! Host notifications the orchestrator reacts to.
//!
//! Each event carries the dotted field paths the host reports as changed so
//! irrelevant edits can be dropped before they reach the batch.

use serde::{Deserialize, Serialize};

use vision_core::{CharacterId, EffectId, TokenId};

/// Field path prefixes that make a character edit relevant.
pub const CHARACTER_TRIGGER_PATHS: &[&str] = &["senses"];

/// Field path prefixes that make a token edit relevant.
pub const TOKEN_TRIGGER_PATHS: &[&str] = &["sight", "detectionModes"];

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// Document an effect is embedded in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectParent {
    Character(CharacterId),
    /// Effects on items, or any other non-character parent.
    Other,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncEvent {
    CharacterUpdated {
        character: CharacterId,
        #[serde(default)]
        changed: Vec<String>,
    },
    EffectChanged {
        effect: EffectId,
        parent: EffectParent,
        kind: ChangeKind,
    },
    TokenCreated {
        token: TokenId,
    },
    TokenUpdated {
        token: TokenId,
        #[serde(default)]
        changed: Vec<String>,
    },
    SceneActivated,
}

impl SyncEvent {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CharacterUpdated { .. } => "character_updated",
            Self::EffectChanged { .. } => "effect_changed",
            Self::TokenCreated { .. } => "token_created",
            Self::TokenUpdated { .. } => "token_updated",
            Self::SceneActivated => "scene_activated",
        }
    }
}

/// True if any changed path is one of `prefixes` or lies beneath one.
///
/// Matching is by whole path segment: `senses.darkvision` matches `senses`,
/// `sensesExtra` does not.
pub fn touches<S: AsRef<str>>(changed: &[S], prefixes: &[&str]) -> bool {
    changed.iter().any(|path| {
        let path = path.as_ref();
        prefixes.iter().any(|prefix| {
            path.strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_match_by_segment() {
        assert!(touches(&["senses.darkvision"], CHARACTER_TRIGGER_PATHS));
        assert!(touches(&["senses"], CHARACTER_TRIGGER_PATHS));
        assert!(!touches(&["sensesExtra"], CHARACTER_TRIGGER_PATHS));
        assert!(!touches(&["name", "hp.value"], CHARACTER_TRIGGER_PATHS));
        assert!(!touches::<&str>(&[], CHARACTER_TRIGGER_PATHS));

        assert!(touches(&["x", "detectionModes"], TOKEN_TRIGGER_PATHS));
        assert!(touches(&["sight.range"], TOKEN_TRIGGER_PATHS));
        assert!(!touches(&["x", "y", "rotation"], TOKEN_TRIGGER_PATHS));
    }
}
