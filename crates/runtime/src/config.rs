//! File loaders for link configuration, scenes and event scripts.

use std::path::Path;

use vision_core::{LinkConfig, SceneSnapshot, SceneState};

use crate::events::SyncEvent;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Loader for link configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a `LinkConfig` from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> LoadResult<LinkConfig> {
        let content = read_file(path)?;
        let config: LinkConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse link config TOML: {}", e))?;

        Ok(config)
    }

    /// Load from `path` if given, else defaults; environment overrides apply
    /// on top either way.
    pub fn load_with_env(path: Option<&Path>) -> LoadResult<LinkConfig> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => LinkConfig::default(),
        };
        Ok(config.with_env_overrides())
    }
}

/// Loader for scene fixtures and event scripts from RON files.
pub struct SceneLoader;

impl SceneLoader {
    pub fn load(path: &Path) -> LoadResult<SceneState> {
        let content = read_file(path)?;
        let snapshot: SceneSnapshot = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scene RON: {}", e))?;

        Ok(SceneState::from(snapshot))
    }

    pub fn load_events(path: &Path) -> LoadResult<Vec<SyncEvent>> {
        let content = read_file(path)?;
        ron::from_str(&content).map_err(|e| anyhow::anyhow!("Failed to parse events RON: {}", e))
    }
}

fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;
    use vision_core::{
        CharacterCategory, CharacterId, DetectionModeEntry, DetectionModeId, SenseEffect, TokenId,
        TokenReconciler, TokenStore, UserId, Viewer, VisionModeId,
    };

    use super::*;
    use crate::events::{ChangeKind, EffectParent};

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn toml_config_overrides_only_what_it_names() {
        let file = write_temp(
            r#"
managed_categories = ["character", "npc"]
devils_sight_range = 90.0

[effect_labels]
"Eyes of Night" = "devils_sight"
"#,
        );

        let config = ConfigLoader::load(file.path()).unwrap();
        assert!(config.link_actor_senses);
        assert!(config.manages(CharacterCategory::Npc));
        assert_eq!(config.devils_sight_range, 90.0);
        assert_eq!(config.sense_effect("Eyes of Night"), Some(SenseEffect::DevilsSight));
        // Replacing the table drops the default labels.
        assert_eq!(config.sense_effect("Devil's Sight"), None);
    }

    #[test]
    fn malformed_config_is_reported_with_context() {
        let file = write_temp("link_actor_senses = \"sometimes\"");
        let err = ConfigLoader::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("link config TOML"));

        let err = ConfigLoader::load(Path::new("/nonexistent/vision.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }

    #[test]
    fn scene_fixture_loads_from_ron() {
        let file = write_temp(
            r#"(
    token_vision: true,
    characters: [
        (
            id: 1,
            name: "Aria",
            category: character,
            senses: { "darkvision": 60, "blindsight": "" },
        ),
    ],
    tokens: [
        (id: 10, name: "Aria", character: Some(1)),
        (id: 11, name: "Torch"),
    ],
)"#,
        );

        let scene = SceneLoader::load(file.path()).unwrap();
        assert!(scene.token_vision());
        assert_eq!(scene.placed_characters(), vec![CharacterId(1)]);
        let aria = scene.character(CharacterId(1)).unwrap();
        assert_eq!(aria.senses["darkvision"].as_range(), Some(60.0));
        assert_eq!(aria.senses["blindsight"].as_range(), None);
        assert_eq!(scene.token(TokenId(11)).unwrap().character, None);
    }

    #[test]
    fn unfamiliar_host_data_loads_and_survives_reconciliation() {
        let file = write_temp(
            r#"(
    token_vision: true,
    characters: [
        (
            id: 1,
            name: "Aria",
            senses: { "darkvision": 60, "units": ["ft"], "special": { "note": "x" } },
        ),
    ],
    tokens: [
        (
            id: 10,
            name: "Aria",
            character: Some(1),
            sight: (vision_mode: lightAmplification2),
            detection_modes: [
                (id: lightPerception, enabled: true, range: 30.0),
                (id: feelTremor, enabled: true, range: 15.0),
            ],
        ),
    ],
)"#,
        );

        let mut scene = SceneLoader::load(file.path()).unwrap();
        let token = scene.token(TokenId(10)).unwrap();
        assert_eq!(token.sight.vision_mode, VisionModeId::Unknown);
        let light = DetectionModeEntry::enabled(DetectionModeId::from("lightPerception"), 30.0);
        assert_eq!(token.detection_modes[0], light);

        let report = TokenReconciler::default().update_tokens(
            &mut scene,
            CharacterId(1),
            &Viewer::gamemaster(UserId(1)),
        );
        assert_eq!(report.patched, vec![TokenId(10)]);

        let token = scene.token(TokenId(10)).unwrap();
        assert_eq!(token.sight.vision_mode, VisionModeId::Darkvision);
        assert_eq!(token.sight.range, 60.0);
        assert_eq!(token.detection_modes, vec![light]);
        assert_eq!(
            serde_json::to_value(&token.detection_modes[0].id).unwrap(),
            serde_json::json!("lightPerception")
        );
    }

    #[test]
    fn event_script_loads_from_ron() {
        let file = write_temp(
            r#"[
    scene_activated,
    character_updated(character: 1, changed: ["senses.darkvision"]),
    effect_changed(effect: 4, parent: character(1), kind: created),
    token_created(token: 12),
]"#,
        );

        let events = SceneLoader::load_events(file.path()).unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], SyncEvent::SceneActivated);
        assert_eq!(
            events[2],
            SyncEvent::EffectChanged {
                effect: vision_core::EffectId(4),
                parent: EffectParent::Character(CharacterId(1)),
                kind: ChangeKind::Created,
            }
        );
    }
}
