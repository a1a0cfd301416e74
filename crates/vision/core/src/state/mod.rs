//! Scene data consumed and produced by the engine.
//!
//! Characters and tokens are owned by the host. The engine reads them through
//! [`TokenStore`], writes reconciled perception back through the same trait,
//! and during detection probes mutates them briefly through [`SceneState`]'s
//! interior mutability.
pub mod scene;
pub mod types;

pub use scene::{SceneSnapshot, SceneState, TokenStore};
pub use types::{
    Character, CharacterCategory, CharacterId, DetectionModeEntry, DetectionModeId, EffectId,
    OwnershipLevel, Point, SenseEffect, SenseValue, SightConfig, StatusEffect, StatusId, Token,
    TokenId, UserId, Viewer,
};
