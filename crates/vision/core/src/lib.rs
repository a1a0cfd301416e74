//! Sense-linked vision rules shared by the sync runtime and host adapters.
//!
//! `vision-core` turns a character's declared senses and active effects into
//! a perceptual configuration for each of its tokens, and evaluates detection
//! modes when the host asks whether one token can perceive another. The
//! crate is synchronous and host-agnostic: scene persistence, line-of-sight
//! geometry and rendering are reached through the traits in [`state`] and
//! [`host`].
pub mod config;
pub mod detection;
pub mod error;
pub mod host;
pub mod reconcile;
pub mod senses;
pub mod state;
pub mod vision;

pub use config::LinkConfig;
pub use detection::{
    DetectionContext, DetectionFilter, DetectionMode, DetectionRegistry, DetectionType,
    ObserverView, SuppressionGuard, TargetView, probe_visibility, test_angle,
};
pub use error::{EngineError, ErrorSeverity, HostError, StoreError, VisionError};
pub use host::{CollisionKind, CollisionMode, CollisionQuery, PerceptionHost, VisibilityQuery};
pub use reconcile::{
    GateClosed, PatchFields, PerceptionPatch, ReconcileReport, SightPatch, TargetPerception,
    TokenReconciler, check_gate, reconcile_token,
};
pub use senses::{Capability, CapabilitySet, aggregate};
pub use state::{
    Character, CharacterCategory, CharacterId, DetectionModeEntry, DetectionModeId, EffectId,
    OwnershipLevel, Point, SceneSnapshot, SceneState, SenseEffect, SenseValue, SightConfig,
    StatusEffect, StatusId, Token, TokenId, TokenStore, UserId, Viewer,
};
pub use vision::{
    ActiveVision, CanvasUniforms, VisionDefaults, VisionModeDefinition, VisionModeId,
    VisionModeRegistry, VisionSelection, resolve_active_vision, select_vision_mode,
};
