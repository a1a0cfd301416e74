//! Batching state machine between host notifications and the reconciler.
//!
//! Entry points only record what needs doing; [`Orchestrator::flush`] does
//! the work. A flush resolves everything queued into a deduplicated set of
//! characters, reconciles each once, and sends a single refresh signal.

use std::collections::BTreeSet;

use tracing::{debug, info, trace};

use vision_core::{
    CharacterId, ReconcileReport, TokenId, TokenReconciler, TokenStore, Viewer,
};

use crate::events::{
    CHARACTER_TRIGGER_PATHS, ChangeKind, EffectParent, SyncEvent, TOKEN_TRIGGER_PATHS, touches,
};
use crate::sink::{PerceptionRefresh, PerceptionSink};

/// Where the orchestrator is in its cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum SyncPhase {
    /// Accepting notifications.
    #[default]
    Idle,
    /// Resolving queued notifications into characters.
    Batching,
    /// Reconciling characters and writing tokens.
    Applying,
}

/// Result of one flush.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchReport {
    /// Characters reconciled, in id order.
    pub characters: Vec<CharacterId>,
    pub reports: Vec<ReconcileReport>,
    /// Whether the refresh signal was sent.
    pub refreshed: bool,
}

impl BatchReport {
    pub fn patched(&self) -> usize {
        self.reports.iter().map(|report| report.patched.len()).sum()
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().map(|report| report.failed.len()).sum()
    }

    /// Folds a later flush into this report.
    pub fn merge(&mut self, other: BatchReport) {
        self.characters.extend(other.characters);
        self.reports.extend(other.reports);
        self.refreshed |= other.refreshed;
    }
}

pub struct Orchestrator {
    reconciler: TokenReconciler,
    viewer: Viewer,
    phase: SyncPhase,
    characters: BTreeSet<CharacterId>,
    /// Tokens to resolve to their character on the next flush.
    tokens: Vec<TokenId>,
    /// Created tokens, held back one flush so the host can finish placing them.
    deferred: Vec<TokenId>,
    scene_wide: bool,
    forced: bool,
}

impl Orchestrator {
    pub fn new(reconciler: TokenReconciler, viewer: Viewer) -> Self {
        Self {
            reconciler,
            viewer,
            phase: SyncPhase::Idle,
            characters: BTreeSet::new(),
            tokens: Vec::new(),
            deferred: Vec::new(),
            scene_wide: false,
            forced: false,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn reconciler(&self) -> &TokenReconciler {
        &self.reconciler
    }

    /// True if a flush would have something to do.
    pub fn has_pending(&self) -> bool {
        !self.characters.is_empty()
            || !self.tokens.is_empty()
            || !self.deferred.is_empty()
            || self.scene_wide
            || self.forced
    }

    /// Queues a character whose sense fields changed.
    ///
    /// Returns false when none of `changed` touches senses.
    pub fn on_character_changed<S: AsRef<str>>(
        &mut self,
        character: CharacterId,
        changed: &[S],
    ) -> bool {
        if !touches(changed, CHARACTER_TRIGGER_PATHS) {
            trace!(target: "runtime::sync", %character, "character change ignored");
            return false;
        }
        self.characters.insert(character);
        true
    }

    /// Queues the parent character of a created, updated or deleted effect.
    pub fn on_effect_changed(&mut self, parent: EffectParent, kind: ChangeKind) -> bool {
        match parent {
            EffectParent::Character(character) => {
                trace!(target: "runtime::sync", %character, %kind, "effect change queued");
                self.characters.insert(character);
                true
            }
            EffectParent::Other => false,
        }
    }

    /// Queues a token by change kind.
    ///
    /// Created tokens wait one flush. Updated tokens count only when sight
    /// or detection fields changed. Deletions need no work.
    pub fn on_token_changed<S: AsRef<str>>(
        &mut self,
        token: TokenId,
        kind: ChangeKind,
        changed: &[S],
    ) -> bool {
        match kind {
            ChangeKind::Created => {
                self.deferred.push(token);
                true
            }
            ChangeKind::Updated if touches(changed, TOKEN_TRIGGER_PATHS) => {
                self.tokens.push(token);
                true
            }
            ChangeKind::Updated | ChangeKind::Deleted => false,
        }
    }

    /// Queues every placed character and forces a refresh even if nothing changes.
    pub fn on_scene_activated(&mut self) {
        self.scene_wide = true;
        self.forced = true;
    }

    /// Routes a host event to its entry point.
    pub fn handle(&mut self, event: SyncEvent) -> bool {
        trace!(target: "runtime::sync", event = event.name(), "event received");
        match event {
            SyncEvent::CharacterUpdated { character, changed } => {
                self.on_character_changed(character, &changed)
            }
            SyncEvent::EffectChanged { parent, kind, .. } => self.on_effect_changed(parent, kind),
            SyncEvent::TokenCreated { token } => {
                self.on_token_changed::<&str>(token, ChangeKind::Created, &[])
            }
            SyncEvent::TokenUpdated { token, changed } => {
                self.on_token_changed(token, ChangeKind::Updated, &changed)
            }
            SyncEvent::SceneActivated => {
                self.on_scene_activated();
                true
            }
        }
    }

    /// Processes everything queued before this call.
    ///
    /// Tokens created since the previous flush are carried over to the next one.
    pub fn flush<S>(&mut self, store: &mut S, sink: &mut dyn PerceptionSink) -> BatchReport
    where
        S: TokenStore + ?Sized,
    {
        self.phase = SyncPhase::Batching;
        let characters = self.collect_characters(&*store);
        let forced = std::mem::take(&mut self.forced);

        self.phase = SyncPhase::Applying;
        let mut report = BatchReport {
            characters: characters.iter().copied().collect(),
            ..BatchReport::default()
        };
        for character in characters {
            report
                .reports
                .push(self.reconciler.update_tokens(&mut *store, character, &self.viewer));
        }

        if report.patched() > 0 || forced {
            sink.refresh(PerceptionRefresh::FULL);
            report.refreshed = true;
        }

        // Created tokens become eligible on the next flush.
        self.tokens.append(&mut self.deferred);
        self.phase = SyncPhase::Idle;

        if report.refreshed || !report.characters.is_empty() {
            info!(
                target: "runtime::sync",
                characters = report.characters.len(),
                patched = report.patched(),
                failed = report.failed(),
                refreshed = report.refreshed,
                "sync batch processed"
            );
        }
        report
    }

    fn collect_characters<S>(&mut self, store: &S) -> BTreeSet<CharacterId>
    where
        S: TokenStore + ?Sized,
    {
        let mut characters = std::mem::take(&mut self.characters);

        if std::mem::take(&mut self.scene_wide) {
            characters.extend(store.placed_characters());
        }

        for token in self.tokens.drain(..) {
            match store.token(token).and_then(|token| token.character) {
                Some(character) => {
                    characters.insert(character);
                }
                None => debug!(target: "runtime::sync", %token, "token has no character; skipped"),
            }
        }

        characters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vision_core::{
        Character, CharacterCategory, LinkConfig, OwnershipLevel, SceneState, Token, UserId,
        VisionModeId, VisionModeRegistry,
    };

    const GM: Viewer = Viewer::gamemaster(UserId(1));

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(TokenReconciler::default(), GM)
    }

    fn scene() -> SceneState {
        let mut scene = SceneState::new(true);
        scene.insert_character(
            Character::new(CharacterId(1), "Aria", CharacterCategory::Character)
                .with_sense("darkvision", 60.0)
                .with_owner(UserId(2), OwnershipLevel::Owner),
        );
        scene.insert_character(Character::new(
            CharacterId(2),
            "Brom",
            CharacterCategory::Character,
        ));
        scene.insert_token(Token::new(TokenId(10), "Aria", Some(CharacterId(1))));
        scene.insert_token(Token::new(TokenId(11), "Aria (2)", Some(CharacterId(1))));
        scene.insert_token(Token::new(TokenId(20), "Brom", Some(CharacterId(2))));
        scene.insert_token(Token::new(TokenId(30), "Torch", None));
        scene
    }

    #[test]
    fn irrelevant_changes_are_dropped() {
        let mut orchestrator = orchestrator();
        assert!(!orchestrator.on_character_changed(CharacterId(1), &["name"]));
        assert!(!orchestrator.on_effect_changed(EffectParent::Other, ChangeKind::Created));
        assert!(!orchestrator.on_token_changed(TokenId(10), ChangeKind::Updated, &["x", "y"]));
        assert!(!orchestrator.on_token_changed::<&str>(TokenId(10), ChangeKind::Deleted, &[]));
        assert!(!orchestrator.has_pending());
    }

    #[test]
    fn one_refresh_per_batch_with_characters_deduplicated() {
        let mut scene = scene();
        let mut sink: Vec<PerceptionRefresh> = Vec::new();
        let mut orchestrator = orchestrator();

        orchestrator.on_character_changed(CharacterId(1), &["senses.darkvision"]);
        orchestrator.on_effect_changed(EffectParent::Character(CharacterId(1)), ChangeKind::Updated);
        orchestrator.on_token_changed(TokenId(11), ChangeKind::Updated, &["sight.range"]);

        let report = orchestrator.flush(&mut scene, &mut sink);
        assert_eq!(report.characters, vec![CharacterId(1)]);
        assert_eq!(report.patched(), 2);
        assert_eq!(sink, vec![PerceptionRefresh::FULL]);
        assert_eq!(orchestrator.phase(), SyncPhase::Idle);
    }

    #[test]
    fn no_patch_means_no_refresh() {
        let mut scene = scene();
        let mut sink: Vec<PerceptionRefresh> = Vec::new();
        let mut orchestrator = orchestrator();

        orchestrator.on_character_changed(CharacterId(2), &["senses"]);
        let report = orchestrator.flush(&mut scene, &mut sink);
        assert_eq!(report.characters, vec![CharacterId(2)]);
        assert!(!report.refreshed);
        assert!(sink.is_empty());
    }

    #[test]
    fn scene_activation_forces_a_refresh() {
        let mut scene = scene();
        let mut sink: Vec<PerceptionRefresh> = Vec::new();
        let mut orchestrator = orchestrator();

        orchestrator.on_scene_activated();
        let first = orchestrator.flush(&mut scene, &mut sink);
        assert_eq!(first.characters, vec![CharacterId(1), CharacterId(2)]);
        assert_eq!(first.patched(), 2);

        orchestrator.on_scene_activated();
        let second = orchestrator.flush(&mut scene, &mut sink);
        assert_eq!(second.patched(), 0);
        assert!(second.refreshed);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn created_tokens_wait_one_flush() {
        let mut scene = scene();
        let mut sink: Vec<PerceptionRefresh> = Vec::new();
        let mut orchestrator = orchestrator();

        scene.insert_token(Token::new(TokenId(12), "Aria (3)", Some(CharacterId(1))));
        orchestrator.on_token_changed::<&str>(TokenId(12), ChangeKind::Created, &[]);
        orchestrator.on_token_changed::<&str>(TokenId(30), ChangeKind::Created, &[]);

        let first = orchestrator.flush(&mut scene, &mut sink);
        assert!(first.characters.is_empty());
        assert!(orchestrator.has_pending());

        let second = orchestrator.flush(&mut scene, &mut sink);
        assert_eq!(second.characters, vec![CharacterId(1)]);
        assert_eq!(
            scene.token(TokenId(12)).unwrap().sight.vision_mode,
            VisionModeId::Darkvision
        );
        assert!(!orchestrator.has_pending());
    }

    #[test]
    fn disabled_linking_never_signals() {
        let mut scene = scene();
        let mut sink: Vec<PerceptionRefresh> = Vec::new();
        let reconciler = TokenReconciler::new(
            LinkConfig::default().with_linking(false),
            VisionModeRegistry::standard(),
        );
        let mut orchestrator = Orchestrator::new(reconciler, GM);

        orchestrator.on_character_changed(CharacterId(1), &["senses.darkvision"]);
        let report = orchestrator.flush(&mut scene, &mut sink);
        assert_eq!(report.patched(), 0);
        assert!(sink.is_empty());
    }
}
