use tracing::{debug, error, trace, warn};

use crate::config::LinkConfig;
use crate::error::{EngineError, VisionError};
use crate::senses::CapabilitySet;
use crate::state::{CharacterId, TokenId, TokenStore, Viewer};
use crate::vision::VisionModeRegistry;

use super::gate::{GateClosed, check_gate};
use super::patch::PerceptionPatch;
use super::target::{TargetPerception, reconcile_token};

/// Outcome of reconciling one character's tokens.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReconcileReport {
    pub character: Option<CharacterId>,
    /// Tokens whose perception was written.
    pub patched: Vec<TokenId>,
    /// Tokens skipped because of an error; siblings were still processed.
    pub failed: Vec<(TokenId, VisionError)>,
    /// Set when the gate was closed and nothing was attempted.
    pub gated: Option<GateClosed>,
}

impl ReconcileReport {
    pub fn made_updates(&self) -> bool {
        !self.patched.is_empty()
    }
}

/// Brings a character's tokens in line with its resolved senses.
#[derive(Clone, Debug, Default)]
pub struct TokenReconciler {
    config: LinkConfig,
    vision_modes: VisionModeRegistry,
}

impl TokenReconciler {
    pub fn new(config: LinkConfig, vision_modes: VisionModeRegistry) -> Self {
        Self {
            config,
            vision_modes,
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn vision_modes(&self) -> &VisionModeRegistry {
        &self.vision_modes
    }

    /// Reconciles every sighted token of `character`.
    ///
    /// All patches are computed before the first write, and each token is
    /// written at most once.
    pub fn update_tokens<S>(
        &self,
        store: &mut S,
        character: CharacterId,
        viewer: &Viewer,
    ) -> ReconcileReport
    where
        S: TokenStore + ?Sized,
    {
        let mut report = ReconcileReport {
            character: Some(character),
            ..ReconcileReport::default()
        };

        let Some(record) = store.character(character) else {
            debug!(%character, "character not in scene; nothing to reconcile");
            return report;
        };

        if let Err(gate) = check_gate(&self.config, store.token_vision(), &record, viewer) {
            debug!(
                character = %record.describe(),
                reason = gate.as_str(),
                "sense linking skipped"
            );
            report.gated = Some(gate);
            return report;
        }

        let capabilities = CapabilitySet::resolve(&record, &self.config);
        let character_label = record.describe();

        let mut pending: Vec<(TokenId, String, PerceptionPatch)> = Vec::new();
        for token in store
            .tokens_for(character)
            .into_iter()
            .filter(|token| token.sight.enabled)
        {
            let label = token.describe();
            let target = match TargetPerception::build(
                &capabilities,
                &self.vision_modes,
                &label,
                &character_label,
            ) {
                Ok(target) => target,
                Err(err) => {
                    error!(
                        token = %label,
                        character = %character_label,
                        code = err.error_code(),
                        "{err}"
                    );
                    report.failed.push((token.id, err));
                    continue;
                }
            };

            match reconcile_token(&target, &token) {
                Some(patch) => pending.push((token.id, label, patch)),
                None => trace!(token = %label, "token already up to date"),
            }
        }

        for (id, label, patch) in pending {
            match store.write_token(id, &patch) {
                Ok(()) => {
                    debug!(token = %label, fields = ?patch.fields(), "token perception updated");
                    report.patched.push(id);
                }
                Err(err) => {
                    warn!(
                        token = %label,
                        character = %character_label,
                        severity = err.severity().as_str(),
                        "failed to write token perception: {err}"
                    );
                    report.failed.push((id, err.into()));
                }
            }
        }

        report
    }
}
