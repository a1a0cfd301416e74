//! Token reconciliation: diff each token against the perception its
//! character's senses call for and write back the minimal patch.
mod gate;
mod patch;
mod reconciler;
mod target;

pub use gate::{GateClosed, check_gate};
pub use patch::{PatchFields, PerceptionPatch, SightPatch};
pub use reconciler::{ReconcileReport, TokenReconciler};
pub use target::{TargetPerception, reconcile_token};
