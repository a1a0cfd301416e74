//! Event-driven synchronization of token perception.
//!
//! Hosts report edits to characters, effects and tokens; this crate batches
//! them and drives [`vision_core::TokenReconciler`] so each affected
//! character is reconciled once per batch, followed by a single refresh
//! signal.
//!
//! Modules are organized by responsibility:
//! - [`events`] defines host notifications and their trigger filters
//! - [`orchestrator`] hosts the batching state machine
//! - [`worker`] runs the orchestrator behind a tokio channel
//! - [`sink`] receives the refresh signal
//! - [`config`] loads link configuration and scene fixtures from files
pub mod config;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod sink;
pub mod worker;

pub use config::{ConfigLoader, LoadResult, SceneLoader};
pub use error::{Result, RuntimeError};
pub use events::{ChangeKind, EffectParent, SyncEvent};
pub use orchestrator::{BatchReport, Orchestrator, SyncPhase};
pub use sink::{PerceptionRefresh, PerceptionSink};
pub use worker::{Command, SyncHandle, SyncWorker};
