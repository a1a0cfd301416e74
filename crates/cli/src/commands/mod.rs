//! Command implementations for vision-sync.

mod modes;
mod plan;
mod sync;

pub use modes::Modes;
pub use plan::Plan;
pub use sync::SyncCommand;
