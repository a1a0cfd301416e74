//! Capability aggregation: senses and effects in, capability ranges out.
mod aggregate;
mod capability;

pub use aggregate::aggregate;
pub use capability::{Capability, CapabilitySet};
