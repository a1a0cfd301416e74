//! Vision modes: definitions exposed to the renderer and the selection rules
//! that map capabilities onto a single active mode.
mod mode;
mod select;

pub use mode::{
    CanvasUniforms, VisionDefaults, VisionModeDefinition, VisionModeId, VisionModeRegistry,
};
pub use select::{ActiveVision, VisionSelection, resolve_active_vision, select_vision_mode};
