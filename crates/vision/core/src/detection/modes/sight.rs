use crate::state::DetectionModeId;

use crate::detection::{DetectionMode, DetectionType};

/// Sees through magical and nonmagical darkness. Walls still block.
#[derive(Debug, Default)]
pub struct DevilsSight;

impl DetectionMode for DevilsSight {
    fn id(&self) -> DetectionModeId {
        DetectionModeId::DevilsSight
    }

    fn label(&self) -> &'static str {
        "Devil's Sight"
    }

    fn detection_type(&self) -> DetectionType {
        DetectionType::Sight
    }
}

/// Truesight.
#[derive(Debug, Default)]
pub struct SeeAll;

impl DetectionMode for SeeAll {
    fn id(&self) -> DetectionModeId {
        DetectionModeId::SeeAll
    }

    fn label(&self) -> &'static str {
        "Truesight"
    }

    fn detection_type(&self) -> DetectionType {
        DetectionType::Sight
    }
}
