use std::sync::OnceLock;

use crate::detection::{
    DetectionContext, DetectionFilter, DetectionMode, DetectionType, ObserverView, TargetView,
};
use crate::host::CollisionKind;
use crate::state::{DetectionModeId, Point};

use super::blocked;

/// Tremorsense: feels vibrations through the ground.
#[derive(Debug, Default)]
pub struct FeelTremor {
    filter: OnceLock<DetectionFilter>,
}

impl DetectionMode for FeelTremor {
    fn id(&self) -> DetectionModeId {
        DetectionModeId::FeelTremor
    }

    fn label(&self) -> &'static str {
        "Tremorsense"
    }

    fn detection_type(&self) -> DetectionType {
        DetectionType::Move
    }

    fn display_filter(&self) -> Option<&DetectionFilter> {
        Some(self.filter.get_or_init(|| DetectionFilter::Outline {
            wave: true,
            knockout: false,
            thickness: 1.0,
        }))
    }

    fn test_line_of_sight(
        &self,
        ctx: &DetectionContext<'_>,
        observer: &ObserverView,
        _target: &TargetView,
        point: Point,
    ) -> bool {
        !blocked(ctx, observer, point, CollisionKind::Move)
    }
}
