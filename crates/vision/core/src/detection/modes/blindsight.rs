use std::sync::OnceLock;

use crate::detection::{
    DetectionContext, DetectionFilter, DetectionMode, DetectionType, ObserverView, TargetView,
};
use crate::host::CollisionKind;
use crate::state::{DetectionModeId, Point};

use super::blocked;

/// Perceives surroundings without sight. Only total cover blocks it.
#[derive(Debug, Default)]
pub struct Blindsight {
    filter: OnceLock<DetectionFilter>,
}

impl DetectionMode for Blindsight {
    fn id(&self) -> DetectionModeId {
        DetectionModeId::Blindsight
    }

    fn label(&self) -> &'static str {
        "Blindsight"
    }

    fn detection_type(&self) -> DetectionType {
        DetectionType::Other
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
