use std::sync::OnceLock;

use crate::detection::{
    DetectionContext, DetectionFilter, DetectionMode, DetectionType, ObserverView, TargetView,
    test_angle,
};
use crate::host::CollisionKind;
use crate::state::{DetectionModeId, Point, StatusId};

use super::blocked;

/// Blindsight carried by sound. Deafness silences it, sound walls stop it
/// and it only reaches into the observer's facing cone.
#[derive(Debug, Default)]
pub struct Echolocation {
    filter: OnceLock<DetectionFilter>,
}

impl DetectionMode for Echolocation {
    fn id(&self) -> DetectionModeId {
        DetectionModeId::Echolocation
    }

    fn label(&self) -> &'static str {
        "Echolocation"
    }

    fn detection_type(&self) -> DetectionType {
        DetectionType::Sound
    }

    fn display_filter(&self) -> Option<&DetectionFilter> {
        Some(self.filter.get_or_init(|| DetectionFilter::Outline {
            wave: true,
            knockout: false,
            thickness: 1.0,
        }))
    }

    fn can_detect(
        &self,
        ctx: &DetectionContext<'_>,
        observer: &ObserverView,
        _target: &TargetView,
    ) -> bool {
        !ctx.scene.has_status(observer.token, StatusId::Deaf)
    }

    fn test_line_of_sight(
        &self,
        ctx: &DetectionContext<'_>,
        observer: &ObserverView,
        _target: &TargetView,
        point: Point,
    ) -> bool {
        !blocked(ctx, observer, point, CollisionKind::Move)
            && !blocked(ctx, observer, point, CollisionKind::Sound)
            && test_angle(
                observer.position,
                observer.rotation,
                observer.angle,
                observer.external_radius,
                point,
            )
    }
}
