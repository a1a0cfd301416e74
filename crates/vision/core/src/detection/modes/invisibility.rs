use std::sync::OnceLock;

use crate::detection::{
    DetectionContext, DetectionFilter, DetectionMode, DetectionType, ObserverView, TargetView,
    probe_visibility,
};
use crate::error::VisionError;
use crate::state::{DetectionModeEntry, DetectionModeId, Point, StatusId};

/// Sees invisible creatures as if they were not invisible.
///
/// Only applies to targets that are currently invisible. The point test asks
/// the host's plain visibility test under a suppression guard, so neither the
/// target's invisibility nor the observer's non-sight senses can feed back
/// into the answer.
#[derive(Debug, Default)]
pub struct SeeInvisibility {
    filter: OnceLock<DetectionFilter>,
}

impl DetectionMode for SeeInvisibility {
    fn id(&self) -> DetectionModeId {
        DetectionModeId::SeeInvisibility
    }

    fn label(&self) -> &'static str {
        "See Invisibility"
    }

    fn detection_type(&self) -> DetectionType {
        DetectionType::Sight
    }

    fn display_filter(&self) -> Option<&DetectionFilter> {
        Some(self.filter.get_or_init(|| DetectionFilter::Glow {
            color: [0.0, 0.60, 0.33, 1.0],
        }))
    }

    fn can_detect(
        &self,
        ctx: &DetectionContext<'_>,
        observer: &ObserverView,
        target: &TargetView,
    ) -> bool {
        ctx.scene.has_status(target.token, StatusId::Invisible)
            && !ctx.scene.has_status(observer.token, StatusId::Blind)
    }

    fn test_point(
        &self,
        ctx: &DetectionContext<'_>,
        observer: &ObserverView,
        entry: &DetectionModeEntry,
        target: &TargetView,
        point: Point,
    ) -> Result<bool, VisionError> {
        if !self.test_range(observer, entry, point) {
            return Ok(false);
        }
        probe_visibility(ctx, observer.token, target.token, point)
    }
}
