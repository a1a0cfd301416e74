use crate::detection::{DetectionContext, DetectionMode, DetectionType, ObserverView, TargetView};
use crate::error::VisionError;
use crate::state::{DetectionModeEntry, DetectionModeId, Point, StatusId};

/// Ordinary sight.
///
/// A blinded observer cannot see at all; if it carries a blindsight entry the
/// answer comes from that entry instead.
#[derive(Debug, Default)]
pub struct BasicSight;

impl DetectionMode for BasicSight {
    fn id(&self) -> DetectionModeId {
        DetectionModeId::BasicSight
    }

    fn label(&self) -> &'static str {
        "Basic Sight"
    }

    fn detection_type(&self) -> DetectionType {
        DetectionType::Sight
    }

    fn test_point(
        &self,
        ctx: &DetectionContext<'_>,
        observer: &ObserverView,
        entry: &DetectionModeEntry,
        target: &TargetView,
        point: Point,
    ) -> Result<bool, VisionError> {
        if ctx.scene.has_status(observer.token, StatusId::Blind) {
            let blindsight = ctx.scene.borrow_token(observer.token).and_then(|token| {
                token
                    .detection_mode(&DetectionModeId::Blindsight)
                    .cloned()
            });
            return match blindsight {
                Some(blindsight) => {
                    ctx.registry
                        .test_visibility(ctx, observer, &blindsight, target, &[point])
                }
                None => Ok(false),
            };
        }

        Ok(self.test_range(observer, entry, point)
            && self.test_line_of_sight(ctx, observer, target, point))
    }
}
