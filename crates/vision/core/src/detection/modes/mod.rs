//! The built-in detection modes.
mod basic;
mod blindsight;
mod echolocation;
mod invisibility;
mod sight;
mod tremor;

pub use basic::BasicSight;
pub use blindsight::Blindsight;
pub use echolocation::Echolocation;
pub use invisibility::SeeInvisibility;
pub use sight::{DevilsSight, SeeAll};
pub use tremor::FeelTremor;

use crate::host::{CollisionKind, CollisionQuery};
use crate::state::Point;

use super::{DetectionContext, ObserverView};

/// True if a wall of `kind` stands between the observer and `point`.
fn blocked(
    ctx: &DetectionContext<'_>,
    observer: &ObserverView,
    point: Point,
    kind: CollisionKind,
) -> bool {
    ctx.host.test_collision(
        observer.position,
        point,
        CollisionQuery::any(kind, observer.token),
    )
}
