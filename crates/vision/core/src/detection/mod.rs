//! Detection modes: how one token perceives another beyond plain sight.
//!
//! Every mode implements [`DetectionMode`] and is looked up by
//! [`DetectionModeId`] through the [`DetectionRegistry`]. The host's
//! visibility test calls [`DetectionRegistry::test_visibility`] for each
//! detection entry on the observer; modes call back into the host for
//! collision and baseline visibility through [`DetectionContext`].

mod angle;
mod modes;
mod probe;
mod registry;

pub use angle::test_angle;
pub use modes::{
    BasicSight, Blindsight, DevilsSight, Echolocation, FeelTremor, SeeAll, SeeInvisibility,
};
pub use probe::{SuppressionGuard, probe_visibility};
pub use registry::DetectionRegistry;

use crate::error::VisionError;
use crate::host::{CollisionKind, CollisionQuery, PerceptionHost};
use crate::state::{DetectionModeEntry, DetectionModeId, Point, SceneState, TokenId};

/// Which sense a detection mode works through.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "lowercase")]
pub enum DetectionType {
    Sight,
    Sound,
    Move,
    Other,
}

/// Display resource the renderer draws on a target detected by a mode.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DetectionFilter {
    Outline {
        wave: bool,
        knockout: bool,
        thickness: f64,
    },
    Glow {
        color: [f64; 4],
    },
}

/// Everything a mode may consult while testing a point.
#[derive(Clone, Copy)]
pub struct DetectionContext<'a> {
    pub scene: &'a SceneState,
    pub host: &'a dyn PerceptionHost,
    pub registry: &'a DetectionRegistry,
}

impl<'a> DetectionContext<'a> {
    pub fn new(
        scene: &'a SceneState,
        host: &'a dyn PerceptionHost,
        registry: &'a DetectionRegistry,
    ) -> Self {
        Self {
            scene,
            host,
            registry,
        }
    }
}

/// Geometry of the observing token, captured once per visibility test.
///
/// Statuses and detection entries are read live from the scene instead,
/// since probes may change them mid-test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserverView {
    pub token: TokenId,
    pub position: Point,
    pub rotation: f64,
    /// Cone width in degrees.
    pub angle: f64,
    pub external_radius: f64,
}

impl ObserverView {
    pub fn capture(scene: &SceneState, token: TokenId) -> Result<Self, VisionError> {
        let source = scene
            .borrow_token(token)
            .ok_or(VisionError::TokenNotFound(token))?;
        Ok(Self {
            token,
            position: source.position,
            rotation: source.rotation,
            angle: source.sight.angle,
            external_radius: source.external_radius,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetView {
    pub token: TokenId,
    pub position: Point,
}

impl TargetView {
    pub fn capture(scene: &SceneState, token: TokenId) -> Result<Self, VisionError> {
        let target = scene
            .borrow_token(token)
            .ok_or(VisionError::TokenNotFound(token))?;
        Ok(Self {
            token,
            position: target.position,
        })
    }
}

/// A way for an observer to perceive a target.
///
/// Modes are stateless apart from their cached display filter. Only
/// `id`, `label` and `detection_type` are required; the remaining operations
/// default to "in range and not blocked by a sight wall".
pub trait DetectionMode: Send + Sync {
    fn id(&self) -> DetectionModeId;

    fn label(&self) -> &'static str;

    fn detection_type(&self) -> DetectionType;

    /// Built on first use and cached for the life of the mode.
    fn display_filter(&self) -> Option<&DetectionFilter> {
        None
    }

    /// Cheap precondition independent of geometry.
    fn can_detect(
        &self,
        _ctx: &DetectionContext<'_>,
        _observer: &ObserverView,
        _target: &TargetView,
    ) -> bool {
        true
    }

    fn test_line_of_sight(
        &self,
        ctx: &DetectionContext<'_>,
        observer: &ObserverView,
        _target: &TargetView,
        point: Point,
    ) -> bool {
        !ctx.host.test_collision(
            observer.position,
            point,
            CollisionQuery::any(CollisionKind::Sight, observer.token),
        )
    }

    fn test_range(&self, observer: &ObserverView, entry: &DetectionModeEntry, point: Point) -> bool {
        entry.range > 0.0 && observer.position.distance_to(point) <= entry.range
    }

    /// Final decision for one sample point.
    fn test_point(
        &self,
        ctx: &DetectionContext<'_>,
        observer: &ObserverView,
        entry: &DetectionModeEntry,
        target: &TargetView,
        point: Point,
    ) -> Result<bool, VisionError> {
        Ok(self.test_range(observer, entry, point)
            && self.test_line_of_sight(ctx, observer, target, point))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scriptable host used by the detection tests.

    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::error::HostError;
    use crate::host::VisibilityQuery;

    /// Host whose walls and baseline visibility are fixed up front.
    #[derive(Default)]
    pub struct ScriptedHost<'a> {
        pub blocked: Vec<CollisionKind>,
        pub visible: bool,
        pub fail: bool,
        pub visibility_calls: Cell<usize>,
        /// Runs inside `test_visibility`, while any probe mutation is active.
        pub on_visibility: RefCell<Option<Box<dyn FnMut() + 'a>>>,
    }

    impl ScriptedHost<'_> {
        pub fn open() -> Self {
            Self {
                visible: true,
                ..Self::default()
            }
        }

        pub fn blocking(kinds: impl IntoIterator<Item = CollisionKind>) -> Self {
            Self {
                blocked: kinds.into_iter().collect(),
                ..Self::open()
            }
        }
    }

    impl PerceptionHost for ScriptedHost<'_> {
        fn test_visibility(
            &self,
            _point: Point,
            _query: VisibilityQuery,
        ) -> Result<bool, HostError> {
            self.visibility_calls.set(self.visibility_calls.get() + 1);
            if let Some(callback) = self.on_visibility.borrow_mut().as_mut() {
                callback();
            }
            if self.fail {
                return Err(HostError::new("visibility polygon not ready"));
            }
            Ok(self.visible)
        }

        fn test_collision(&self, _origin: Point, _point: Point, query: CollisionQuery) -> bool {
            self.blocked.contains(&query.kind)
        }
    }
}
