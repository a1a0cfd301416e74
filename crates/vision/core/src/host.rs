//! Primitives the engine borrows from the host.
//!
//! The host owns geometry (walls, line-of-sight polygons) and the baseline
//! visibility test. Detection modes call back into it through
//! [`PerceptionHost`]; the host's visibility test may in turn re-enter the
//! detection registry for the same observer.

use crate::error::HostError;
use crate::state::{Point, TokenId};

/// Options for the baseline visibility test.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VisibilityQuery {
    /// Sampling radius around the point; 0 tests the point alone.
    pub tolerance: f64,
    /// Token being tested, so the host can sample its footprint.
    pub object: Option<TokenId>,
}

/// What kind of wall blocks a collision ray.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum CollisionKind {
    Sight,
    Move,
    Sound,
}

/// Which collisions the host should report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CollisionMode {
    /// Any collision at all.
    #[default]
    Any,
    Closest,
    All,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionQuery {
    pub kind: CollisionKind,
    pub mode: CollisionMode,
    /// Token casting the ray, if any.
    pub source: Option<TokenId>,
}

impl CollisionQuery {
    pub const fn any(kind: CollisionKind, source: TokenId) -> Self {
        Self {
            kind,
            mode: CollisionMode::Any,
            source: Some(source),
        }
    }
}

/// Visibility and collision primitives supplied by the host.
pub trait PerceptionHost {
    /// Baseline visibility test for a point.
    fn test_visibility(&self, point: Point, query: VisibilityQuery) -> Result<bool, HostError>;

    /// Returns true if a wall of `query.kind` blocks the ray from `origin` to `point`.
    fn test_collision(&self, origin: Point, point: Point, query: CollisionQuery) -> bool;
}
