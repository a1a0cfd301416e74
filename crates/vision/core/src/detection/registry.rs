use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::error::VisionError;
use crate::state::{DetectionModeEntry, DetectionModeId, Point};

use super::modes::{
    BasicSight, Blindsight, DevilsSight, Echolocation, FeelTremor, SeeAll, SeeInvisibility,
};
use super::{DetectionContext, DetectionMode, DetectionType, ObserverView, TargetView};

/// Detection modes by id, shared with the host's visibility test.
#[derive(Clone, Default)]
pub struct DetectionRegistry {
    modes: HashMap<DetectionModeId, Arc<dyn DetectionMode>>,
}

impl DetectionRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding every built-in mode.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        let modes: [Arc<dyn DetectionMode>; 7] = [
            Arc::new(BasicSight),
            Arc::new(Blindsight::default()),
            Arc::new(DevilsSight),
            Arc::new(Echolocation::default()),
            Arc::new(SeeAll),
            Arc::new(FeelTremor::default()),
            Arc::new(SeeInvisibility::default()),
        ];
        for mode in modes {
            registry.register(mode);
        }
        registry
    }

    /// Adds a mode, replacing any mode with the same id.
    pub fn register(&mut self, mode: Arc<dyn DetectionMode>) {
        self.modes.insert(mode.id(), mode);
    }

    pub fn get(&self, id: &DetectionModeId) -> Option<&Arc<dyn DetectionMode>> {
        self.modes.get(id)
    }

    pub fn require(&self, id: &DetectionModeId) -> Result<&Arc<dyn DetectionMode>, VisionError> {
        self.get(id)
            .ok_or_else(|| VisionError::UnknownDetectionMode(id.clone()))
    }

    /// Detection type of a registered mode.
    pub fn detection_type(&self, id: &DetectionModeId) -> Option<DetectionType> {
        self.get(id).map(|mode| mode.detection_type())
    }

    /// Registered modes, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn DetectionMode>> {
        self.modes.values()
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Whether `observer` perceives `target` through `entry` at any of `points`.
    ///
    /// A disabled entry or a failed precondition answers false without
    /// touching geometry.
    pub fn test_visibility(
        &self,
        ctx: &DetectionContext<'_>,
        observer: &ObserverView,
        entry: &DetectionModeEntry,
        target: &TargetView,
        points: &[Point],
    ) -> Result<bool, VisionError> {
        if !entry.enabled {
            return Ok(false);
        }
        let mode = self.require(&entry.id)?;
        if !mode.can_detect(ctx, observer, target) {
            trace!(mode = %entry.id, observer = %observer.token, target = %target.token, "precondition failed");
            return Ok(false);
        }

        for &point in points {
            if mode.test_point(ctx, observer, entry, target, point)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl std::fmt::Debug for DetectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.modes.keys().collect();
        ids.sort();
        f.debug_struct("DetectionRegistry").field("modes", &ids).finish()
    }
}
