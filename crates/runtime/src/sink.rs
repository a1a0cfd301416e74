//! Where the orchestrator sends its "recompute perception" signal.

/// What the host should redo after a batch changed token perception.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PerceptionRefresh {
    /// Rebuild vision sources (and re-run visibility tests).
    pub initialize_vision: bool,
    pub refresh_lighting: bool,
}

impl PerceptionRefresh {
    pub const FULL: Self = Self {
        initialize_vision: true,
        refresh_lighting: true,
    };
}

/// Receives at most one refresh per processed batch.
pub trait PerceptionSink {
    fn refresh(&mut self, refresh: PerceptionRefresh);
}

/// Records every signal, in order.
impl PerceptionSink for Vec<PerceptionRefresh> {
    fn refresh(&mut self, refresh: PerceptionRefresh) {
        self.push(refresh);
    }
}
