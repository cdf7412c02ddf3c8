//! The atomic bundle of state behind one successful pack load.

use std::collections::HashMap;

use footfall_acoustics::{AcousticsPack, EmissionQueue};

use crate::entity::EntityId;
use crate::resolver::MotionTracker;

/// Everything that lives exactly as long as one loaded pack: the
/// compiled registry and lookup tables, the pending-emission queue, the
/// per-entity motion trackers, and the tick counter.
///
/// A session is created whole by a successful load and replaced (or
/// dropped) whole on reload/shutdown, so readers never observe a
/// half-built registry and pending emissions of a discarded session
/// never fire.
#[derive(Debug, Default)]
pub struct EngineSession {
    /// Compiled pack data, read-only for the session's lifetime.
    pub(crate) pack: AcousticsPack,
    /// Delayed emissions waiting for their tick.
    pub(crate) queue: EmissionQueue,
    /// Per-entity stride/landing memory.
    pub(crate) trackers: HashMap<EntityId, MotionTracker>,
    /// Current frame tick, advanced once per `on_frame`.
    pub(crate) tick: u64,
}

impl EngineSession {
    /// Start a fresh session around a loaded pack.
    pub(crate) fn new(pack: AcousticsPack) -> Self {
        Self {
            pack,
            queue: EmissionQueue::new(),
            trackers: HashMap::new(),
            tick: 0,
        }
    }

    /// Drop trackers for entities no longer present.
    pub(crate) fn retain_trackers(&mut self, keep: impl Fn(EntityId) -> bool) {
        self.trackers.retain(|id, _| keep(*id));
    }

    /// Number of delayed emissions still pending.
    pub fn pending_emissions(&self) -> usize {
        self.queue.len()
    }

    /// Current tick counter.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }
}
