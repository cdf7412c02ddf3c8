//! Tick-ordered queue of pending delayed emissions.

use std::collections::BTreeMap;

use glam::Vec3;

/// A fully concrete sound instruction waiting for its tick.
///
/// Once returned from [`EmissionQueue::tick`] the queue forgets it; the
/// caller owns the actual output call.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEmission {
    /// Host-side sound identifier.
    pub sound: String,
    /// World position to play at.
    pub position: Vec3,
    /// Final playback volume.
    pub volume: f32,
    /// Playback pitch.
    pub pitch: f32,
}

/// Time-ordered collection of pending emissions keyed by ready tick.
///
/// `tick` is called at most once per frame. Firing order is ascending
/// ready tick, then insertion order within one tick.
#[derive(Debug, Default)]
pub struct EmissionQueue {
    pending: BTreeMap<u64, Vec<PendingEmission>>,
    len: usize,
}

impl EmissionQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue an emission to fire once `ready_at` is reached.
    pub fn schedule(&mut self, ready_at: u64, emission: PendingEmission) {
        self.pending.entry(ready_at).or_default().push(emission);
        self.len += 1;
    }

    /// Remove and return every emission with `ready_at <= now`.
    pub fn tick(&mut self, now: u64) -> Vec<PendingEmission> {
        let mut fired = Vec::new();
        while let Some(entry) = self.pending.first_entry() {
            if *entry.key() > now {
                break;
            }
            fired.extend(entry.remove());
        }
        self.len -= fired.len();
        fired
    }

    /// Number of emissions still pending.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop every pending emission without firing it.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.len = 0;
    }
}
