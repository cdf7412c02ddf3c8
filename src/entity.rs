//! Read-only per-frame entity snapshots supplied by the host.
//!
//! The engine never owns entity state: the host's driver enumerates
//! candidates each frame and hands over one [`EntityFrame`] per entity.
//! Everything here is plain data so the core stays independent of the
//! host's world representation.

use glam::{IVec3, Vec3};

/// Stable host-side entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// Volume category of a sound source.
///
/// Each category has an independently configurable volume slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceCategory {
    /// The player behind the local camera.
    ClientPlayer,
    /// Any other player.
    OtherPlayer,
    /// Hostile mobs.
    Hostile,
    /// Everything else that walks.
    Passive,
}

impl SourceCategory {
    /// Whether this category is a player of some kind.
    pub fn is_player(self) -> bool {
        matches!(
            self,
            SourceCategory::ClientPlayer | SourceCategory::OtherPlayer
        )
    }
}

/// Instantaneous motion readings for one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionState {
    /// Current horizontal speed in blocks per tick.
    pub speed: f32,
    /// The entity's walking speed per the host's movement metric.
    pub max_walk_speed: f32,
    /// The entity's full sprint speed per the host's movement metric.
    pub max_sprint_speed: f32,
    /// No ground contact this frame.
    pub airborne: bool,
    /// Submerged and actively swimming.
    pub swimming: bool,
}

impl MotionState {
    /// How far into the walk-to-sprint span the entity currently is.
    ///
    /// 0 at or below walking speed, 1 at full sprint, linear between.
    /// A degenerate span (sprint <= walk) reads as 0.
    pub fn speed_ratio(&self) -> f32 {
        let span = self.max_sprint_speed - self.max_walk_speed;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.speed - self.max_walk_speed) / span).clamp(0.0, 1.0)
    }
}

/// What the entity is standing on or in, per the host's detection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceContact {
    /// Material under the entity, if any (e.g. `"grass"`).
    pub material: Option<String>,
    /// Standing in shallow liquid without swimming.
    pub wading: bool,
}

/// One candidate entity for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityFrame {
    /// Stable identifier.
    pub id: EntityId,
    /// Entity kind name, matched against the pack's lookup tables.
    pub kind: String,
    /// Volume category.
    pub category: SourceCategory,
    /// World position of the feet.
    pub position: Vec3,
    /// Motion readings.
    pub motion: MotionState,
    /// Surface detection result.
    pub surface: SurfaceContact,
    /// Asleep (never steps).
    pub sleeping: bool,
    /// Riding another entity (the mount steps, not the rider).
    pub mounted: bool,
    /// Spectating player (inaudible).
    pub spectator: bool,
}

impl EntityFrame {
    /// The block cell containing the entity's feet.
    pub fn block_pos(&self) -> IVec3 {
        IVec3::new(
            self.position.x.floor() as i32,
            self.position.y.floor() as i32,
            self.position.z.floor() as i32,
        )
    }

    /// Squared distance to another position.
    pub fn distance_squared(&self, to: Vec3) -> f32 {
        self.position.distance_squared(to)
    }
}
