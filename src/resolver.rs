//! Step decision logic: whether an entity makes a sound this frame,
//! which acoustic, and at what base volume.

use glam::Vec3;
use thiserror::Error;

use footfall_acoustics::{AcousticsError, AcousticsPack, Locomotion, StepEvent};

use crate::config::FootfallConfig;
use crate::entity::{EntityFrame, EntityId};

/// Per-entity memory carried between frames.
///
/// Landing is an edge (airborne last frame, grounded now), and footsteps
/// are spaced by travelled distance rather than time, so the resolver
/// needs a little state per entity. Trackers live in the session and are
/// discarded with it.
#[derive(Debug, Clone, Default)]
pub struct MotionTracker {
    was_airborne: bool,
    travelled: f32,
    last_position: Option<Vec3>,
}

impl MotionTracker {
    fn advance(&mut self, frame: &EntityFrame) -> FrameMotion {
        let landed = self.was_airborne && !frame.motion.airborne;
        self.was_airborne = frame.motion.airborne;

        if let Some(last) = self.last_position {
            if !frame.motion.airborne {
                let delta = frame.position - last;
                // Horizontal travel only; vertical motion is jumps/falls.
                self.travelled += Vec3::new(delta.x, 0.0, delta.z).length();
            }
        }
        self.last_position = Some(frame.position);

        FrameMotion {
            landed,
            travelled: self.travelled,
        }
    }

    fn reset_stride(&mut self) {
        self.travelled = 0.0;
    }
}

struct FrameMotion {
    landed: bool,
    travelled: f32,
}

/// The resolver's verdict for one entity on one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct StepTrigger {
    /// Registry name of the acoustic to play.
    pub acoustic: String,
    /// Event class that produced the trigger.
    pub event: StepEvent,
    /// World position to emit at.
    pub position: Vec3,
    /// Source volume scaling to apply on top of the acoustic's own jitter.
    pub volume_scale: f32,
}

/// A per-entity resolution failure, carried to the driver boundary with
/// enough context to diagnose without stopping the frame loop.
#[derive(Debug, Error)]
#[error("sound generation failed for entity {id:?} ({kind}, {locomotion} locomotion): {source}")]
pub struct StepError {
    /// Entity the failure belongs to.
    pub id: EntityId,
    /// Entity kind name.
    pub kind: String,
    /// Locomotion classification at the time of failure.
    pub locomotion: &'static str,
    /// Underlying acoustics failure.
    #[source]
    pub source: AcousticsError,
}

/// Decide whether `frame` triggers a sound, and which.
///
/// Returns `None` for every quiet outcome: ineligible entity, airborne,
/// not enough distance travelled since the last step, or no surface
/// association for the event. Missing associations are not errors.
pub fn resolve_step(
    config: &FootfallConfig,
    pack: &AcousticsPack,
    tracker: &mut MotionTracker,
    frame: &EntityFrame,
) -> Option<StepTrigger> {
    if frame.sleeping || frame.mounted || frame.spectator {
        return None;
    }
    if pack.locomotion_of(&frame.kind) == Locomotion::Flying {
        return None;
    }

    let motion = tracker.advance(frame);

    let event = if motion.landed {
        StepEvent::Land
    } else if frame.motion.airborne {
        return None;
    } else if frame.motion.swimming || frame.surface.wading {
        if !stride_elapsed(config, frame, motion.travelled) {
            return None;
        }
        StepEvent::Splash
    } else {
        if !stride_elapsed(config, frame, motion.travelled) {
            return None;
        }
        StepEvent::Step
    };

    // Stride restarts on any emission, and also on landing so the first
    // step after touchdown is not immediate.
    tracker.reset_stride();

    let material = frame.surface.material.as_deref()?;
    let acoustic = pack.surfaces.acoustic_for(material, event)?;

    Some(StepTrigger {
        acoustic: acoustic.to_string(),
        event,
        position: frame.position,
        volume_scale: volume_for_source(config, frame),
    })
}

fn stride_elapsed(config: &FootfallConfig, frame: &EntityFrame, travelled: f32) -> bool {
    travelled >= config.stride_for_ratio(frame.motion.speed_ratio())
}

/// The volume scaling applied to every emission from `frame`.
///
/// `global * category * (1 + running_increase * speed_ratio)`, with the
/// sliders read as percentages. This is the one piece of numeric policy
/// other volume-dependent callers rely on.
pub fn volume_for_source(config: &FootfallConfig, frame: &EntityFrame) -> f32 {
    let volume = config.global_volume_factor() * config.category_volume_factor(frame.category);
    volume * (1.0 + config.running_increase_factor() * frame.motion.speed_ratio())
}
