#![warn(missing_docs)]
//! Footfall: a data-driven footstep sound engine for 3D game clients.
//!
//! Each frame the host hands the engine a set of entity snapshots and a
//! [`SoundSink`]; the engine decides which entities step, splash, or
//! land, resolves the matching data-defined acoustic into concrete
//! emissions with volume/pitch jitter, plays immediate ones through the
//! sink, and schedules delayed ones on its tick queue.
//!
//! # Architecture
//!
//! - [`SoundEngine`] - per-frame driver, session lifecycle, volume policy
//! - [`FootfallConfig`] - user-tunable TOML configuration
//! - [`acoustics`] - expression trees, the pack format, and the scheduler
//!
//! # Example
//!
//! ```ignore
//! let mut engine = SoundEngine::new(FootfallConfig::load());
//! engine.reload(&pack_document);
//! // once per rendered frame:
//! engine.on_frame(&frames, camera_id, paused, singleplayer, &mut sink);
//! ```

mod config;
mod engine;
mod entity;
mod resolver;
mod session;

pub use footfall_acoustics as acoustics;

pub use config::FootfallConfig;
pub use engine::{SoundEngine, SoundSink, VanillaSound};
pub use entity::{EntityFrame, EntityId, MotionState, SourceCategory, SurfaceContact};
pub use resolver::{resolve_step, volume_for_source, MotionTracker, StepError, StepTrigger};
pub use session::EngineSession;
