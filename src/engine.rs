//! Per-frame driver: candidate filtering, resolution, and scheduling.

use std::collections::HashSet;

use glam::{IVec3, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use footfall_acoustics::{parse_pack, PendingEmission};

use crate::config::FootfallConfig;
use crate::entity::{EntityFrame, EntityId};
use crate::resolver::{self, StepError};
use crate::session::EngineSession;

/// Entities farther than this from the camera never step audibly.
const MAX_HEARING_DISTANCE_SQ: f32 = 256.0;

/// Emissions quieter than this are dropped instead of played.
const MIN_AUDIBLE_VOLUME: f32 = 0.01;

/// The host's low-level sound output call.
///
/// Playing a sound at a 3D position is assumed to be provided by the
/// host; the engine only decides what, where, and how loud.
pub trait SoundSink {
    /// Play `sound` at `position` with the given volume and pitch.
    fn play(&mut self, sound: &str, position: Vec3, volume: f32, pitch: f32);
}

/// Host-side stock sounds the engine replaces with pack-driven ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VanillaSound {
    /// The host's own player swim loop.
    PlayerSwim,
    /// The host's own player splash.
    PlayerSplash,
    /// The host's own heavy-landing sound.
    PlayerBigFall,
    /// The host's own light-landing sound.
    PlayerSmallFall,
}

/// The footstep sound engine.
///
/// Owns the user configuration, the live session (if a pack is loaded),
/// and the entropy source for jitter. All public operations are safe to
/// call from the host's frame loop: per-entity failures are logged and
/// skipped, never propagated.
pub struct SoundEngine {
    config: FootfallConfig,
    session: Option<EngineSession>,
    rng: StdRng,
}

impl SoundEngine {
    /// Create an engine with the given configuration and no data loaded.
    pub fn new(config: FootfallConfig) -> Self {
        Self {
            config,
            session: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create an engine with a fixed RNG seed, for reproducible output.
    pub fn with_seed(config: FootfallConfig, seed: u64) -> Self {
        Self {
            config,
            session: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &FootfallConfig {
        &self.config
    }

    /// Mutable configuration access (takes effect next frame).
    pub fn config_mut(&mut self) -> &mut FootfallConfig {
        &mut self.config
    }

    /// Replace the current session with one loaded from `document`.
    ///
    /// The old session is torn down first; pending emissions it held are
    /// discarded unfired. On any load failure the engine stays disabled
    /// (`has_data()` is false) and sound generation stops until the next
    /// successful reload. Fail-safe, never fail-loud.
    pub fn reload(&mut self, document: &str) -> bool {
        self.shutdown();
        if !self.config.enabled {
            return false;
        }
        match parse_pack(document) {
            Ok(pack) => {
                debug!(acoustics = pack.registry.len(), "Acoustics pack loaded");
                self.session = Some(EngineSession::new(pack));
                true
            }
            Err(err) => {
                warn!("Failed to load acoustics pack: {err}. Sound generation disabled");
                false
            }
        }
    }

    /// Discard the session, dropping pending emissions without firing.
    pub fn shutdown(&mut self) {
        self.session = None;
    }

    /// Whether a pack is currently loaded.
    pub fn has_data(&self) -> bool {
        self.session.is_some()
    }

    /// The live session, if any.
    pub fn session(&self) -> Option<&EngineSession> {
        self.session.as_ref()
    }

    /// Whether the engine generates sound right now.
    pub fn is_running(&self, paused: bool, singleplayer: bool) -> bool {
        self.has_data()
            && !paused
            && self.config.enabled
            && (singleplayer || self.config.enabled_multiplayer)
    }

    /// Whether the host should mute one of its own stock sounds in
    /// favor of the pack-driven equivalent.
    pub fn suppresses(&self, _sound: VanillaSound, paused: bool, singleplayer: bool) -> bool {
        self.is_running(paused, singleplayer)
    }

    /// The volume scaling applied to every emission from `frame`.
    pub fn volume_for_source(&self, frame: &EntityFrame) -> f32 {
        resolver::volume_for_source(&self.config, frame)
    }

    /// Advance the engine by one frame.
    ///
    /// Call at most once per rendered frame. No-op unless running.
    /// Resolves every eligible candidate (failures are isolated per
    /// entity), fires immediate emissions through `sink`, schedules
    /// delayed ones, and then flushes delayed emissions from previous
    /// frames. Emissions scheduled this frame fire no earlier than the
    /// next one.
    pub fn on_frame(
        &mut self,
        frames: &[EntityFrame],
        camera_id: EntityId,
        paused: bool,
        singleplayer: bool,
        sink: &mut dyn SoundSink,
    ) {
        if !self.is_running(paused, singleplayer) {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(camera) = frames.iter().find(|frame| frame.id == camera_id) else {
            debug!(camera = camera_id.0, "Camera entity not in frame set");
            return;
        };

        let present: HashSet<EntityId> = frames.iter().map(|frame| frame.id).collect();
        session.retain_trackers(|id| present.contains(&id));

        let now = session.tick;
        let targets = select_targets(&self.config, session, camera, frames);

        for frame in targets {
            let tracker = session.trackers.entry(frame.id).or_default();
            let Some(trigger) =
                resolver::resolve_step(&self.config, &session.pack, tracker, frame)
            else {
                continue;
            };

            let resolved = session
                .pack
                .registry
                .lookup(&trigger.acoustic)
                .and_then(|acoustic| acoustic.resolve(&mut self.rng));

            let emissions = match resolved {
                Ok(emissions) => emissions,
                Err(source) => {
                    let err = StepError {
                        id: frame.id,
                        kind: frame.kind.clone(),
                        locomotion: session.pack.locomotion_of(&frame.kind).as_str(),
                        source,
                    };
                    warn!("{err}. Skipping entity this frame");
                    continue;
                }
            };

            for emission in emissions {
                let volume = emission.volume * trigger.volume_scale;
                if volume < MIN_AUDIBLE_VOLUME {
                    continue;
                }
                if emission.offset == 0 {
                    sink.play(&emission.sound, trigger.position, volume, emission.pitch);
                } else {
                    session.queue.schedule(
                        now + emission.offset,
                        PendingEmission {
                            sound: emission.sound,
                            position: trigger.position,
                            volume,
                            pitch: emission.pitch,
                        },
                    );
                }
            }
        }

        // Delayed sounds from previous frames; anything scheduled above
        // sits at now + offset with offset >= 1 and stays pending.
        for pending in session.queue.tick(now) {
            sink.play(
                &pending.sound,
                pending.position,
                pending.volume,
                pending.pitch,
            );
        }

        session.tick = now + 1;
    }
}

/// Pick which candidates may step this frame.
///
/// Everything within hearing range that is not golem-like, mounted,
/// asleep, or spectating qualifies; past the configured cap only the
/// nearest survive, except that the camera entity and players always
/// play and co-located entities of one kind count once.
fn select_targets<'a>(
    config: &FootfallConfig,
    session: &EngineSession,
    camera: &EntityFrame,
    frames: &'a [EntityFrame],
) -> Vec<&'a EntityFrame> {
    let mut candidates: Vec<&EntityFrame> = frames
        .iter()
        .filter(|frame| {
            frame.distance_squared(camera.position) <= MAX_HEARING_DISTANCE_SQ
                && !session.pack.is_golem(&frame.kind)
                && !frame.mounted
                && !frame.sleeping
                && !frame.spectator
        })
        .collect();

    if candidates.len() <= config.max_stepping_entities {
        return candidates;
    }

    candidates.sort_by(|a, b| {
        a.distance_squared(camera.position)
            .total_cmp(&b.distance_squared(camera.position))
    });

    let mut visited: HashSet<(&str, IVec3)> = HashSet::new();
    candidates
        .into_iter()
        .filter(|frame| {
            frame.id == camera.id
                || frame.category.is_player()
                || (visited.len() < config.max_stepping_entities
                    && visited.insert((frame.kind.as_str(), frame.block_pos())))
        })
        .collect()
}
