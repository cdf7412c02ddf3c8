//! Name registry and auxiliary lookup tables built from a loaded pack.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::expression::Acoustic;
use crate::AcousticsError;

/// Step event classes a surface can respond to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepEvent {
    /// Regular footstep on a solid surface.
    Step,
    /// Movement through shallow or deep liquid.
    Splash,
    /// Touchdown after being airborne.
    Land,
}

impl StepEvent {
    /// Stable name used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            StepEvent::Step => "step",
            StepEvent::Splash => "splash",
            StepEvent::Land => "land",
        }
    }
}

/// Locomotion classification for an entity kind.
///
/// Data-driven via the pack's `locomotions` table; anything unlisted is
/// assumed bipedal. Flying kinds never produce step sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locomotion {
    /// Two-legged gait (players, most mobs).
    #[default]
    Biped,
    /// Four-legged gait.
    Quadruped,
    /// Airborne movers with no ground contact.
    Flying,
}

impl Locomotion {
    /// Parse a locomotion from its pack spelling.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "biped" => Some(Locomotion::Biped),
            "quadruped" => Some(Locomotion::Quadruped),
            "flying" => Some(Locomotion::Flying),
            _ => None,
        }
    }

    /// The pack spelling of this classification.
    pub fn as_str(self) -> &'static str {
        match self {
            Locomotion::Biped => "biped",
            Locomotion::Quadruped => "quadruped",
            Locomotion::Flying => "flying",
        }
    }
}

/// Acoustic names a single material responds with, per event.
#[derive(Debug, Clone, Default)]
pub struct SurfaceAcoustics {
    /// Acoustic for [`StepEvent::Step`].
    pub step: Option<String>,
    /// Acoustic for [`StepEvent::Splash`].
    pub splash: Option<String>,
    /// Acoustic for [`StepEvent::Land`].
    pub land: Option<String>,
}

impl SurfaceAcoustics {
    fn acoustic_for(&self, event: StepEvent) -> Option<&str> {
        match event {
            StepEvent::Step => self.step.as_deref(),
            StepEvent::Splash => self.splash.as_deref(),
            StepEvent::Land => self.land.as_deref(),
        }
    }
}

/// Material name to per-event acoustic names.
#[derive(Debug, Clone, Default)]
pub struct SurfaceTable {
    materials: BTreeMap<String, SurfaceAcoustics>,
}

impl SurfaceTable {
    /// Build a table from parsed per-material entries.
    pub fn new(materials: BTreeMap<String, SurfaceAcoustics>) -> Self {
        Self { materials }
    }

    /// The acoustic name a material responds with for an event.
    ///
    /// A missing entry means "no sound", not an error.
    pub fn acoustic_for(&self, material: &str, event: StepEvent) -> Option<&str> {
        self.materials
            .get(material)
            .and_then(|surface| surface.acoustic_for(event))
    }

    /// Iterate materials in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SurfaceAcoustics)> {
        self.materials
            .iter()
            .map(|(material, surface)| (material.as_str(), surface))
    }

    /// Number of materials with entries.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

/// Mapping from acoustic name to compiled expression tree.
///
/// Built once per load, queried read-only until the next reload, and
/// replaced wholesale (never patched) when the pack changes.
#[derive(Debug, Clone, Default)]
pub struct AcousticRegistry {
    acoustics: HashMap<String, Arc<Acoustic>>,
}

impl AcousticRegistry {
    /// Construct a registry from compiled trees.
    pub fn new(acoustics: HashMap<String, Arc<Acoustic>>) -> Self {
        Self { acoustics }
    }

    /// Look up an acoustic by name (case-sensitive).
    pub fn lookup(&self, name: &str) -> Result<&Arc<Acoustic>, AcousticsError> {
        self.acoustics
            .get(name)
            .ok_or_else(|| AcousticsError::UnknownAcoustic(name.to_string()))
    }

    /// Whether the registry defines `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.acoustics.contains_key(name)
    }

    /// Iterate registered acoustics (unspecified order).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Acoustic>)> {
        self.acoustics
            .iter()
            .map(|(name, acoustic)| (name.as_str(), acoustic))
    }

    /// Number of registered acoustics.
    pub fn len(&self) -> usize {
        self.acoustics.len()
    }

    /// Whether the registry holds no acoustics.
    pub fn is_empty(&self) -> bool {
        self.acoustics.is_empty()
    }
}

/// Everything a single pack load produces: the registry plus the
/// auxiliary lookup tables the resolver and driver consult.
#[derive(Debug, Clone, Default)]
pub struct AcousticsPack {
    /// Compiled acoustic expressions by name.
    pub registry: AcousticRegistry,
    /// Material to acoustic-name associations.
    pub surfaces: SurfaceTable,
    /// Entity kinds excluded from stepping as golem-like.
    pub golems: HashSet<String>,
    /// Locomotion overrides by entity kind.
    pub locomotions: HashMap<String, Locomotion>,
}

impl AcousticsPack {
    /// Whether `kind` is golem-like.
    pub fn is_golem(&self, kind: &str) -> bool {
        self.golems.contains(kind)
    }

    /// Locomotion classification for `kind` (default biped).
    pub fn locomotion_of(&self, kind: &str) -> Locomotion {
        self.locomotions.get(kind).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::FloatRange;

    fn sample_registry() -> AcousticRegistry {
        let mut acoustics = HashMap::new();
        acoustics.insert(
            "grass.step".to_string(),
            Arc::new(Acoustic::Simple {
                sound: "step/grass".to_string(),
                volume: FloatRange::fixed(1.0),
                pitch: FloatRange::fixed(1.0),
            }),
        );
        AcousticRegistry::new(acoustics)
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = sample_registry();
        assert!(registry.lookup("grass.step").is_ok());
        assert!(matches!(
            registry.lookup("Grass.Step"),
            Err(AcousticsError::UnknownAcoustic(name)) if name == "Grass.Step"
        ));
    }

    #[test]
    fn test_surface_table_lookup() {
        let mut materials = BTreeMap::new();
        materials.insert(
            "grass".to_string(),
            SurfaceAcoustics {
                step: Some("grass.step".to_string()),
                splash: None,
                land: None,
            },
        );
        let table = SurfaceTable::new(materials);
        assert_eq!(table.acoustic_for("grass", StepEvent::Step), Some("grass.step"));
        assert_eq!(table.acoustic_for("grass", StepEvent::Land), None);
        assert_eq!(table.acoustic_for("stone", StepEvent::Step), None);
    }

    #[test]
    fn test_locomotion_parse() {
        assert_eq!(Locomotion::parse("biped"), Some(Locomotion::Biped));
        assert_eq!(Locomotion::parse("quadruped"), Some(Locomotion::Quadruped));
        assert_eq!(Locomotion::parse("flying"), Some(Locomotion::Flying));
        assert_eq!(Locomotion::parse("Biped"), None);
        assert_eq!(Locomotion::parse(""), None);
    }

    #[test]
    fn test_pack_defaults() {
        let pack = AcousticsPack::default();
        assert!(!pack.is_golem("iron_golem"));
        assert_eq!(pack.locomotion_of("anything"), Locomotion::Biped);
        assert!(pack.registry.is_empty());
    }
}
