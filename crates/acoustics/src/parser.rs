//! Acoustics pack schema, validation, and compilation into expression trees.
//!
//! Packs are authored as one JSON document (object-of-objects). Loading is
//! all-or-nothing: a malformed entry anywhere fails the entire pack, so
//! the engine either has a complete, consistent data set or none at all.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::expression::{Acoustic, FloatRange, TickRange};
use crate::registry::{AcousticRegistry, AcousticsPack, Locomotion, SurfaceAcoustics, SurfaceTable};
use crate::AcousticsError;

/// One acoustic definition as authored in the pack document.
///
/// Field names are load-bearing: existing authored content uses exactly
/// these spellings (`volume` vs `volume_min`/`volume_max`, etc.).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AcousticDef {
    /// Host-side sound identifier; marks a leaf definition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    /// Fixed volume shorthand (min == max).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
    /// Volume lower bound; paired with `volume_max`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_min: Option<f32>,
    /// Volume upper bound; paired with `volume_min`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_max: Option<f32>,
    /// Fixed pitch shorthand (min == max).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f32>,
    /// Pitch lower bound; paired with `pitch_max`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch_min: Option<f32>,
    /// Pitch upper bound; paired with `pitch_min`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch_max: Option<f32>,
    /// Fixed delay shorthand in ticks (min == max).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
    /// Delay lower bound in ticks; paired with `delay_max`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_min: Option<u64>,
    /// Delay upper bound in ticks; paired with `delay_min`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_max: Option<u64>,
    /// Weighted-choice children; marks a variator definition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<VariantDef>>,
    /// Ordered children; marks a compound definition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<Vec<ChildDef>>,
    /// Wrapped child; marks a delayed definition (delay bounds required).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play: Option<Box<ChildDef>>,
}

/// One weighted child of a variator definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantDef {
    /// Selection weight; weights need not sum to 1.
    pub weight: f32,
    /// The child to play when selected.
    pub play: ChildDef,
}

/// A child expression: either a reference to a named acoustic or an
/// inline definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChildDef {
    /// Reference to another acoustic in the same pack, by name.
    Name(String),
    /// Inline anonymous definition.
    Inline(Box<AcousticDef>),
}

/// Per-material acoustic names, one per step event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct SurfaceDef {
    /// Acoustic played for a regular footstep.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
    /// Acoustic played when wading or swimming.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splash: Option<String>,
    /// Acoustic played on landing after a fall.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub land: Option<String>,
}

/// Top-level pack document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct PackDef {
    /// Named acoustic definitions.
    pub acoustics: BTreeMap<String, AcousticDef>,
    /// Material name to per-event acoustic names.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub surfaces: BTreeMap<String, SurfaceDef>,
    /// Entity kinds treated as golem-like (excluded from stepping).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub golems: Vec<String>,
    /// Entity kind to locomotion classification overrides.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub locomotions: BTreeMap<String, String>,
}

/// Parse and compile a pack document.
pub fn parse_pack(input: &str) -> Result<AcousticsPack, AcousticsError> {
    let def: PackDef = serde_json::from_str(input)?;
    compile_pack(&def)
}

/// Compile an already-deserialized pack document.
pub fn compile_pack(def: &PackDef) -> Result<AcousticsPack, AcousticsError> {
    let mut compiler = Compiler {
        defs: &def.acoustics,
        built: HashMap::new(),
        in_progress: HashSet::new(),
    };

    let mut acoustics = HashMap::with_capacity(def.acoustics.len());
    for name in def.acoustics.keys() {
        acoustics.insert(name.clone(), compiler.compile_named(name)?);
    }

    let surfaces = def
        .surfaces
        .iter()
        .map(|(material, surface)| {
            (
                material.clone(),
                SurfaceAcoustics {
                    step: surface.step.clone(),
                    splash: surface.splash.clone(),
                    land: surface.land.clone(),
                },
            )
        })
        .collect();

    let mut locomotions = HashMap::new();
    for (kind, value) in &def.locomotions {
        let locomotion = Locomotion::parse(value).ok_or_else(|| {
            AcousticsError::MalformedData(format!("unknown locomotion '{value}' for '{kind}'"))
        })?;
        locomotions.insert(kind.clone(), locomotion);
    }

    tracing::debug!(
        acoustics = acoustics.len(),
        surfaces = def.surfaces.len(),
        golems = def.golems.len(),
        "Compiled acoustics pack"
    );

    Ok(AcousticsPack {
        registry: AcousticRegistry::new(acoustics),
        surfaces: SurfaceTable::new(surfaces),
        golems: def.golems.iter().cloned().collect(),
        locomotions,
    })
}

struct Compiler<'a> {
    defs: &'a BTreeMap<String, AcousticDef>,
    built: HashMap<String, Arc<Acoustic>>,
    in_progress: HashSet<String>,
}

impl Compiler<'_> {
    fn compile_named(&mut self, name: &str) -> Result<Arc<Acoustic>, AcousticsError> {
        if let Some(existing) = self.built.get(name) {
            return Ok(existing.clone());
        }
        if !self.in_progress.insert(name.to_string()) {
            return Err(AcousticsError::MalformedData(format!(
                "acoustic reference cycle through '{name}'"
            )));
        }

        let def = self.defs.get(name).cloned().ok_or_else(|| {
            AcousticsError::MalformedData(format!("reference to undefined acoustic '{name}'"))
        })?;
        let compiled = Arc::new(self.compile_def(name, &def)?);

        self.in_progress.remove(name);
        self.built.insert(name.to_string(), compiled.clone());
        Ok(compiled)
    }

    fn compile_def(&mut self, context: &str, def: &AcousticDef) -> Result<Acoustic, AcousticsError> {
        let delay = tick_range(context, def.delay, def.delay_min, def.delay_max)?;

        match (&def.sound, &def.variants, &def.sequence, &def.play) {
            (Some(sound), None, None, None) => {
                let volume =
                    float_range(context, "volume", def.volume, def.volume_min, def.volume_max)?
                        .unwrap_or(FloatRange::fixed(1.0));
                let pitch =
                    float_range(context, "pitch", def.pitch, def.pitch_min, def.pitch_max)?
                        .unwrap_or(FloatRange::fixed(1.0));
                let leaf = Acoustic::Simple {
                    sound: sound.clone(),
                    volume,
                    pitch,
                };
                // A sound with delay bounds is a delayed leaf.
                Ok(match delay {
                    Some(delay) => Acoustic::Delayed {
                        inner: Arc::new(leaf),
                        delay,
                    },
                    None => leaf,
                })
            }
            (None, Some(variants), None, None) => {
                self.reject_jitter_fields(context, def)?;
                self.reject_delay(context, delay)?;
                if variants.is_empty() {
                    return Err(AcousticsError::MalformedData(format!(
                        "{context}: variants list is empty"
                    )));
                }
                let mut children = Vec::with_capacity(variants.len());
                for variant in variants {
                    if !variant.weight.is_finite() || variant.weight < 0.0 {
                        return Err(AcousticsError::MalformedData(format!(
                            "{context}: invalid variant weight {}",
                            variant.weight
                        )));
                    }
                    children.push((self.compile_child(context, &variant.play)?, variant.weight));
                }
                Ok(Acoustic::Variator { children })
            }
            (None, None, Some(sequence), None) => {
                self.reject_jitter_fields(context, def)?;
                self.reject_delay(context, delay)?;
                let mut children = Vec::with_capacity(sequence.len());
                for child in sequence {
                    children.push(self.compile_child(context, child)?);
                }
                Ok(Acoustic::Compound { children })
            }
            (None, None, None, Some(play)) => {
                self.reject_jitter_fields(context, def)?;
                let delay = delay.ok_or_else(|| {
                    AcousticsError::MalformedData(format!(
                        "{context}: delayed acoustic is missing delay bounds"
                    ))
                })?;
                Ok(Acoustic::Delayed {
                    inner: self.compile_child(context, play)?,
                    delay,
                })
            }
            _ => Err(AcousticsError::MalformedData(format!(
                "{context}: definition must have exactly one of sound, variants, sequence, or play"
            ))),
        }
    }

    fn compile_child(
        &mut self,
        context: &str,
        child: &ChildDef,
    ) -> Result<Arc<Acoustic>, AcousticsError> {
        match child {
            ChildDef::Name(name) => {
                if !self.defs.contains_key(name) {
                    return Err(AcousticsError::MalformedData(format!(
                        "{context}: reference to undefined acoustic '{name}'"
                    )));
                }
                self.compile_named(name)
            }
            ChildDef::Inline(def) => Ok(Arc::new(self.compile_def(context, def)?)),
        }
    }

    fn reject_jitter_fields(&self, context: &str, def: &AcousticDef) -> Result<(), AcousticsError> {
        if def.volume.is_some()
            || def.volume_min.is_some()
            || def.volume_max.is_some()
            || def.pitch.is_some()
            || def.pitch_min.is_some()
            || def.pitch_max.is_some()
        {
            return Err(AcousticsError::MalformedData(format!(
                "{context}: volume and pitch fields are only valid on sound definitions"
            )));
        }
        Ok(())
    }

    fn reject_delay(&self, context: &str, delay: Option<TickRange>) -> Result<(), AcousticsError> {
        if delay.is_some() {
            return Err(AcousticsError::MalformedData(format!(
                "{context}: delay fields are only valid on sound or play definitions"
            )));
        }
        Ok(())
    }
}

fn float_range(
    context: &str,
    field: &str,
    scalar: Option<f32>,
    min: Option<f32>,
    max: Option<f32>,
) -> Result<Option<FloatRange>, AcousticsError> {
    match (scalar, min, max) {
        (Some(value), None, None) => Ok(Some(FloatRange::new(value, value)?)),
        (None, Some(min), Some(max)) => Ok(Some(FloatRange::new(min, max)?)),
        (None, None, None) => Ok(None),
        _ => Err(AcousticsError::MalformedData(format!(
            "{context}: {field} must be either a scalar or a {field}_min/{field}_max pair"
        ))),
    }
}

fn tick_range(
    context: &str,
    scalar: Option<u64>,
    min: Option<u64>,
    max: Option<u64>,
) -> Result<Option<TickRange>, AcousticsError> {
    match (scalar, min, max) {
        (Some(value), None, None) => Ok(Some(TickRange::new(value, value)?)),
        (None, Some(min), Some(max)) => Ok(Some(TickRange::new(min, max)?)),
        (None, None, None) => Ok(None),
        _ => Err(AcousticsError::MalformedData(format!(
            "{context}: delay must be either a scalar or a delay_min/delay_max pair"
        ))),
    }
}

/// Reconstruct the authored form of a compiled expression.
///
/// Fixed ranges serialize back to the scalar shorthand and ranged bounds
/// to the min/max pair, so all bounds round-trip exactly. Name references
/// come back as inline definitions (the compiled tree no longer knows the
/// original names); the resolved behavior is unchanged.
pub fn acoustic_to_def(acoustic: &Acoustic) -> AcousticDef {
    match acoustic {
        Acoustic::Simple {
            sound,
            volume,
            pitch,
        } => {
            let mut def = AcousticDef {
                sound: Some(sound.clone()),
                ..AcousticDef::default()
            };
            write_float_range(
                &mut def.volume,
                &mut def.volume_min,
                &mut def.volume_max,
                *volume,
            );
            write_float_range(
                &mut def.pitch,
                &mut def.pitch_min,
                &mut def.pitch_max,
                *pitch,
            );
            def
        }
        Acoustic::Variator { children } => AcousticDef {
            variants: Some(
                children
                    .iter()
                    .map(|(child, weight)| VariantDef {
                        weight: *weight,
                        play: ChildDef::Inline(Box::new(acoustic_to_def(child))),
                    })
                    .collect(),
            ),
            ..AcousticDef::default()
        },
        Acoustic::Compound { children } => AcousticDef {
            sequence: Some(
                children
                    .iter()
                    .map(|child| ChildDef::Inline(Box::new(acoustic_to_def(child))))
                    .collect(),
            ),
            ..AcousticDef::default()
        },
        Acoustic::Delayed { inner, delay } => {
            // Delayed leaves keep the combined sound-with-delay form.
            let mut def = match inner.as_ref() {
                simple @ Acoustic::Simple { .. } => acoustic_to_def(simple),
                other => AcousticDef {
                    play: Some(Box::new(ChildDef::Inline(Box::new(acoustic_to_def(other))))),
                    ..AcousticDef::default()
                },
            };
            if delay.is_fixed() {
                def.delay = Some(delay.min);
            } else {
                def.delay_min = Some(delay.min);
                def.delay_max = Some(delay.max);
            }
            def
        }
    }
}

fn write_float_range(
    scalar: &mut Option<f32>,
    min: &mut Option<f32>,
    max: &mut Option<f32>,
    range: FloatRange,
) {
    if range.is_fixed() {
        if range.min != 1.0 {
            *scalar = Some(range.min);
        }
    } else {
        *min = Some(range.min);
        *max = Some(range.max);
    }
}

/// Serialize a compiled pack back into a document.
pub fn pack_to_def(pack: &AcousticsPack) -> PackDef {
    let acoustics = pack
        .registry
        .iter()
        .map(|(name, acoustic)| (name.to_string(), acoustic_to_def(acoustic)))
        .collect();

    let surfaces = pack
        .surfaces
        .iter()
        .map(|(material, surface)| {
            (
                material.to_string(),
                SurfaceDef {
                    step: surface.step.clone(),
                    splash: surface.splash.clone(),
                    land: surface.land.clone(),
                },
            )
        })
        .collect();

    let mut golems: Vec<String> = pack.golems.iter().cloned().collect();
    golems.sort();

    let locomotions = pack
        .locomotions
        .iter()
        .map(|(kind, locomotion)| (kind.clone(), locomotion.as_str().to_string()))
        .collect();

    PackDef {
        acoustics,
        surfaces,
        golems,
        locomotions,
    }
}

/// Serialize a compiled pack to a JSON document string.
pub fn serialize_pack(pack: &AcousticsPack) -> Result<String, AcousticsError> {
    Ok(serde_json::to_string_pretty(&pack_to_def(pack))?)
}
