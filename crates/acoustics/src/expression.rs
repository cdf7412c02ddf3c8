//! Acoustic expression trees and their resolution into concrete emissions.

use std::sync::Arc;

use rand::Rng;

use crate::AcousticsError;

/// Inclusive floating-point range sampled once per resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatRange {
    /// Lower bound (inclusive).
    pub min: f32,
    /// Upper bound (inclusive).
    pub max: f32,
}

impl FloatRange {
    /// A degenerate range that always yields `value`.
    pub const fn fixed(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Build a range, rejecting inverted or non-finite bounds.
    pub fn new(min: f32, max: f32) -> Result<Self, AcousticsError> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(AcousticsError::MalformedData(format!(
                "invalid range: min {min} max {max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// Draw uniformly from the range.
    pub fn sample(&self, rng: &mut impl Rng) -> f32 {
        if self.min >= self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }

    /// Whether the range collapses to a single value.
    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }
}

/// Inclusive integer tick range used for playback delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRange {
    /// Lower bound in ticks (inclusive).
    pub min: u64,
    /// Upper bound in ticks (inclusive).
    pub max: u64,
}

impl TickRange {
    /// Build a range, rejecting inverted bounds.
    pub fn new(min: u64, max: u64) -> Result<Self, AcousticsError> {
        if min > max {
            return Err(AcousticsError::MalformedData(format!(
                "invalid delay range: min {min} max {max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// Draw uniformly from the range.
    pub fn sample(&self, rng: &mut impl Rng) -> u64 {
        if self.min >= self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }

    /// Whether the range collapses to a single value.
    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }
}

/// One concrete, ready-to-play sound instruction.
///
/// `offset` is the number of ticks to defer playback; 0 means play
/// immediately on the frame that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    /// Host-side sound identifier (e.g. `"step/grass"`).
    pub sound: String,
    /// Playback volume before any source scaling.
    pub volume: f32,
    /// Playback pitch.
    pub pitch: f32,
    /// Fire-time offset in ticks relative to the resolving frame.
    pub offset: u64,
}

/// A data-defined description of how to produce one or more emissions.
///
/// Trees are built once at pack load time, are acyclic by construction,
/// and are never mutated afterwards, so shared [`Arc`] nodes are safe to
/// resolve concurrently.
#[derive(Debug, Clone)]
pub enum Acoustic {
    /// A single named sound with volume/pitch jitter.
    Simple {
        /// Host-side sound identifier.
        sound: String,
        /// Volume range sampled per emission.
        volume: FloatRange,
        /// Pitch range sampled per emission.
        pitch: FloatRange,
    },
    /// Weighted random choice among child expressions.
    Variator {
        /// Children with selection weights; weights need not sum to 1.
        children: Vec<(Arc<Acoustic>, f32)>,
    },
    /// All children resolved in declared order.
    Compound {
        /// Children resolved front to back.
        children: Vec<Arc<Acoustic>>,
    },
    /// Defers the inner expression by a randomized tick delay.
    Delayed {
        /// Wrapped expression.
        inner: Arc<Acoustic>,
        /// Delay range in ticks, inclusive bounds.
        delay: TickRange,
    },
}

impl Acoustic {
    /// Resolve this expression into concrete emissions.
    ///
    /// Emissions with `offset == 0` must be played inline by the caller;
    /// emissions with `offset > 0` must be routed into the scheduler.
    pub fn resolve(&self, rng: &mut impl Rng) -> Result<Vec<Emission>, AcousticsError> {
        let mut out = Vec::new();
        self.resolve_into(rng, 0, &mut out)?;
        Ok(out)
    }

    fn resolve_into(
        &self,
        rng: &mut impl Rng,
        base_offset: u64,
        out: &mut Vec<Emission>,
    ) -> Result<(), AcousticsError> {
        match self {
            Acoustic::Simple {
                sound,
                volume,
                pitch,
            } => {
                out.push(Emission {
                    sound: sound.clone(),
                    volume: volume.sample(rng),
                    pitch: pitch.sample(rng),
                    offset: base_offset,
                });
            }
            Acoustic::Variator { children } => {
                let chosen = Self::pick_weighted(children, rng)?;
                chosen.resolve_into(rng, base_offset, out)?;
            }
            Acoustic::Compound { children } => {
                // Each child consumes its own draws from the shared RNG.
                for child in children {
                    child.resolve_into(rng, base_offset, out)?;
                }
            }
            Acoustic::Delayed { inner, delay } => {
                let deferral = delay.sample(rng);
                inner.resolve_into(rng, base_offset + deferral, out)?;
            }
        }
        Ok(())
    }

    /// Cumulative-weight draw over `[0, total)`.
    ///
    /// A zero-weight child is unreachable unless every weight is zero, in
    /// which case the first child wins.
    fn pick_weighted<'a>(
        children: &'a [(Arc<Acoustic>, f32)],
        rng: &mut impl Rng,
    ) -> Result<&'a Arc<Acoustic>, AcousticsError> {
        let (first, _) = children.first().ok_or(AcousticsError::EmptyChoice)?;

        let total: f32 = children.iter().map(|(_, weight)| weight).sum();
        if total <= 0.0 {
            return Ok(first);
        }

        let roll = rng.gen_range(0.0..total);
        let mut accumulated = 0.0;
        for (child, weight) in children {
            accumulated += weight;
            if roll < accumulated {
                return Ok(child);
            }
        }
        // Float accumulation can land exactly on `total`; the last child
        // owns that edge.
        Ok(&children[children.len() - 1].0)
    }
}
