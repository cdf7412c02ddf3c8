#![warn(missing_docs)]
//! Acoustic expression trees, the pack document format, and the
//! delayed-emission scheduler.
//!
//! An *acoustic* is a named, data-defined description of how to produce
//! one or more sound emissions: a single sound with volume/pitch jitter,
//! a weighted choice among variants, an ordered compound, or a delayed
//! wrapper. Packs are hierarchical JSON documents compiled once into
//! immutable trees; resolution draws from a caller-supplied RNG and
//! yields concrete emissions tagged with a tick offset.

mod expression;
mod parser;
mod registry;
mod scheduler;

pub use expression::{Acoustic, Emission, FloatRange, TickRange};
pub use parser::{
    acoustic_to_def, compile_pack, pack_to_def, parse_pack, serialize_pack, AcousticDef, ChildDef,
    PackDef, SurfaceDef, VariantDef,
};
pub use registry::{
    AcousticRegistry, AcousticsPack, Locomotion, StepEvent, SurfaceAcoustics, SurfaceTable,
};
pub use scheduler::{EmissionQueue, PendingEmission};

use thiserror::Error;

/// Errors emitted while loading or resolving acoustics.
#[derive(Debug, Error)]
pub enum AcousticsError {
    /// Lookup of a name absent from the registry.
    #[error("unknown acoustic '{0}'")]
    UnknownAcoustic(String),
    /// A weighted choice with no children.
    #[error("acoustic variator has no children")]
    EmptyChoice,
    /// Structural failure in the pack document.
    #[error("malformed acoustics data: {0}")]
    MalformedData(String),
    /// Document syntax failure.
    #[error("failed to parse acoustics document: {0}")]
    Parse(#[from] serde_json::Error),
}
