//! Viewing-edge reconstruction engine for `visual-hull-rs`.
//!
//! This crate turns a [`CalibrationSet`](visual_hull_core::CalibrationSet)
//! plus a [`SilhouetteSet`](visual_hull_core::SilhouetteSet) into the
//! viewing-edge mesh of the polyhedral visual hull:
//! - [`HullEngine`] owns the inputs, the options, and the per-run
//!   [`ReconstructionContext`],
//! - [`ViewingEdgeReconstructor`] drives the full pass (camera ordering,
//!   epipolar primitives, distance-ordered sweep) behind the [`VisualHull`]
//!   trait,
//! - [`HullMesh`] stores generators, vertices, and viewing edges in arenas
//!   addressed by [`GeneratorId`] and [`VertexId`].
//!
//! Strip indices are camera-global: a camera's strips enumerate the edges of
//! all of its effective contours in order, and [`StripContourMap`] maps a
//! global strip back to (contour, edge).

/// Per-camera and per-run reconstruction state.
pub mod context;
/// Engine facade, options, and the reconstruction driver.
pub mod engine;
/// Engine error taxonomy.
pub mod error;
/// Generator/vertex/viewing-edge arenas.
pub mod mesh;

mod ordering;
mod primitives;
mod queue;
mod strips;
mod viewing_edges;

pub use context::{CameraContext, ReconstructionContext, StripContourMap};
pub use engine::{HullEngine, HullOptions, HullReport, ViewingEdgeReconstructor, VisualHull};
pub use error::HullError;
pub use mesh::{
    Generator, GeneratorId, HullMesh, HullVertex, StripRef, VertexId, ViewingEdgeInfo,
};
