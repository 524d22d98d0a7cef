//! High-level entry crate for the `visual-hull-rs` toolbox.
//!
//! Reconstructs the **viewing-edge mesh of the polyhedral visual hull** from
//! calibrated cameras and per-camera silhouette contours: every silhouette
//! edge back-projects to a wedge of space, and the hull surface is swept out
//! where those wedges intersect across cameras.
//!
//! ## Quick start
//!
//! ```no_run
//! use visual_hull::prelude::*;
//! use visual_hull::synthetic::{ellipsoid_scene, pinhole_intrinsics};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Four cameras at uneven heights, each seeing a convex silhouette of an
//! // off-center ellipsoid.
//! let k = pinhole_intrinsics(800.0, 320.0, 240.0);
//! let positions = [
//!     Pt3::new(4.9, 0.6, 1.3),
//!     Pt3::new(-0.7, 5.1, 0.9),
//!     Pt3::new(-5.2, -0.4, 1.7),
//!     Pt3::new(0.5, -4.8, 1.1),
//! ];
//! let (calibration, silhouettes) = ellipsoid_scene(
//!     &positions,
//!     &k,
//!     (640, 480),
//!     24,
//!     &Pt3::new(0.1, -0.15, 0.05),
//!     &Vec3::new(0.45, 0.35, 0.3),
//! )?;
//!
//! let mut engine = HullEngine::new(calibration);
//! engine.set_silhouette_cameras(&[0, 1, 2, 3])?;
//! engine.set_silhouettes(silhouettes)?;
//!
//! let report = ViewingEdgeReconstructor.compute(&mut engine)?;
//! println!(
//!     "{} viewing edges over {} vertices",
//!     report.viewing_edges, report.vertices
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Staged API
//!
//! [`ViewingEdgeReconstructor`] drives the whole pass. When you need to
//! inspect intermediate state (strip tables, partner assignments, the epipole
//! of a camera), run the stages yourself:
//!
//! ```no_run
//! use visual_hull::prelude::*;
//! use visual_hull::synthetic::{box_scene, pinhole_intrinsics};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let k = pinhole_intrinsics(800.0, 320.0, 240.0);
//! # let (calibration, silhouettes) = box_scene(
//! #     4, 5.0, 0.2, &k, (640, 480),
//! #     &Pt3::new(0.3, -0.15, 0.1), &Vec3::new(0.5, 0.5, 0.5))?;
//! let mut engine = HullEngine::new(calibration);
//! engine.set_silhouette_cameras(&[0, 1, 2, 3])?;
//! engine.set_silhouettes(silhouettes)?;
//!
//! engine.prime()?;
//! engine.filter_contours()?;
//! engine.build_most_orthogonal_cameras();
//! engine.build_primitives()?;
//!
//! // Inspect before sweeping: which partner does camera 0 sweep against?
//! let partner = engine.context().cameras[0].partner;
//! println!("camera 0 partner: {partner:?}");
//!
//! engine.resolve_viewing_edges();
//! println!("{} viewing edges", engine.mesh().num_viewing_edges());
//! # Ok(())
//! # }
//! ```
//!
//! Real silhouettes come in through [`core::SilhouetteSet`]: per-camera
//! contour lists with nesting hierarchies (holes) and per-contour occluder
//! flags. Contours touching the image frame, and open chains that never
//! closed, degrade that camera to image-boundary strips automatically.
//!
//! ## Module organization
//!
//! - **[`core`]**: math aliases, projective cameras, calibration and
//!   silhouette containers
//! - **[`engine`]**: the reconstruction engine, its options, errors, and the
//!   generator/vertex/viewing-edge arenas
//! - **[`synthetic`]**: deterministic synthetic scenes for tests and examples
//! - **[`prelude`]**: the most used types in one import
//!
//! ## Stability
//!
//! The `visual-hull` crate is the public compatibility boundary. The
//! lower-level crates are intended for advanced usage and may evolve more
//! quickly.

/// Core math types, projective cameras, and silhouette containers.
///
/// This module contains the fundamental building blocks used throughout the
/// library.
pub mod core {
    pub use visual_hull_core::*;
}

/// The reconstruction engine: options, per-run context, mesh arenas, and the
/// algorithms driving them.
pub mod engine {
    pub use visual_hull_engine::*;
}

/// Deterministic synthetic scenes (camera rigs, convex pixel-snapped silhouettes).
///
/// Use these to exercise the engine without real segmentation data.
pub mod synthetic {
    pub use visual_hull_core::synthetic::*;
}

/// The most used types in one import.
///
/// `use visual_hull::prelude::*;` covers a typical reconstruction run.
pub mod prelude {
    // Common types
    pub use crate::core::{
        CalibrationSet, CameraSilhouette, Contour, ContourHierarchy, Iso3, Mat3, Mat34,
        ProjectiveCamera, Pt2, Pt3, Real, SilhouetteSet, Vec2, Vec3, WorldRay,
    };

    // Engine surface
    pub use crate::engine::{
        HullEngine, HullError, HullOptions, HullReport, ViewingEdgeReconstructor, VisualHull,
    };

    // Mesh arenas
    pub use crate::engine::{
        Generator, GeneratorId, HullMesh, HullVertex, StripRef, VertexId, ViewingEdgeInfo,
    };
}
