//! Engine surface and the reference reconstruction algorithm.
//!
//! [`HullEngine`] owns the inputs (calibration, silhouettes, options) and the
//! per-run [`ReconstructionContext`], and exposes the mesh-building
//! operations as a capability surface. Algorithms implement [`VisualHull`]
//! and drive an engine; [`ViewingEdgeReconstructor`] is the canonical one.

use serde::{Deserialize, Serialize};
use visual_hull_core::{CalibrationSet, Real, SilhouetteSet};

use crate::context::ReconstructionContext;
use crate::error::HullError;
use crate::mesh::HullMesh;

/// Tunable reconstruction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HullOptions {
    /// Minimum turning angle (degrees) kept by the contour filter.
    pub min_turn_deg: Real,
    /// 3D distance under which two vertices attached to one generator count
    /// as the same triple point.
    pub coincidence_tol: Real,
    /// Distance to the frame (pixels) under which a contour counts as
    /// clipped.
    pub boundary_margin: Real,
}

impl Default for HullOptions {
    fn default() -> Self {
        Self {
            min_turn_deg: 2.0,
            coincidence_tol: 1e-6,
            boundary_margin: 0.5,
        }
    }
}

/// Counters describing one completed reconstruction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HullReport {
    /// Cameras that built primitives.
    pub cameras_processed: usize,
    /// Silhouette cameras skipped for the pass.
    pub cameras_skipped: Vec<usize>,
    /// Generators allocated.
    pub generators: usize,
    /// Vertices resolved.
    pub vertices: usize,
    /// Coincident attachments recorded as triple points.
    pub triple_points: usize,
    /// Viewing edges emitted.
    pub viewing_edges: usize,
    /// Summed 3D length of the emitted viewing edges.
    pub total_edge_length: Real,
}

/// Mesh-building engine shared by hull algorithms.
#[derive(Debug)]
pub struct HullEngine {
    pub(crate) calibration: CalibrationSet,
    pub(crate) silhouettes: Option<SilhouetteSet>,
    pub(crate) options: HullOptions,
    pub(crate) ctx: ReconstructionContext,
}

impl HullEngine {
    /// Engine over a calibrated camera set, default options.
    pub fn new(calibration: CalibrationSet) -> Self {
        Self::with_options(calibration, HullOptions::default())
    }

    /// Engine over a calibrated camera set with explicit options.
    pub fn with_options(calibration: CalibrationSet, options: HullOptions) -> Self {
        let num_cameras = calibration.len();
        Self {
            calibration,
            silhouettes: None,
            options,
            ctx: ReconstructionContext::new(num_cameras),
        }
    }

    /// Calibration the engine was built over.
    pub fn calibration(&self) -> &CalibrationSet {
        &self.calibration
    }

    /// Active options.
    pub fn options(&self) -> &HullOptions {
        &self.options
    }

    /// The reconstructed mesh.
    pub fn mesh(&self) -> &HullMesh {
        &self.ctx.mesh
    }

    /// The per-run working state.
    pub fn context(&self) -> &ReconstructionContext {
        &self.ctx
    }

    /// Attach silhouette data; it must cover the same cameras as the
    /// calibration.
    pub fn set_silhouettes(&mut self, silhouettes: SilhouetteSet) -> Result<(), HullError> {
        if silhouettes.num_cameras() != self.calibration.len() {
            return Err(HullError::SilhouetteCountMismatch {
                got: silhouettes.num_cameras(),
                expected: self.calibration.len(),
            });
        }
        self.silhouettes = Some(silhouettes);
        Ok(())
    }

    /// Select the cameras participating in reconstruction.
    ///
    /// Ids are validated against the calibration, then deduplicated and kept
    /// in ascending order.
    pub fn set_silhouette_cameras(&mut self, cams: &[usize]) -> Result<(), HullError> {
        for &cam in cams {
            if cam >= self.calibration.len() {
                return Err(HullError::UnknownCamera(cam, self.calibration.len()));
            }
        }
        let mut list = cams.to_vec();
        list.sort_unstable();
        list.dedup();
        self.ctx.silhouette_cameras = list;
        Ok(())
    }

    /// Run the near-collinear point filter over every attached silhouette.
    pub fn filter_contours(&mut self) -> Result<(), HullError> {
        let min_turn = self.options.min_turn_deg;
        let Some(silhouettes) = self.silhouettes.as_mut() else {
            return Err(HullError::SilhouettesMissing);
        };
        for cam in 0..silhouettes.num_cameras() {
            if let Some(sil) = silhouettes.get_mut(cam) {
                sil.filter_by_edge_angle(min_turn);
            }
        }
        Ok(())
    }

    /// Drop all generators, vertices, and viewing edges so the next build
    /// starts from scratch. Inputs and the partner table survive.
    pub fn clear_generators(&mut self) {
        self.ctx.clear_generators();
    }

    /// Check that a full pass can run: silhouettes attached, cameras
    /// selected, and at least two of them carrying contours.
    pub fn prime(&self) -> Result<(), HullError> {
        let Some(silhouettes) = self.silhouettes.as_ref() else {
            return Err(HullError::SilhouettesMissing);
        };
        if self.ctx.silhouette_cameras.is_empty() {
            return Err(HullError::NoSilhouetteCameras);
        }
        let with_data = self
            .ctx
            .silhouette_cameras
            .iter()
            .filter(|&&cam| silhouettes.get(cam).is_some_and(|s| !s.is_empty()))
            .count();
        if with_data < 2 {
            return Err(HullError::NotEnoughCameras(with_data));
        }
        Ok(())
    }

    /// Summarize the current mesh and pass state.
    pub fn report(&self) -> HullReport {
        let mesh = &self.ctx.mesh;
        let mut cameras_processed = 0;
        let mut cameras_skipped = Vec::new();
        for &cam in &self.ctx.silhouette_cameras {
            if self.ctx.cameras[cam].partner.is_some() {
                cameras_processed += 1;
            } else {
                cameras_skipped.push(cam);
            }
        }
        let triple_points = mesh
            .generators()
            .iter()
            .map(|g| g.triple_points.len())
            .sum();
        let total_edge_length = mesh.viewing_edges().iter().map(|e| e.length()).sum();
        HullReport {
            cameras_processed,
            cameras_skipped,
            generators: mesh.num_generators(),
            vertices: mesh.num_vertices(),
            triple_points,
            viewing_edges: mesh.num_viewing_edges(),
            total_edge_length,
        }
    }
}

/// A visual hull construction algorithm.
///
/// Implementations drive a [`HullEngine`]; the engine owns the inputs and
/// the growing mesh, so several algorithms can share one engine serially.
pub trait VisualHull {
    /// Run the algorithm to completion over the engine's current inputs.
    fn compute(&mut self, engine: &mut HullEngine) -> Result<HullReport, HullError>;
}

/// Canonical reconstruction: filter, pair, build primitives, resolve
/// crossings nearest-first, emit viewing edges.
#[derive(Debug, Default, Clone, Copy)]
pub struct ViewingEdgeReconstructor;

impl VisualHull for ViewingEdgeReconstructor {
    fn compute(&mut self, engine: &mut HullEngine) -> Result<HullReport, HullError> {
        engine.prime()?;
        engine.clear_generators();
        engine.filter_contours()?;
        engine.build_most_orthogonal_cameras();
        engine.build_primitives()?;
        engine.resolve_viewing_edges();
        let report = engine.report();
        log::info!(
            "hull pass complete: {} generators, {} vertices, {} viewing edges",
            report.generators,
            report.vertices,
            report.viewing_edges
        );
        Ok(report)
    }
}
