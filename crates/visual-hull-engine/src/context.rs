//! Shared working state of one reconstruction.
//!
//! Everything the passes accumulate lives here instead of on the engine
//! itself: the vertex/generator arena, per-camera strip tables, conditioning,
//! epipoles, partner assignments, and the used-camera flags. Collaborators
//! borrow the context explicitly, so there is no hidden coupling between
//! construction phases.

use visual_hull_core::{Contour, Pt2, Real, Vec2};

use crate::mesh::{GeneratorId, HullMesh};

/// Flattened strip index entry: which contour a camera-global strip id lives
/// on, and where inside that contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripContourMap {
    /// Strip index local to the owning contour.
    pub contour_strip_id: usize,
    /// Owning contour index.
    pub contour_id: usize,
}

/// Per-camera working state.
#[derive(Debug, Clone, Default)]
pub struct CameraContext {
    /// Filtered contours in conditioned image coordinates. For a camera with
    /// a boundary-touching silhouette this includes the synthesized image
    /// frame contour.
    pub contours: Vec<Contour>,
    /// Occluder flag per entry of `contours`.
    pub occluding: Vec<bool>,
    /// Conditioning offset (pixels); subtracted before scaling.
    pub offset: Vec2,
    /// Conditioning scale, `√2 / mean distance`.
    pub scale: Real,
    /// Cached `1 / scale`.
    pub inv_scale: Real,
    /// Camera-global strip id to contour-local address.
    pub strip_map: Vec<StripContourMap>,
    /// Generator per camera-global strip id, parallel to `strip_map`.
    pub generators: Vec<GeneratorId>,
    /// Conditioned epipole of this camera's sweep partner, set while
    /// primitives are built.
    pub epipole: Option<Pt2>,
    /// Partner camera whose generators sweep across this camera's strips.
    pub partner: Option<usize>,
    /// `true` when the primitives came from the image-frame fallback.
    pub boundary_primitives: bool,
}

impl CameraContext {
    /// Map a pixel-space point into conditioned coordinates.
    pub fn condition(&self, p: &Pt2) -> Pt2 {
        Pt2::new((p.x - self.offset.x) * self.scale, (p.y - self.offset.y) * self.scale)
    }

    /// Map a conditioned point back to pixel coordinates.
    pub fn decondition(&self, p: &Pt2) -> Pt2 {
        Pt2::new(
            p.x * self.inv_scale + self.offset.x,
            p.y * self.inv_scale + self.offset.y,
        )
    }

    /// Number of camera-global strips.
    pub fn num_strips(&self) -> usize {
        self.strip_map.len()
    }

    /// Contour-local address of a camera-global strip id.
    pub fn strip_entry(&self, strip: usize) -> Option<StripContourMap> {
        self.strip_map.get(strip).copied()
    }

    fn reset(&mut self) {
        *self = CameraContext::default();
    }
}

/// Working state shared by every construction phase.
#[derive(Debug, Default)]
pub struct ReconstructionContext {
    /// The growing hull arena.
    pub mesh: HullMesh,
    /// Per-camera state, indexed by camera id.
    pub cameras: Vec<CameraContext>,
    /// Cameras participating in reconstruction, ascending.
    pub silhouette_cameras: Vec<usize>,
    /// Cameras already consumed as sweep partners.
    pub used: Vec<bool>,
    /// Cached most-orthogonal partner per camera; empty until the ordering
    /// pass ran.
    pub most_orthogonal: Vec<Option<usize>>,
}

impl ReconstructionContext {
    /// Fresh context for `num_cameras` cameras.
    pub fn new(num_cameras: usize) -> Self {
        Self {
            mesh: HullMesh::new(),
            cameras: vec![CameraContext::default(); num_cameras],
            silhouette_cameras: Vec::new(),
            used: vec![false; num_cameras],
            most_orthogonal: Vec::new(),
        }
    }

    /// Number of camera slots.
    pub fn num_cameras(&self) -> usize {
        self.cameras.len()
    }

    /// Mark a camera as consumed for partner selection.
    pub fn set_camera_used(&mut self, cam: usize) {
        self.used[cam] = true;
    }

    /// `true` when the camera was consumed as a partner.
    pub fn is_camera_used(&self, cam: usize) -> bool {
        self.used[cam]
    }

    /// Drop every generator, vertex, and per-camera table so primitives can
    /// be rebuilt from scratch. The camera subset and the orthogonality
    /// table survive; a rebuild over unchanged inputs reproduces the same
    /// mesh.
    pub fn clear_generators(&mut self) {
        self.mesh.clear();
        for cam in &mut self.cameras {
            cam.reset();
        }
        for flag in &mut self.used {
            *flag = false;
        }
    }

    /// Conditioned strip endpoints by contour-local address.
    ///
    /// `None` for out-of-range addresses or degenerate contours.
    pub fn strip_points(&self, cam: usize, contour: usize, strip: usize) -> Option<(Pt2, Pt2)> {
        let ctx = self.cameras.get(cam)?;
        let c = ctx.contours.get(contour)?;
        if c.len() < 3 || strip >= c.len() {
            return None;
        }
        Some(c.edge(strip))
    }

    /// Conditioned strip endpoints by camera-global strip id.
    pub fn strip_points_global(&self, cam: usize, strip: usize) -> Option<(Pt2, Pt2)> {
        let entry = self.cameras.get(cam)?.strip_entry(strip)?;
        self.strip_points(cam, entry.contour_id, entry.contour_strip_id)
    }
}
