//! Calibrated camera collections.

use anyhow::{ensure, Result};

use crate::camera::ProjectiveCamera;

/// A set of calibrated cameras, addressed by a dense zero-based camera id.
///
/// Every camera carries the pixel size of its image so that boundary-touching
/// silhouettes can be detected and image-frame primitives synthesized.
#[derive(Debug, Clone)]
pub struct CalibrationSet {
    cameras: Vec<ProjectiveCamera>,
    image_sizes: Vec<(usize, usize)>,
}

impl CalibrationSet {
    /// Build a calibration set from cameras and their `(width, height)` image
    /// sizes.
    ///
    /// # Errors
    ///
    /// Fails when the set is empty, the two lists disagree in length, or an
    /// image size is zero.
    pub fn new(cameras: Vec<ProjectiveCamera>, image_sizes: Vec<(usize, usize)>) -> Result<Self> {
        ensure!(!cameras.is_empty(), "calibration set must not be empty");
        ensure!(
            cameras.len() == image_sizes.len(),
            "got {} cameras but {} image sizes",
            cameras.len(),
            image_sizes.len()
        );
        for (id, (w, h)) in image_sizes.iter().enumerate() {
            ensure!(
                *w > 0 && *h > 0,
                "camera {id} has a degenerate image size {w}x{h}"
            );
        }
        Ok(Self {
            cameras,
            image_sizes,
        })
    }

    /// Number of calibrated cameras.
    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    /// `true` when no camera is calibrated (never after construction).
    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// Camera with the given id.
    ///
    /// # Panics
    ///
    /// Panics when `cam_id` is out of range; callers validate ids up front.
    pub fn camera(&self, cam_id: usize) -> &ProjectiveCamera {
        &self.cameras[cam_id]
    }

    /// Image size `(width, height)` in pixels for the given camera.
    pub fn image_size(&self, cam_id: usize) -> (usize, usize) {
        self.image_sizes[cam_id]
    }

    /// Iterator over `(cam_id, camera)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ProjectiveCamera)> {
        self.cameras.iter().enumerate()
    }
}
