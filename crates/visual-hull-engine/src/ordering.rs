//! Camera pairing by viewing-direction orthogonality.
//!
//! Strips sweep fastest across a partner image when the two viewing
//! directions are close to perpendicular, so each camera pairs with the
//! silhouette camera minimizing `|dot(dir_a, dir_b)|`. Every camera is
//! consumed as a partner at most once per pass.

use visual_hull_core::Real;

use crate::engine::HullEngine;

impl HullEngine {
    /// Fill the cached partner table for every silhouette camera.
    ///
    /// Ties resolve to the lower camera id. Cameras outside the silhouette
    /// set keep `None`.
    pub fn build_most_orthogonal_cameras(&mut self) {
        let mut table = vec![None; self.ctx.num_cameras()];
        for &cam in &self.ctx.silhouette_cameras {
            let best = self.scan_most_orthogonal(cam, |_| true);
            log::debug!("camera {cam}: most orthogonal silhouette camera {best:?}");
            table[cam] = best;
        }
        self.ctx.most_orthogonal = table;
    }

    /// Partner for `cam`: the cached choice when it is still unused,
    /// otherwise the best among the currently unused silhouette cameras.
    ///
    /// `None` when every other silhouette camera has been consumed; the
    /// caller skips the camera for this pass.
    pub fn most_orthogonal_unused_camera(&self, cam: usize) -> Option<usize> {
        if let Some(&Some(partner)) = self.ctx.most_orthogonal.get(cam) {
            if !self.ctx.is_camera_used(partner) {
                return Some(partner);
            }
        }
        self.scan_most_orthogonal(cam, |c| !self.ctx.is_camera_used(c))
    }

    /// Mark a camera consumed for pairing.
    pub fn set_camera_used(&mut self, cam: usize) {
        self.ctx.set_camera_used(cam);
    }

    fn scan_most_orthogonal<F>(&self, cam: usize, accept: F) -> Option<usize>
    where
        F: Fn(usize) -> bool,
    {
        let dir = self.calibration.camera(cam).viewing_direction();
        let mut best: Option<(usize, Real)> = None;
        for &other in &self.ctx.silhouette_cameras {
            if other == cam || !accept(other) {
                continue;
            }
            let score = dir
                .dot(&self.calibration.camera(other).viewing_direction())
                .abs();
            if best.map_or(true, |(_, s)| score < s) {
                best = Some((other, score));
            }
        }
        best.map(|(id, _)| id)
    }
}
