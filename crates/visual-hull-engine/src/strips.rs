//! Strip-level 2D geometry.
//!
//! A strip is the epipolar wedge spanned by one contour edge: the region
//! between the two rays from the camera's stored epipole through the edge
//! endpoints. Every query here runs in the owning camera's conditioned image
//! coordinates, so callers condition pixel inputs first.

use visual_hull_core::{
    cross2, is_inside_to_edge, ray_segment_intersection, segment_intersection, Intersection2,
    Pt2, Real,
};

use crate::context::ReconstructionContext;

impl ReconstructionContext {
    /// Wedge membership test.
    ///
    /// `p` must lie strictly inside both bounding epipolar edges of the strip,
    /// left of (epipole, edge start) and left of (edge end, epipole). The
    /// bounding edges are oriented from whichever side of the contour edge the
    /// epipole sits on, so the test is independent of where the partner camera
    /// ended up. Points on a bounding ray are outside, as is everything when
    /// the camera has no epipole or the strip address is invalid.
    pub fn is_inside_strip(&self, cam: usize, contour: usize, strip: usize, p: &Pt2) -> bool {
        let Some(e) = self.cameras.get(cam).and_then(|c| c.epipole) else {
            return false;
        };
        let Some((a, b)) = self.strip_points(cam, contour, strip) else {
            return false;
        };
        if is_inside_to_edge(&e, &a, &b) {
            is_inside_to_edge(&e, &a, p) && is_inside_to_edge(&b, &e, p)
        } else {
            is_inside_to_edge(&a, &e, p) && is_inside_to_edge(&e, &b, p)
        }
    }

    /// Distance from `epipole` to the strip's contour edge along the ray
    /// toward `second_point`.
    ///
    /// `Real::INFINITY` when the ray misses the edge, crosses it behind the
    /// epipole or through an endpoint, or the address is invalid. Finite
    /// results order strips monotonically along one epipolar sweep.
    pub fn distance_to_strip(
        &self,
        epipole: &Pt2,
        second_point: &Pt2,
        cam: usize,
        contour: usize,
        strip: usize,
    ) -> Real {
        let Some((a, b)) = self.strip_points(cam, contour, strip) else {
            return Real::INFINITY;
        };
        match ray_segment_intersection(epipole, second_point, &a, &b) {
            Some(hit) => (hit.point - epipole).norm(),
            None => Real::INFINITY,
        }
    }

    /// Crossing of the segment `end1 → end2` with the strip's contour edge.
    ///
    /// `Some` only for a strict-interior crossing of both spans; parallel and
    /// endpoint-touching configurations yield `None`, never a degenerate
    /// point.
    pub fn strip_edge_intersection(
        &self,
        cam: usize,
        contour: usize,
        strip: usize,
        end1: &Pt2,
        end2: &Pt2,
    ) -> Option<Intersection2<Real>> {
        let (a, b) = self.strip_points(cam, contour, strip)?;
        segment_intersection(end1, end2, &a, &b)
    }

    /// `true` when the strip's contour edge faces the camera's epipole, i.e.
    /// the epipole lies on the non-material side of the directed edge. Rays
    /// from the epipole enter the silhouette through front-facing strips and
    /// leave through back-facing ones.
    pub fn strip_faces_epipole(&self, cam: usize, contour: usize, strip: usize) -> bool {
        let Some(e) = self.cameras.get(cam).and_then(|c| c.epipole) else {
            return false;
        };
        let Some((a, b)) = self.strip_points(cam, contour, strip) else {
            return false;
        };
        cross2(&(b - a), &(e - a)) < 0.0
    }
}
