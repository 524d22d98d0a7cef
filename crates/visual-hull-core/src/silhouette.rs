//! Silhouette contours, their nesting hierarchy, and contour filtering.
//!
//! Contours are polygons in pixel coordinates, closed rings by default. The
//! winding convention is fixed system-wide: outer contours are
//! shoelace-positive, holes are shoelace-negative, so silhouette material
//! always lies on the side where
//! [`is_inside_to_edge`](crate::math::is_inside_to_edge) reports `true` for a
//! directed contour edge. Open chains (partial extractions that never closed)
//! are carried alongside closed rings but bound no material on their own.
//! Contour order inside a set is significant and is preserved by every
//! operation except explicit filtering.

use anyhow::{bail, ensure, Result};
use serde::{Deserialize, Serialize};

use crate::math::{cross2, Pt2, Real};

/// A polygonal contour in image coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    /// Vertices in order; for a closed ring the edge `i` runs from point `i`
    /// to point `(i + 1) % len`.
    pub points: Vec<Pt2>,
    /// `false` for an open chain whose last point does not connect back to
    /// the first.
    #[serde(default = "default_closed")]
    pub closed: bool,
}

fn default_closed() -> bool {
    true
}

impl Contour {
    /// Build a closed contour from at least three points.
    pub fn new(points: Vec<Pt2>) -> Result<Self> {
        ensure!(
            points.len() >= 3,
            "a closed contour needs at least 3 points, got {}",
            points.len()
        );
        Ok(Self {
            points,
            closed: true,
        })
    }

    /// Build an open chain from at least two points.
    pub fn open_chain(points: Vec<Pt2>) -> Result<Self> {
        ensure!(
            points.len() >= 2,
            "an open chain needs at least 2 points, got {}",
            points.len()
        );
        Ok(Self {
            points,
            closed: false,
        })
    }

    /// Rectangle covering the full image frame, positively oriented.
    pub fn image_frame(width: Real, height: Real) -> Self {
        Self {
            points: vec![
                Pt2::new(0.0, 0.0),
                Pt2::new(width, 0.0),
                Pt2::new(width, height),
                Pt2::new(0.0, height),
            ],
            closed: true,
        }
    }

    /// Number of vertices (equals the number of edges for a closed ring).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `true` when the contour has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of directed edges: `len` for a closed ring, one less for an
    /// open chain.
    pub fn num_edges(&self) -> usize {
        if self.closed {
            self.points.len()
        } else {
            self.points.len().saturating_sub(1)
        }
    }

    /// Endpoints of the directed edge starting at vertex `i`; wraps around
    /// for closed rings.
    pub fn edge(&self, i: usize) -> (Pt2, Pt2) {
        let n = self.points.len();
        (self.points[i], self.points[(i + 1) % n])
    }

    /// Signed shoelace area over the implicitly closed ring; positive for
    /// outer contours under the system winding convention.
    pub fn signed_area(&self) -> Real {
        let n = self.points.len();
        let mut sum = 0.0;
        for i in 0..n {
            let a = &self.points[i];
            let b = &self.points[(i + 1) % n];
            sum += a.x * b.y - b.x * a.y;
        }
        0.5 * sum
    }

    /// `true` when the signed area is positive.
    pub fn is_positively_oriented(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// `true` when any vertex comes within `margin` pixels of the image
    /// border, or leaves the frame entirely.
    pub fn touches_frame(&self, width: Real, height: Real, margin: Real) -> bool {
        self.points.iter().any(|p| {
            p.x <= margin || p.y <= margin || p.x >= width - margin || p.y >= height - margin
        })
    }

    /// Remove vertices whose local turning angle is below `min_turn_deg`
    /// degrees, until no such vertex remains.
    ///
    /// Consecutive duplicate points are always removed. Open chains keep
    /// both endpoints and only lose interior vertices. Returns `false` when
    /// the contour has collapsed below three points (two for an open chain)
    /// and should be discarded.
    pub fn filter_points_by_edge_angle(&mut self, min_turn_deg: Real) -> bool {
        let min_turn = min_turn_deg.to_radians();
        let min_len = if self.closed { 3 } else { 2 };
        while self.points.len() >= min_len {
            let n = self.points.len();
            let candidates = if self.closed { 0..n } else { 1..n - 1 };
            let mut removed = None;
            for i in candidates {
                let a = &self.points[(i + n - 1) % n];
                let b = &self.points[i];
                let c = &self.points[(i + 1) % n];
                match turn_angle(a, b, c) {
                    // Zero-length edge: drop the duplicate vertex.
                    None => {
                        removed = Some(i);
                        break;
                    }
                    Some(turn) if turn < min_turn => {
                        removed = Some(i);
                        break;
                    }
                    Some(_) => {}
                }
            }
            match removed {
                Some(i) => {
                    self.points.remove(i);
                }
                None => break,
            }
        }
        self.points.len() >= min_len
    }
}

/// Turning angle at `b` between the incoming direction `b - a` and the
/// outgoing direction `c - b`, in radians within `[0, π]`.
///
/// `None` when either edge has zero length.
fn turn_angle(a: &Pt2, b: &Pt2, c: &Pt2) -> Option<Real> {
    let d1 = b - a;
    let d2 = c - b;
    if d1.norm_squared() == 0.0 || d2.norm_squared() == 0.0 {
        return None;
    }
    Some(cross2(&d1, &d2).abs().atan2(d1.dot(&d2)))
}

/// Point-in-polygon by ray-casting parity against a single contour, treated
/// as closed.
///
/// Uses the half-open crossing rule, so results are consistent for points
/// aligned with contour vertices. Winding direction does not matter here.
pub fn point_in_contour(contour: &Contour, p: &Pt2) -> bool {
    let pts = &contour.points;
    let n = pts.len();
    let mut inside = false;
    for i in 0..n {
        let a = &pts[i];
        let b = &pts[(i + 1) % n];
        if (a.y > p.y) != (b.y > p.y) {
            let t = (p.y - a.y) / (b.y - a.y);
            if p.x < a.x + t * (b.x - a.x) {
                inside = !inside;
            }
        }
    }
    inside
}

/// Combined parity over a whole contour set.
///
/// A point inside an outer contour and inside one of its holes crosses both
/// rings, so the parities cancel and the point counts as outside the
/// silhouette. Nested solids inside holes work the same way. Open chains
/// bound no material and are skipped.
pub fn point_in_contours(contours: &[Contour], p: &Pt2) -> bool {
    contours
        .iter()
        .filter(|c| c.closed)
        .fold(false, |acc, c| acc ^ point_in_contour(c, p))
}

/// Nesting relations between the contours of one camera.
///
/// Stored as a parent index per contour; `None` marks a root (outermost)
/// contour. Depths and children are derived on demand, which keeps the type
/// trivially serializable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContourHierarchy {
    parents: Vec<Option<usize>>,
}

impl ContourHierarchy {
    /// Hierarchy in which every contour is a root.
    pub fn flat(len: usize) -> Self {
        Self {
            parents: vec![None; len],
        }
    }

    /// Build from a parent index per contour.
    ///
    /// # Errors
    ///
    /// Fails on out-of-range parents, self-parents, or cycles.
    pub fn from_parents(parents: Vec<Option<usize>>) -> Result<Self> {
        let n = parents.len();
        for (i, parent) in parents.iter().enumerate() {
            if let Some(p) = parent {
                ensure!(*p < n, "contour {i} has out-of-range parent {p}");
                ensure!(*p != i, "contour {i} is its own parent");
            }
        }
        let h = Self { parents };
        for i in 0..n {
            if h.checked_depth(i).is_none() {
                bail!("contour hierarchy contains a cycle through contour {i}");
            }
        }
        Ok(h)
    }

    /// Number of contours covered.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// `true` when the hierarchy covers no contours.
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Parent of contour `i`, if any.
    pub fn parent(&self, i: usize) -> Option<usize> {
        self.parents[i]
    }

    /// Direct children of contour `i`.
    pub fn children(&self, i: usize) -> Vec<usize> {
        (0..self.parents.len())
            .filter(|&c| self.parents[c] == Some(i))
            .collect()
    }

    /// Nesting depth of contour `i`; roots have depth 0.
    pub fn depth(&self, i: usize) -> usize {
        // from_parents rejected cycles, so the walk terminates.
        self.checked_depth(i).unwrap_or(0)
    }

    /// `true` when contour `i` bounds a hole (odd nesting depth).
    pub fn is_hole(&self, i: usize) -> bool {
        self.depth(i) % 2 == 1
    }

    fn checked_depth(&self, i: usize) -> Option<usize> {
        let mut depth = 0;
        let mut cursor = i;
        while let Some(p) = self.parents[cursor] {
            depth += 1;
            if depth > self.parents.len() {
                return None;
            }
            cursor = p;
        }
        Some(depth)
    }
}

/// All silhouette data observed by one camera.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSilhouette {
    /// Contours in their original extraction order.
    pub contours: Vec<Contour>,
    /// Nesting relations, parallel to `contours`.
    pub hierarchy: ContourHierarchy,
    /// Per-contour flag marking occluder outlines rather than the target
    /// object, parallel to `contours`.
    pub occluding: Vec<bool>,
}

impl CameraSilhouette {
    /// Build a silhouette and validate shape and winding.
    ///
    /// # Errors
    ///
    /// Fails when the parallel arrays disagree in length, or a closed
    /// contour's orientation contradicts its nesting depth (outer contours
    /// must be shoelace-positive, holes shoelace-negative). Open chains are
    /// exempt from the winding check since they bound no material.
    pub fn new(
        contours: Vec<Contour>,
        hierarchy: ContourHierarchy,
        occluding: Vec<bool>,
    ) -> Result<Self> {
        ensure!(
            contours.len() == hierarchy.len() && contours.len() == occluding.len(),
            "silhouette arrays disagree: {} contours, {} hierarchy entries, {} occlusion flags",
            contours.len(),
            hierarchy.len(),
            occluding.len()
        );
        for (i, contour) in contours.iter().enumerate() {
            if !contour.closed {
                ensure!(contour.len() >= 2, "open contour {i} has fewer than 2 points");
                continue;
            }
            ensure!(contour.len() >= 3, "contour {i} has fewer than 3 points");
            let area = contour.signed_area();
            ensure!(area != 0.0, "contour {i} has zero area");
            let positive = area > 0.0;
            ensure!(
                positive != hierarchy.is_hole(i),
                "contour {i} winding contradicts its nesting depth"
            );
        }
        Ok(Self {
            contours,
            hierarchy,
            occluding,
        })
    }

    /// Silhouette made of independent outer contours, none occluding.
    pub fn from_outer_contours(contours: Vec<Contour>) -> Result<Self> {
        let n = contours.len();
        Self::new(contours, ContourHierarchy::flat(n), vec![false; n])
    }

    /// Number of contours.
    pub fn len(&self) -> usize {
        self.contours.len()
    }

    /// `true` when the silhouette has no contours.
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Parity-based membership test; see [`point_in_contours`].
    pub fn contains(&self, p: &Pt2) -> bool {
        point_in_contours(&self.contours, p)
    }

    /// Remove low-turning-angle vertices from every contour and discard
    /// contours that collapse below three points, together with their nested
    /// subtrees.
    pub fn filter_by_edge_angle(&mut self, min_turn_deg: Real) {
        let n = self.contours.len();
        let mut alive = vec![true; n];
        for (i, contour) in self.contours.iter_mut().enumerate() {
            if !contour.filter_points_by_edge_angle(min_turn_deg) {
                alive[i] = false;
            }
        }
        // A contour nested inside a discarded one is meaningless; drop the
        // whole subtree.
        for i in 0..n {
            let mut cursor = i;
            while let Some(p) = self.hierarchy.parent(cursor) {
                if !alive[p] {
                    alive[i] = false;
                    break;
                }
                cursor = p;
            }
        }
        if alive.iter().all(|&a| a) {
            return;
        }

        let mut remap = vec![usize::MAX; n];
        let mut kept = 0usize;
        for i in 0..n {
            if alive[i] {
                remap[i] = kept;
                kept += 1;
            }
        }

        let mut contours = Vec::with_capacity(kept);
        let mut parents = Vec::with_capacity(kept);
        let mut occluding = Vec::with_capacity(kept);
        for i in 0..n {
            if !alive[i] {
                continue;
            }
            contours.push(std::mem::replace(
                &mut self.contours[i],
                Contour {
                    points: Vec::new(),
                    closed: true,
                },
            ));
            parents.push(self.hierarchy.parent(i).map(|p| remap[p]));
            occluding.push(self.occluding[i]);
        }
        self.contours = contours;
        self.hierarchy = ContourHierarchy { parents };
        self.occluding = occluding;
    }
}

/// Silhouettes for a whole calibrated rig, indexed by camera id.
///
/// Cameras without silhouette data hold `None` and never contribute
/// primitives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SilhouetteSet {
    cameras: Vec<Option<CameraSilhouette>>,
}

impl SilhouetteSet {
    /// Empty set covering `num_cameras` cameras.
    pub fn new(num_cameras: usize) -> Self {
        Self {
            cameras: vec![None; num_cameras],
        }
    }

    /// Attach silhouette data to a camera.
    ///
    /// # Errors
    ///
    /// Fails when `cam_id` is out of range.
    pub fn set(&mut self, cam_id: usize, silhouette: CameraSilhouette) -> Result<()> {
        ensure!(
            cam_id < self.cameras.len(),
            "camera id {cam_id} out of range ({} cameras)",
            self.cameras.len()
        );
        self.cameras[cam_id] = Some(silhouette);
        Ok(())
    }

    /// Number of camera slots.
    pub fn num_cameras(&self) -> usize {
        self.cameras.len()
    }

    /// Silhouette of a camera, if present.
    pub fn get(&self, cam_id: usize) -> Option<&CameraSilhouette> {
        self.cameras.get(cam_id).and_then(|s| s.as_ref())
    }

    /// Mutable silhouette of a camera, if present.
    pub fn get_mut(&mut self, cam_id: usize) -> Option<&mut CameraSilhouette> {
        self.cameras.get_mut(cam_id).and_then(|s| s.as_mut())
    }

    /// Ids of cameras that carry silhouette data, ascending.
    pub fn cameras_with_data(&self) -> Vec<usize> {
        self.cameras
            .iter()
            .enumerate()
            .filter_map(|(id, s)| s.as_ref().map(|_| id))
            .collect()
    }
}
