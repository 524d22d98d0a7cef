//! Mathematical type definitions and 2D utilities.
//!
//! This module provides the fundamental scalar and linear-algebra types used
//! throughout the library, plus small planar helpers shared by the silhouette
//! and strip geometry code.

use nalgebra::{Isometry3, Matrix3, Matrix3x4, Point2, Point3, Vector2, Vector3};

pub mod intersect;

pub use intersect::{
    line_intersection, ray_segment_intersection, segment_intersection, valid_intersection,
    Intersection2,
};

/// Floating-point scalar used for all geometry (`f64`).
pub type Real = f64;

/// 2D vector over [`Real`].
pub type Vec2 = Vector2<Real>;
/// 3D vector over [`Real`].
pub type Vec3 = Vector3<Real>;
/// 2D point (pixel or conditioned image coordinates).
pub type Pt2 = Point2<Real>;
/// 3D point in world coordinates.
pub type Pt3 = Point3<Real>;
/// 3×3 matrix (intrinsics, rotations).
pub type Mat3 = Matrix3<Real>;
/// 3×4 camera projection matrix.
pub type Mat34 = Matrix3x4<Real>;
/// Rigid 3D transform (SE(3)).
pub type Iso3 = Isometry3<Real>;

/// Lift a 2D point to homogeneous coordinates with `w = 1`.
pub fn to_homogeneous(p: &Pt2) -> Vec3 {
    Vec3::new(p.x, p.y, 1.0)
}

/// Dehomogenize `(x, y, w)` to the 2D point `(x/w, y/w)`.
///
/// The caller guarantees `w != 0`.
pub fn from_homogeneous(v: &Vec3) -> Pt2 {
    Pt2::new(v.x / v.z, v.y / v.z)
}

/// 2D cross product (the `z` component of the 3D cross of the lifted vectors).
///
/// Positive when `b` lies counter-clockwise from `a` under the shoelace-positive
/// orientation convention used for contours.
#[inline]
pub fn cross2(a: &Vec2, b: &Vec2) -> Real {
    a.x * b.y - a.y * b.x
}

/// Test whether `p` lies strictly on the interior side of the directed edge
/// `p1 → p2`.
///
/// "Interior" follows the contour winding convention: outer contours are
/// shoelace-positive, so the material of the silhouette lies on the side where
/// the 2D cross product of the edge direction with `p - p1` is positive.
/// Points exactly on the supporting line report `false`.
#[inline]
pub fn is_inside_to_edge(p1: &Pt2, p2: &Pt2, p: &Pt2) -> bool {
    cross2(&(p2 - p1), &(p - p1)) > 0.0
}

/// Isotropic conditioning of a 2D point cloud.
///
/// Computes the centroid and the scale factor `√2 / mean_distance` so that the
/// conditioned points `(p - offset) * scale` are centered at the origin with
/// mean distance `√2`. This is the translation/scale part of Hartley
/// normalization and is applied per camera before any strip geometry runs.
///
/// Returns `None` if the input is empty or all points coincide.
pub fn isotropic_conditioning<'a, I>(points: I) -> Option<(Vec2, Real)>
where
    I: IntoIterator<Item = &'a Pt2> + Clone,
{
    let mut n = 0usize;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for p in points.clone() {
        cx += p.x;
        cy += p.y;
        n += 1;
    }
    if n == 0 {
        return None;
    }
    let inv_n = 1.0 / n as Real;
    cx *= inv_n;
    cy *= inv_n;

    let mut mean_dist = 0.0;
    for p in points {
        let dx = p.x - cx;
        let dy = p.y - cy;
        mean_dist += (dx * dx + dy * dy).sqrt();
    }
    mean_dist *= inv_n;

    if mean_dist <= Real::EPSILON {
        return None;
    }

    Some((Vec2::new(cx, cy), (2.0_f64).sqrt() / mean_dist))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn homogeneous_round_trip() {
        let p = Pt2::new(3.5, -1.25);
        let h = to_homogeneous(&p);
        assert_eq!(h, Vec3::new(3.5, -1.25, 1.0));
        let back = from_homogeneous(&(h * 2.0));
        assert!((back - p).norm() < 1e-12);
    }

    #[test]
    fn cross2_sign() {
        let a = Vec2::new(1.0, 0.0);
        let b = Vec2::new(0.0, 1.0);
        assert!(cross2(&a, &b) > 0.0);
        assert!(cross2(&b, &a) < 0.0);
        assert_eq!(cross2(&a, &(a * 3.0)), 0.0);
    }

    #[test]
    fn inside_to_edge_is_strict() {
        let p1 = Pt2::new(0.0, 0.0);
        let p2 = Pt2::new(2.0, 0.0);
        assert!(is_inside_to_edge(&p1, &p2, &Pt2::new(1.0, 1.0)));
        assert!(!is_inside_to_edge(&p1, &p2, &Pt2::new(1.0, -1.0)));
        // On the supporting line counts as outside.
        assert!(!is_inside_to_edge(&p1, &p2, &Pt2::new(5.0, 0.0)));
    }

    #[test]
    fn conditioning_centers_and_scales() {
        let points = vec![
            Pt2::new(100.0, 200.0),
            Pt2::new(200.0, 300.0),
            Pt2::new(150.0, 250.0),
        ];
        let (offset, scale) = isotropic_conditioning(points.iter()).unwrap();

        let cond: Vec<Pt2> = points
            .iter()
            .map(|p| Pt2::new((p.x - offset.x) * scale, (p.y - offset.y) * scale))
            .collect();

        let cx: f64 = cond.iter().map(|p| p.x).sum::<f64>() / cond.len() as f64;
        let cy: f64 = cond.iter().map(|p| p.y).sum::<f64>() / cond.len() as f64;
        assert!(cx.abs() < 1e-10, "centroid x not at origin: {cx}");
        assert!(cy.abs() < 1e-10, "centroid y not at origin: {cy}");

        let mean_dist: f64 = cond.iter().map(|p| p.coords.norm()).sum::<f64>() / cond.len() as f64;
        assert!(
            (mean_dist - 2.0_f64.sqrt()).abs() < 1e-10,
            "mean distance not sqrt(2): {mean_dist}"
        );
    }

    #[test]
    fn conditioning_rejects_degenerate_input() {
        assert!(isotropic_conditioning(std::iter::empty::<&Pt2>()).is_none());
        let same = vec![Pt2::new(1.0, 1.0); 4];
        assert!(isotropic_conditioning(same.iter()).is_none());
    }
}
