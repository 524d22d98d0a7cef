//! Planar intersection kernel.
//!
//! A single routine, generic over the scalar type, serves every precision the
//! library needs. Validity of a crossing is decided by strict-interior
//! coefficient tests rather than epsilon thresholds, so the same code gives
//! identical answers on identical inputs.

use nalgebra::{Point2, RealField, Vector2};

/// Parametric crossing of two point pairs.
///
/// `coeffs.0` is the parameter along the first pair `a1 → a2` and `coeffs.1`
/// the parameter along the second; `point` equals `a1 + coeffs.0 * (a2 - a1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection2<S: RealField + Copy> {
    /// Crossing point in the plane.
    pub point: Point2<S>,
    /// Parametric coefficients along the two spans.
    pub coeffs: (S, S),
}

#[inline]
fn det2<S: RealField + Copy>(a: &Vector2<S>, b: &Vector2<S>) -> S {
    a.x * b.y - a.y * b.x
}

/// Intersect the infinite lines through `a1 → a2` and `b1 → b2`.
///
/// Returns the parametric solution with no range restriction on the
/// coefficients, or `None` when the determinant of the two directions is zero
/// (parallel lines or a zero-length span).
pub fn line_intersection<S: RealField + Copy>(
    a1: &Point2<S>,
    a2: &Point2<S>,
    b1: &Point2<S>,
    b2: &Point2<S>,
) -> Option<Intersection2<S>> {
    let d1 = a2 - a1;
    let d2 = b2 - b1;
    let denom = det2(&d1, &d2);
    if denom == S::zero() {
        return None;
    }
    let r = b1 - a1;
    let t = det2(&r, &d2) / denom;
    let u = det2(&r, &d1) / denom;
    Some(Intersection2 {
        point: a1 + d1 * t,
        coeffs: (t, u),
    })
}

/// Strict-interior validity test for a parametric crossing.
///
/// Both coefficients must lie strictly inside `(0, 1)`. Crossings through a
/// segment endpoint are rejected, so a shared contour vertex is never reported
/// by both of its incident edges.
#[inline]
pub fn valid_intersection<S: RealField + Copy>(coeffs: (S, S)) -> bool {
    coeffs.0 > S::zero() && coeffs.0 < S::one() && coeffs.1 > S::zero() && coeffs.1 < S::one()
}

/// Intersect the segments `a1 → a2` and `b1 → b2`.
///
/// Returns `Some` only for a strict-interior crossing of both segments; see
/// [`valid_intersection`].
pub fn segment_intersection<S: RealField + Copy>(
    a1: &Point2<S>,
    a2: &Point2<S>,
    b1: &Point2<S>,
    b2: &Point2<S>,
) -> Option<Intersection2<S>> {
    line_intersection(a1, a2, b1, b2).filter(|ix| valid_intersection(ix.coeffs))
}

/// Intersect the ray from `origin` through `through` with the segment
/// `b1 → b2`.
///
/// The ray coefficient must be strictly positive but is unbounded above, so
/// `coeffs.0` is measured in units of `|through - origin|`. The segment
/// coefficient must be strictly interior.
pub fn ray_segment_intersection<S: RealField + Copy>(
    origin: &Point2<S>,
    through: &Point2<S>,
    b1: &Point2<S>,
    b2: &Point2<S>,
) -> Option<Intersection2<S>> {
    line_intersection(origin, through, b1, b2)
        .filter(|ix| ix.coeffs.0 > S::zero() && ix.coeffs.1 > S::zero() && ix.coeffs.1 < S::one())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Pt2;

    #[test]
    fn segments_crossing_at_midpoints() {
        let ix = segment_intersection(
            &Pt2::new(0.0, 0.0),
            &Pt2::new(2.0, 0.0),
            &Pt2::new(1.0, -1.0),
            &Pt2::new(1.0, 1.0),
        )
        .unwrap();
        assert!((ix.point - Pt2::new(1.0, 0.0)).norm() < 1e-12);
        assert!((ix.coeffs.0 - 0.5).abs() < 1e-12);
        assert!((ix.coeffs.1 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn parallel_and_collinear_lines_have_no_crossing() {
        let a1 = Pt2::new(0.0, 0.0);
        let a2 = Pt2::new(1.0, 1.0);
        assert!(line_intersection(&a1, &a2, &Pt2::new(0.0, 1.0), &Pt2::new(1.0, 2.0)).is_none());
        // Collinear overlap is parallel as well.
        assert!(line_intersection(&a1, &a2, &Pt2::new(2.0, 2.0), &Pt2::new(3.0, 3.0)).is_none());
    }

    #[test]
    fn endpoint_touch_is_not_a_valid_crossing() {
        // The second segment starts exactly on the first one.
        let ix = line_intersection(
            &Pt2::new(0.0, 0.0),
            &Pt2::new(2.0, 0.0),
            &Pt2::new(1.0, 0.0),
            &Pt2::new(1.0, 1.0),
        )
        .unwrap();
        assert_eq!(ix.coeffs.1, 0.0);
        assert!(!valid_intersection(ix.coeffs));
        assert!(segment_intersection(
            &Pt2::new(0.0, 0.0),
            &Pt2::new(2.0, 0.0),
            &Pt2::new(1.0, 0.0),
            &Pt2::new(1.0, 1.0),
        )
        .is_none());
    }

    #[test]
    fn crossing_beyond_span_is_rejected_for_segments_only() {
        let a1 = Pt2::new(0.0, 0.0);
        let a2 = Pt2::new(1.0, 0.0);
        let b1 = Pt2::new(3.0, -1.0);
        let b2 = Pt2::new(3.0, 1.0);
        let line = line_intersection(&a1, &a2, &b1, &b2).unwrap();
        assert!((line.coeffs.0 - 3.0).abs() < 1e-12);
        assert!(segment_intersection(&a1, &a2, &b1, &b2).is_none());
    }

    #[test]
    fn ray_extends_past_its_second_point() {
        let origin = Pt2::new(0.0, 0.0);
        let through = Pt2::new(1.0, 0.0);
        let ix = ray_segment_intersection(
            &origin,
            &through,
            &Pt2::new(5.0, -1.0),
            &Pt2::new(5.0, 1.0),
        )
        .unwrap();
        assert!((ix.coeffs.0 - 5.0).abs() < 1e-12);
        // Behind the origin is rejected.
        assert!(ray_segment_intersection(
            &origin,
            &through,
            &Pt2::new(-5.0, -1.0),
            &Pt2::new(-5.0, 1.0),
        )
        .is_none());
    }

    #[test]
    fn generic_kernel_works_at_lower_precision() {
        use nalgebra::Point2 as P2;
        let ix = segment_intersection::<f32>(
            &P2::new(0.0f32, 0.0),
            &P2::new(4.0, 4.0),
            &P2::new(0.0, 4.0),
            &P2::new(4.0, 0.0),
        )
        .unwrap();
        assert!((ix.point - P2::new(2.0f32, 2.0)).norm() < 1e-5);
    }
}
