//! Synthetic multi-camera scenes.
//!
//! Builders for inward-looking camera rigs and polygonal silhouettes of convex
//! solids. The silhouette of a convex point cloud is the 2D convex hull of its
//! projections, quantized to integer pixels the way a traced mask boundary
//! would be, so tests and examples can predict strip geometry in closed form.

use anyhow::{bail, ensure, Result};
use nalgebra::{Rotation3, Translation3, UnitQuaternion};

use crate::calibration::CalibrationSet;
use crate::camera::ProjectiveCamera;
use crate::math::{cross2, Iso3, Mat3, Pt2, Pt3, Real, Vec3};
use crate::silhouette::{CameraSilhouette, Contour, SilhouetteSet};

/// Pinhole intrinsics with square pixels and no skew.
pub fn pinhole_intrinsics(f: Real, cx: Real, cy: Real) -> Mat3 {
    Mat3::new(f, 0.0, cx, 0.0, f, cy, 0.0, 0.0, 1.0)
}

/// Camera-from-world pose for a camera at `position` looking at `target`.
///
/// The camera z axis points at the target; image x runs along
/// `viewing × up`, and image y completes the right-handed frame, which puts it
/// along world-down when `up` is the world up vector.
///
/// # Errors
///
/// Fails when `position == target` or the viewing direction is parallel to
/// `up`.
pub fn look_at_pose(position: &Pt3, target: &Pt3, up: &Vec3) -> Result<Iso3> {
    let forward = target - position;
    ensure!(
        forward.norm_squared() > 0.0,
        "camera position coincides with its target"
    );
    let z = forward.normalize();
    let x = z.cross(up);
    ensure!(
        x.norm_squared() > 0.0,
        "viewing direction is parallel to the up vector"
    );
    let x = x.normalize();
    let y = z.cross(&x);

    let r = Mat3::from_rows(&[x.transpose(), y.transpose(), z.transpose()]);
    let rotation = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(r));
    let t = -(r * position.coords);
    Ok(Iso3::from_parts(Translation3::from(t), rotation))
}

/// Evenly spaced ring of `n` cameras at the given radius and height, all
/// looking at `target` with shared intrinsics `k`.
///
/// Camera `i` sits at angle `2πi/n` in the `z = height` plane. Ids follow the
/// ring order.
pub fn camera_ring(
    n: usize,
    radius: Real,
    height: Real,
    target: &Pt3,
    k: &Mat3,
    image_size: (usize, usize),
) -> Result<CalibrationSet> {
    ensure!(n >= 2, "a camera ring needs at least 2 cameras, got {n}");
    let mut cameras = Vec::with_capacity(n);
    for i in 0..n {
        let angle = 2.0 * std::f64::consts::PI * i as Real / n as Real;
        let position = Pt3::new(radius * angle.cos(), radius * angle.sin(), height);
        let pose = look_at_pose(&position, target, &Vec3::z())?;
        cameras.push(ProjectiveCamera::from_k_pose(k, &pose)?);
    }
    CalibrationSet::new(cameras, vec![image_size; n])
}

/// Corners of an axis-aligned box.
pub fn box_corners(center: &Pt3, half_extents: &Vec3) -> Vec<Pt3> {
    let mut corners = Vec::with_capacity(8);
    for sx in [-1.0, 1.0] {
        for sy in [-1.0, 1.0] {
            for sz in [-1.0, 1.0] {
                corners.push(Pt3::new(
                    center.x + sx * half_extents.x,
                    center.y + sy * half_extents.y,
                    center.z + sz * half_extents.z,
                ));
            }
        }
    }
    corners
}

/// 2D convex hull by monotone chain, positively oriented.
///
/// Collinear points along hull edges are dropped, so the result never carries
/// zero-turn vertices. Inputs with fewer than three distinct points come back
/// as-is after sorting and deduplication.
pub fn convex_hull(points: &[Pt2]) -> Vec<Pt2> {
    let mut pts: Vec<Pt2> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<Pt2> = Vec::with_capacity(pts.len());
    for p in &pts {
        while lower.len() >= 2
            && cross2(
                &(lower[lower.len() - 1] - lower[lower.len() - 2]),
                &(p - lower[lower.len() - 1]),
            ) <= 0.0
        {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<Pt2> = Vec::with_capacity(pts.len());
    for p in pts.iter().rev() {
        while upper.len() >= 2
            && cross2(
                &(upper[upper.len() - 1] - upper[upper.len() - 2]),
                &(p - upper[upper.len() - 1]),
            ) <= 0.0
        {
            upper.pop();
        }
        upper.push(*p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Silhouette contour of a convex solid given by its vertices.
///
/// Projections snap to integer pixel coordinates before hulling, like a
/// contour traced from a binarized mask, so hull and orientation predicates
/// run on exactly representable values.
///
/// # Errors
///
/// Fails when a vertex is behind the camera or the projections are too
/// degenerate to span a polygon.
pub fn convex_silhouette(camera: &ProjectiveCamera, vertices: &[Pt3]) -> Result<Contour> {
    let mut projected = Vec::with_capacity(vertices.len());
    for (idx, v) in vertices.iter().enumerate() {
        let Some(px) = camera.project(v) else {
            bail!("vertex {idx} not projectable");
        };
        projected.push(Pt2::new(px.x.round(), px.y.round()));
    }
    let hull = convex_hull(&projected);
    ensure!(
        hull.len() >= 3,
        "projected solid is degenerate ({} hull points)",
        hull.len()
    );
    Contour::new(hull)
}

/// Ring of cameras around an axis-aligned box, with exact box silhouettes.
///
/// A ready-made scene for tests and examples: every camera observes a single
/// convex outer contour.
pub fn box_scene(
    num_cameras: usize,
    radius: Real,
    height: Real,
    k: &Mat3,
    image_size: (usize, usize),
    box_center: &Pt3,
    box_half_extents: &Vec3,
) -> Result<(CalibrationSet, SilhouetteSet)> {
    let calibration = camera_ring(num_cameras, radius, height, box_center, k, image_size)?;
    let corners = box_corners(box_center, box_half_extents);

    let mut silhouettes = SilhouetteSet::new(calibration.len());
    for (cam_id, camera) in calibration.iter() {
        let contour = convex_silhouette(camera, &corners)?;
        silhouettes.set(cam_id, CameraSilhouette::from_outer_contours(vec![contour])?)?;
    }
    Ok((calibration, silhouettes))
}

/// Fibonacci lattice on an axis-aligned ellipsoid surface.
///
/// Sample `i` sits at height `z = 1 - 2(i + 1/2)/n` on the unit sphere, rotated
/// by the golden angle per step, then scaled by `radii` around `center`. The
/// lattice is irregular enough that different viewpoints rarely agree on which
/// samples are extremal, unlike the corners of a box.
pub fn ellipsoid_points(n: usize, center: &Pt3, radii: &Vec3) -> Vec<Pt3> {
    let golden = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
    let mut points = Vec::with_capacity(n);
    for i in 0..n {
        let z = 1.0 - 2.0 * (i as Real + 0.5) / n as Real;
        let r = (1.0 - z * z).max(0.0).sqrt();
        let phi = golden * i as Real;
        points.push(Pt3::new(
            center.x + radii.x * r * phi.cos(),
            center.y + radii.y * r * phi.sin(),
            center.z + radii.z * z,
        ));
    }
    points
}

/// Cameras at explicit positions around a sampled ellipsoid, with one convex
/// silhouette per view.
///
/// Every camera looks at `center` with shared intrinsics `k`. Ids follow the
/// order of `positions`. Complements [`box_scene`] when a rig with uneven
/// spacing and elevation is wanted.
pub fn ellipsoid_scene(
    positions: &[Pt3],
    k: &Mat3,
    image_size: (usize, usize),
    num_points: usize,
    center: &Pt3,
    radii: &Vec3,
) -> Result<(CalibrationSet, SilhouetteSet)> {
    ensure!(
        positions.len() >= 2,
        "an ellipsoid scene needs at least 2 cameras, got {}",
        positions.len()
    );
    let mut cameras = Vec::with_capacity(positions.len());
    for position in positions {
        let pose = look_at_pose(position, center, &Vec3::z())?;
        cameras.push(ProjectiveCamera::from_k_pose(k, &pose)?);
    }
    let calibration = CalibrationSet::new(cameras, vec![image_size; positions.len()])?;
    let samples = ellipsoid_points(num_points, center, radii);

    let mut silhouettes = SilhouetteSet::new(calibration.len());
    for (cam_id, camera) in calibration.iter() {
        let contour = convex_silhouette(camera, &samples)?;
        silhouettes.set(cam_id, CameraSilhouette::from_outer_contours(vec![contour])?)?;
    }
    Ok((calibration, silhouettes))
}
