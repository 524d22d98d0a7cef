//! Finite projective cameras.
//!
//! A [`ProjectiveCamera`] wraps a 3x4 projection matrix `P = K [R | t]` in a
//! depth-normalized form: the matrix is rescaled at construction so that the
//! homogeneous `w` of a projected point equals its signed depth along the
//! principal axis. Projection, back-projection, optical center, and epipoles
//! all come from this one representation.

use anyhow::{ensure, Context, Result};
use nalgebra::Vector4;

use crate::math::{from_homogeneous, to_homogeneous, Iso3, Mat3, Mat34, Pt2, Pt3, Real, Vec3};

/// A ray in world space with unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldRay {
    /// Ray origin (the optical center for viewing rays).
    pub origin: Pt3,
    /// Unit direction.
    pub dir: Vec3,
}

impl WorldRay {
    /// Point at parameter `t` along the ray.
    pub fn point_at(&self, t: Real) -> Pt3 {
        self.origin + self.dir * t
    }

    /// Intersect with the plane through `point` with normal `normal`.
    ///
    /// Returns `None` when the ray is parallel to the plane or the crossing
    /// lies behind the origin.
    pub fn intersect_plane(&self, point: &Pt3, normal: &Vec3) -> Option<Pt3> {
        let denom = self.dir.dot(normal);
        if denom == 0.0 {
            return None;
        }
        let t = (point - self.origin).dot(normal) / denom;
        if t <= 0.0 {
            return None;
        }
        Some(self.point_at(t))
    }
}

/// Finite projective camera.
#[derive(Debug, Clone)]
pub struct ProjectiveCamera {
    /// Depth-normalized projection matrix.
    p: Mat34,
    /// Inverse of the left 3x3 block of `p`.
    m_inv: Mat3,
    /// Optical center in world coordinates.
    center: Pt3,
    /// Principal axis (unit, pointing into the scene).
    dir: Vec3,
}

impl ProjectiveCamera {
    /// Build a camera from an arbitrary 3x4 projection matrix.
    ///
    /// The matrix is accepted up to scale and rescaled internally so that the
    /// third row of its left 3x3 block is a unit vector and its determinant is
    /// positive. After that, `w` of a projected point is its depth.
    ///
    /// # Errors
    ///
    /// Fails when the left 3x3 block is singular (the camera would not be a
    /// finite camera).
    pub fn from_matrix(p: Mat34) -> Result<Self> {
        let m = p.fixed_view::<3, 3>(0, 0).into_owned();
        let det = m.determinant();
        ensure!(
            det != 0.0,
            "projection matrix has a singular left 3x3 block"
        );

        let s = det.signum() / m.row(2).norm();
        let p = p * s;
        let m = m * s;

        let m_inv = m
            .try_inverse()
            .context("left 3x3 block is not invertible")?;
        let p4 = p.column(3).into_owned();
        let center = Pt3::from(-(m_inv * p4));
        let dir = m.row(2).transpose();

        Ok(Self {
            p,
            m_inv,
            center,
            dir,
        })
    }

    /// Build a camera from intrinsics `K`, rotation `R`, and translation `t`
    /// so that `P = K [R | t]`.
    pub fn from_krt(k: &Mat3, r: &Mat3, t: &Vec3) -> Result<Self> {
        let mut p = Mat34::zeros();
        p.fixed_view_mut::<3, 3>(0, 0).copy_from(&(k * r));
        p.set_column(3, &(k * t));
        Self::from_matrix(p)
    }

    /// Build a camera from intrinsics `K` and the camera-from-world pose.
    pub fn from_k_pose(k: &Mat3, camera_from_world: &Iso3) -> Result<Self> {
        let r = camera_from_world.rotation.to_rotation_matrix();
        Self::from_krt(k, r.matrix(), &camera_from_world.translation.vector)
    }

    /// Depth-normalized projection matrix.
    pub fn matrix(&self) -> &Mat34 {
        &self.p
    }

    /// Optical center in world coordinates.
    pub fn center(&self) -> Pt3 {
        self.center
    }

    /// Principal axis, a unit vector pointing into the scene.
    pub fn viewing_direction(&self) -> Vec3 {
        self.dir
    }

    /// Project a world point to pixel coordinates.
    ///
    /// Returns `None` for points at or behind the principal plane.
    pub fn project(&self, x: &Pt3) -> Option<Pt2> {
        let xh = self.p * x.to_homogeneous();
        if xh.z <= 0.0 {
            return None;
        }
        Some(from_homogeneous(&xh))
    }

    /// Project a world direction, i.e. the image of the point at infinity
    /// along `d`.
    ///
    /// Returns `None` when the direction points away from the camera (the
    /// vanishing point would fall behind it) or is parallel to the image
    /// plane.
    pub fn project_direction(&self, d: &Vec3) -> Option<Pt2> {
        let xh = self.p * Vector4::new(d.x, d.y, d.z, 0.0);
        if xh.z <= 0.0 {
            return None;
        }
        Some(from_homogeneous(&xh))
    }

    /// Back-project a pixel to the viewing ray through it.
    ///
    /// The ray starts at the optical center and its direction points into the
    /// scene: `point_at(depth)` reproduces a world point at that pixel.
    pub fn backproject(&self, px: &Pt2) -> WorldRay {
        let d = self.m_inv * to_homogeneous(px);
        WorldRay {
            origin: self.center,
            dir: d.normalize(),
        }
    }

    /// Epipole of `other` in this camera's image, i.e. the projection of the
    /// other camera's optical center.
    ///
    /// Returns `None` when that center is not in front of this camera.
    pub fn epipole_from(&self, other: &ProjectiveCamera) -> Option<Pt2> {
        self.project(&other.center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pinhole() -> Mat3 {
        Mat3::new(800.0, 0.0, 320.0, 0.0, 800.0, 240.0, 0.0, 0.0, 1.0)
    }

    #[test]
    fn identity_pose_projects_through_principal_point() {
        let cam = ProjectiveCamera::from_krt(&pinhole(), &Mat3::identity(), &Vec3::zeros())
            .expect("valid camera");
        let px = cam.project(&Pt3::new(0.0, 0.0, 5.0)).unwrap();
        assert!((px - Pt2::new(320.0, 240.0)).norm() < 1e-10);

        let off = cam.project(&Pt3::new(1.0, -0.5, 4.0)).unwrap();
        assert!((off - Pt2::new(320.0 + 800.0 / 4.0, 240.0 - 400.0 / 4.0)).norm() < 1e-10);
    }

    #[test]
    fn points_behind_the_camera_do_not_project() {
        let cam = ProjectiveCamera::from_krt(&pinhole(), &Mat3::identity(), &Vec3::zeros())
            .expect("valid camera");
        assert!(cam.project(&Pt3::new(0.0, 0.0, -1.0)).is_none());
        assert!(cam.project(&Pt3::new(1.0, 1.0, 0.0)).is_none());
    }

    #[test]
    fn center_recovered_from_pose() {
        let rot = nalgebra::Rotation3::from_euler_angles(0.1, -0.2, 0.3);
        let r = *rot.matrix();
        let t = Vec3::new(0.5, -1.0, 2.0);
        let cam = ProjectiveCamera::from_krt(&pinhole(), &r, &t).expect("valid camera");

        let expected = Pt3::from(-(r.transpose() * t));
        assert!(
            (cam.center() - expected).norm() < 1e-10,
            "center={:?}",
            cam.center()
        );
        assert!((cam.viewing_direction().norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn matrix_scale_does_not_change_the_camera() {
        let rot = nalgebra::Rotation3::from_euler_angles(-0.3, 0.15, 0.05);
        let cam = ProjectiveCamera::from_krt(&pinhole(), rot.matrix(), &Vec3::new(0.1, 0.2, 3.0))
            .expect("valid camera");
        let scaled = ProjectiveCamera::from_matrix(cam.matrix() * -7.25).expect("valid camera");

        let x = Pt3::new(0.4, -0.2, 1.0);
        let a = cam.project(&x).unwrap();
        let b = scaled.project(&x).unwrap();
        assert!((a - b).norm() < 1e-9);
        assert!((cam.center() - scaled.center()).norm() < 1e-9);
    }

    #[test]
    fn backprojection_inverts_projection() {
        let rot = nalgebra::Rotation3::from_euler_angles(0.2, 0.4, -0.1);
        let cam = ProjectiveCamera::from_krt(&pinhole(), rot.matrix(), &Vec3::new(-0.4, 0.1, 2.5))
            .expect("valid camera");

        let x = Pt3::new(0.3, 0.7, 1.8);
        let px = cam.project(&x).unwrap();
        let ray = cam.backproject(&px);

        let along = (x - ray.origin).normalize();
        assert!(
            (along - ray.dir).norm() < 1e-9,
            "ray direction off by {}",
            (along - ray.dir).norm()
        );
        let depth = (x - ray.origin).norm();
        assert!((ray.point_at(depth) - x).norm() < 1e-9);
    }

    #[test]
    fn viewing_direction_vanishes_at_the_principal_point() {
        let rot = nalgebra::Rotation3::from_euler_angles(0.05, -0.3, 0.2);
        let cam = ProjectiveCamera::from_krt(&pinhole(), rot.matrix(), &Vec3::new(1.0, 0.0, 1.0))
            .expect("valid camera");
        let v = cam.project_direction(&cam.viewing_direction()).unwrap();
        assert!((v - Pt2::new(320.0, 240.0)).norm() < 1e-9);
        assert!(cam.project_direction(&-cam.viewing_direction()).is_none());
    }

    #[test]
    fn epipole_is_projection_of_partner_center() {
        let k = pinhole();
        // Two cameras on a ring looking at the origin.
        let a = ProjectiveCamera::from_krt(
            &k,
            nalgebra::Rotation3::from_euler_angles(0.0, std::f64::consts::FRAC_PI_2, 0.0).matrix(),
            &Vec3::new(0.0, 0.0, 3.0),
        )
        .expect("valid camera");
        let b = ProjectiveCamera::from_krt(&k, &Mat3::identity(), &Vec3::new(0.0, 0.0, 3.0))
            .expect("valid camera");

        let e = b.epipole_from(&a).unwrap();
        let direct = b.project(&a.center()).unwrap();
        assert!((e - direct).norm() < 1e-12);
    }

    #[test]
    fn ray_plane_intersection() {
        let ray = WorldRay {
            origin: Pt3::new(0.0, 0.0, 0.0),
            dir: Vec3::new(0.0, 0.0, 1.0),
        };
        let hit = ray
            .intersect_plane(&Pt3::new(0.0, 0.0, 4.0), &Vec3::new(0.0, 0.5, 0.5))
            .unwrap();
        assert!((hit - Pt3::new(0.0, 0.0, 4.0)).norm() < 1e-12);

        // Parallel plane and crossings behind the origin give nothing.
        assert!(ray
            .intersect_plane(&Pt3::new(0.0, 1.0, 0.0), &Vec3::new(0.0, 1.0, 0.0))
            .is_none());
        assert!(ray
            .intersect_plane(&Pt3::new(0.0, 0.0, -2.0), &Vec3::new(0.0, 0.0, 1.0))
            .is_none());
    }

    #[test]
    fn degenerate_matrix_is_rejected() {
        let mut p = Mat34::zeros();
        p[(0, 0)] = 1.0;
        p[(1, 1)] = 1.0;
        // Third row zero: singular left block.
        assert!(ProjectiveCamera::from_matrix(p).is_err());
    }
}
