//! Core geometry primitives for `visual-hull-rs`.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec2`, `Pt3`, ...) and the planar
//!   intersection kernel,
//! - finite projective cameras ([`ProjectiveCamera`]) and calibrated camera
//!   sets,
//! - silhouette contours with their nesting hierarchy and edge-angle
//!   filtering,
//! - synthetic multi-camera scenes for tests and examples.
//!
//! Winding convention: outer contours are shoelace-positive, holes are
//! shoelace-negative, so silhouette material always lies on the
//! [`is_inside_to_edge`](math::is_inside_to_edge) side of a directed contour
//! edge.

/// Calibrated camera collections.
pub mod calibration;
/// Finite projective cameras and world rays.
pub mod camera;
/// Type aliases, planar helpers, and the intersection kernel.
pub mod math;
/// Silhouette contours, hierarchy, and filtering.
pub mod silhouette;
/// Synthetic scene builders.
pub mod synthetic;

pub use calibration::CalibrationSet;
pub use camera::{ProjectiveCamera, WorldRay};
pub use math::*;
pub use silhouette::{
    point_in_contour, point_in_contours, CameraSilhouette, Contour, ContourHierarchy,
    SilhouetteSet,
};
