//! Image-boundary fallback for clipped silhouettes.
//!
//! A silhouette touching the image frame hides part of the true occluding
//! boundary, so the affected camera swaps all of its degraded contours for
//! one rectangle of image-frame strips (open chains degrade the same way).
//! This example runs the engine stage by stage to show the swap:
//! 1. Camera 0 stands so close that the box overflows its frame
//! 2. Camera 1 sees the whole box comfortably
//! 3. After primitives are built, camera 0 carries boundary strips only
//! 4. The sweep still runs; camera 0 contributes its whole view cone
//!
//! Run with: `cargo run -p visual-hull --example boundary_fallback`

use anyhow::Result;
use visual_hull::prelude::*;
use visual_hull::synthetic::{box_corners, convex_silhouette, look_at_pose, pinhole_intrinsics};

fn main() -> Result<()> {
    env_logger::init();
    println!("=== Image-Boundary Fallback ===\n");

    let k = pinhole_intrinsics(800.0, 320.0, 240.0);
    let up = Vec3::z();
    let near = look_at_pose(&Pt3::new(1.1, 0.0, 0.2), &Pt3::origin(), &up)?;
    let far = look_at_pose(&Pt3::new(0.0, 5.0, 0.8), &Pt3::origin(), &up)?;
    let calibration = CalibrationSet::new(
        vec![
            ProjectiveCamera::from_k_pose(&k, &near)?,
            ProjectiveCamera::from_k_pose(&k, &far)?,
        ],
        vec![(640, 480), (640, 480)],
    )?;

    // Exact silhouettes of the same box; only camera 0 clips it.
    let corners = box_corners(&Pt3::origin(), &Vec3::new(0.4, 0.3, 0.25));
    let mut silhouettes = SilhouetteSet::new(2);
    println!("Scene:");
    for (cam, camera) in calibration.iter() {
        let contour = convex_silhouette(camera, &corners)?;
        println!(
            "  camera {cam}: {} silhouette points, clipped: {}",
            contour.len(),
            contour.touches_frame(640.0, 480.0, 0.5)
        );
        silhouettes.set(cam, CameraSilhouette::from_outer_contours(vec![contour])?)?;
    }
    println!();

    let mut engine = HullEngine::new(calibration);
    engine.set_silhouette_cameras(&[0, 1])?;
    engine.set_silhouettes(silhouettes)?;

    println!("--- Stage 1: filter + ordering + primitives ---");
    engine.prime()?;
    engine.filter_contours()?;
    engine.build_most_orthogonal_cameras();
    engine.build_primitives()?;

    for cam in 0..2 {
        let cc = &engine.context().cameras[cam];
        let frame_strips = cc
            .generators
            .iter()
            .filter(|&&id| engine.mesh().generator(id).from_boundary)
            .count();
        println!(
            "  camera {cam}: partner {:?}, {} strips ({} from the image frame)",
            cc.partner,
            cc.num_strips(),
            frame_strips
        );
    }
    println!();

    println!("--- Stage 2: sweep ---");
    engine.resolve_viewing_edges();
    let report = engine.report();
    println!("  cameras processed: {}", report.cameras_processed);
    println!("  vertices:          {}", report.vertices);
    println!("  viewing edges:     {}", report.viewing_edges);
    println!("  total edge length: {:.4}", report.total_edge_length);

    Ok(())
}
