//! Primitive construction: one generator per silhouette strip.
//!
//! Each participating camera pairs with its most orthogonal unused partner,
//! then turns every filtered contour edge into a generator whose bounding
//! rays are back-projected through the edge endpoints. Contour points are
//! conditioned per camera before any 2D strip math; the rays always come from
//! the raw pixel coordinates.

use visual_hull_core::{isotropic_conditioning, Contour, Pt2, Real};

use crate::context::StripContourMap;
use crate::engine::HullEngine;
use crate::error::HullError;
use crate::mesh::StripRef;

impl HullEngine {
    /// Build generators for every participating camera, ascending id order.
    ///
    /// A camera with no unused partner or no usable contours is skipped with
    /// a debug log; only missing configuration is an error.
    pub fn build_primitives(&mut self) -> Result<(), HullError> {
        if self.silhouettes.is_none() {
            return Err(HullError::SilhouettesMissing);
        }
        if self.ctx.most_orthogonal.is_empty() {
            return Err(HullError::OrderingNotBuilt);
        }
        let cams = self.ctx.silhouette_cameras.clone();
        for cam in cams {
            let has_contours = self
                .silhouettes
                .as_ref()
                .and_then(|s| s.get(cam))
                .is_some_and(|s| !s.is_empty());
            if !has_contours {
                log::debug!("camera {cam}: no contours after filtering, skipped");
                continue;
            }
            let Some(partner) = self.most_orthogonal_unused_camera(cam) else {
                log::debug!("camera {cam}: every partner already used, skipped");
                continue;
            };
            self.set_camera_used(partner);
            log::debug!("camera {cam}: building primitives against partner {partner}");
            self.build_camera_primitives(cam, partner);
        }
        Ok(())
    }

    fn build_camera_primitives(&mut self, cam: usize, partner: usize) {
        let (w, h) = self.calibration.image_size(cam);
        let (w, h) = (w as Real, h as Real);

        let (contours, occluding, boundary, has_boundary) = {
            let sil = match self.silhouettes.as_ref().and_then(|s| s.get(cam)) {
                Some(sil) => sil,
                None => return,
            };
            let margin = self.options.boundary_margin;
            let mut contours = Vec::with_capacity(sil.contours.len());
            let mut occluding = Vec::with_capacity(sil.contours.len());
            let mut boundary = Vec::with_capacity(sil.contours.len());
            let mut degraded = 0usize;
            for (ci, contour) in sil.contours.iter().enumerate() {
                // An open chain hides its boundary just like a clipped ring.
                if !contour.closed || contour.touches_frame(w, h, margin) {
                    degraded += 1;
                    continue;
                }
                contours.push(contour.clone());
                occluding.push(sil.occluding[ci]);
                boundary.push(false);
            }
            if degraded > 0 {
                // A clipped or open contour leaves the true occluding
                // boundary unknown, so one image-frame rectangle stands in
                // for all of them; intact contours keep their ordinary
                // strips.
                log::debug!("camera {cam}: {degraded} contours open or clipped, adding boundary strips");
                contours.push(Contour::image_frame(w, h));
                occluding.push(false);
                boundary.push(true);
            }
            (contours, occluding, boundary, degraded > 0)
        };

        let Some((offset, scale)) =
            isotropic_conditioning(contours.iter().flat_map(|c| &c.points))
        else {
            log::debug!("camera {cam}: contour points are degenerate, skipped");
            return;
        };
        let condition =
            |p: &Pt2| Pt2::new((p.x - offset.x) * scale, (p.y - offset.y) * scale);

        let camera = self.calibration.camera(cam);
        let mut conditioned = Vec::with_capacity(contours.len());
        let mut strip_map = Vec::new();
        let mut generators = Vec::new();
        for (ci, contour) in contours.iter().enumerate() {
            let base = strip_map.len();
            let n = contour.len();
            for si in 0..n {
                let (a, b) = contour.edge(si);
                let id = self.ctx.mesh.add_generator(
                    StripRef {
                        cam,
                        contour: ci,
                        strip: si,
                    },
                    camera.backproject(&a),
                    camera.backproject(&b),
                    boundary[ci],
                );
                strip_map.push(StripContourMap {
                    contour_strip_id: si,
                    contour_id: ci,
                });
                generators.push(id);
            }
            for si in 0..n {
                let g = self.ctx.mesh.generator_mut(generators[base + si]);
                g.left_gen = Some(generators[base + (si + n - 1) % n]);
                g.right_gen = Some(generators[base + (si + 1) % n]);
            }
            conditioned.push(Contour {
                points: contour.points.iter().map(&condition).collect(),
                closed: true,
            });
        }

        let epipole = camera
            .epipole_from(self.calibration.camera(partner))
            .map(|e| condition(&e));
        if epipole.is_none() {
            log::debug!("camera {cam}: partner {partner} center does not project, sweep disabled");
        }

        let cam_ctx = &mut self.ctx.cameras[cam];
        cam_ctx.contours = conditioned;
        cam_ctx.occluding = occluding;
        cam_ctx.offset = offset;
        cam_ctx.scale = scale;
        cam_ctx.inv_scale = 1.0 / scale;
        cam_ctx.strip_map = strip_map;
        cam_ctx.generators = generators;
        cam_ctx.epipole = epipole;
        cam_ctx.partner = Some(partner);
        cam_ctx.boundary_primitives = has_boundary;
    }
}

#[cfg(test)]
mod tests {
    use visual_hull_core::synthetic::{box_scene, camera_ring, pinhole_intrinsics};
    use visual_hull_core::{CameraSilhouette, Contour, Pt2, Pt3, SilhouetteSet, Vec3};

    use crate::engine::HullEngine;
    use crate::error::HullError;

    // A slightly raised ring around an off-center box; every camera sees a
    // single face head-on, so each silhouette is a four-point hull.
    fn box_engine() -> HullEngine {
        let k = pinhole_intrinsics(800.0, 320.0, 240.0);
        let (calib, silhouettes) = box_scene(
            4,
            5.0,
            0.2,
            &k,
            (640, 480),
            &Pt3::new(0.3, -0.15, 0.1),
            &Vec3::new(0.5, 0.5, 0.5),
        )
        .expect("synthetic box scene");
        let mut engine = HullEngine::new(calib);
        engine
            .set_silhouette_cameras(&[0, 1, 2, 3])
            .expect("cameras in range");
        engine.set_silhouettes(silhouettes).expect("sizes match");
        engine
    }

    #[test]
    fn configuration_errors_come_first() {
        let k = pinhole_intrinsics(800.0, 320.0, 240.0);
        let calib = camera_ring(2, 5.0, 0.0, &Pt3::origin(), &k, (640, 480)).unwrap();
        let mut engine = HullEngine::new(calib);
        assert!(matches!(
            engine.build_primitives(),
            Err(HullError::SilhouettesMissing)
        ));
        engine.set_silhouettes(SilhouetteSet::new(2)).unwrap();
        assert!(matches!(
            engine.build_primitives(),
            Err(HullError::OrderingNotBuilt)
        ));
    }

    #[test]
    fn axis_aligned_box_yields_four_strips_per_camera() {
        let mut engine = box_engine();
        engine.filter_contours().unwrap();
        engine.build_most_orthogonal_cameras();
        engine.build_primitives().unwrap();

        let ctx = engine.context();
        for cam in 0..4 {
            let cc = &ctx.cameras[cam];
            assert_eq!(cc.strip_map.len(), 4, "camera {cam} strips");
            assert_eq!(cc.generators.len(), 4);
            assert!(cc.partner.is_some(), "camera {cam} has a partner");
            assert!(cc.epipole.is_some(), "camera {cam} epipole projects");
            assert!(!cc.boundary_primitives);
            assert!(cc.scale > 0.0 && cc.inv_scale > 0.0);
        }
        assert_eq!(engine.mesh().num_generators(), 16);
        // The off-center target skews the fan just enough that each camera
        // is closest to perpendicular with one specific neighbor.
        assert_eq!(ctx.cameras[0].partner, Some(1));
        assert_eq!(ctx.cameras[1].partner, Some(0));
        assert_eq!(ctx.cameras[2].partner, Some(3));
        assert_eq!(ctx.cameras[3].partner, Some(2));
    }

    #[test]
    fn generators_chain_cyclically_and_backproject_their_strip() {
        let mut engine = box_engine();
        engine.filter_contours().unwrap();
        engine.build_most_orthogonal_cameras();
        engine.build_primitives().unwrap();

        let ctx = engine.context();
        let mesh = engine.mesh();
        let ids = &ctx.cameras[0].generators;
        for (si, &id) in ids.iter().enumerate() {
            let g = mesh.generator(id);
            assert_eq!(g.left_gen, Some(ids[(si + 3) % 4]));
            assert_eq!(g.right_gen, Some(ids[(si + 1) % 4]));
            assert!(!g.from_boundary);

            // Both bounding rays reproject onto the strip endpoints.
            let camera = engine.calibration().camera(0);
            let (a, b) = {
                let entry = ctx.cameras[0].strip_entry(si).unwrap();
                let sil = &ctx.cameras[0].contours[entry.contour_id];
                sil.edge(entry.contour_strip_id)
            };
            let pa = camera.project(&g.left_ray.point_at(1.0)).unwrap();
            let pb = camera.project(&g.right_ray.point_at(1.0)).unwrap();
            let ca = ctx.cameras[0].condition(&pa);
            let cb = ctx.cameras[0].condition(&pb);
            assert!((ca - a).norm() < 1e-9, "left ray hits strip start");
            assert!((cb - b).norm() < 1e-9, "right ray hits strip end");
        }
    }

    #[test]
    fn frame_touching_silhouette_falls_back_to_boundary_strips() {
        let k = pinhole_intrinsics(800.0, 320.0, 240.0);
        let calib = camera_ring(2, 5.0, 0.0, &Pt3::origin(), &k, (640, 480)).unwrap();
        let mut silhouettes = SilhouetteSet::new(2);
        // Camera 0 has a contour with a vertex exactly on the frame edge.
        let touching = Contour::new(vec![
            Pt2::new(0.0, 100.0),
            Pt2::new(200.0, 100.0),
            Pt2::new(100.0, 300.0),
        ])
        .unwrap();
        silhouettes
            .set(0, CameraSilhouette::from_outer_contours(vec![touching]).unwrap())
            .unwrap();
        let square = Contour::new(vec![
            Pt2::new(200.0, 150.0),
            Pt2::new(400.0, 150.0),
            Pt2::new(400.0, 350.0),
            Pt2::new(200.0, 350.0),
        ])
        .unwrap();
        silhouettes
            .set(1, CameraSilhouette::from_outer_contours(vec![square]).unwrap())
            .unwrap();

        let mut engine = HullEngine::new(calib);
        engine.set_silhouette_cameras(&[0, 1]).unwrap();
        engine.set_silhouettes(silhouettes).unwrap();
        engine.filter_contours().unwrap();
        engine.build_most_orthogonal_cameras();
        engine.build_primitives().unwrap();

        let ctx = engine.context();
        assert!(ctx.cameras[0].boundary_primitives);
        assert_eq!(ctx.cameras[0].strip_map.len(), 4, "frame rectangle strips");
        for &id in &ctx.cameras[0].generators {
            assert!(engine.mesh().generator(id).from_boundary);
        }
        assert!(!ctx.cameras[1].boundary_primitives);
        assert_eq!(ctx.cameras[1].strip_map.len(), 4);
    }

    #[test]
    fn open_contours_fall_back_to_boundary_strips() {
        let k = pinhole_intrinsics(800.0, 320.0, 240.0);
        let calib = camera_ring(2, 5.0, 0.0, &Pt3::origin(), &k, (640, 480)).unwrap();
        let mut silhouettes = SilhouetteSet::new(2);
        // Camera 0 extracted only a partial chain, well inside the frame.
        let chain = Contour::open_chain(vec![
            Pt2::new(150.0, 100.0),
            Pt2::new(350.0, 120.0),
            Pt2::new(300.0, 300.0),
        ])
        .unwrap();
        silhouettes
            .set(
                0,
                CameraSilhouette::new(
                    vec![chain],
                    visual_hull_core::ContourHierarchy::flat(1),
                    vec![false],
                )
                .unwrap(),
            )
            .unwrap();
        let square = Contour::new(vec![
            Pt2::new(200.0, 150.0),
            Pt2::new(400.0, 150.0),
            Pt2::new(400.0, 350.0),
            Pt2::new(200.0, 350.0),
        ])
        .unwrap();
        silhouettes
            .set(1, CameraSilhouette::from_outer_contours(vec![square]).unwrap())
            .unwrap();

        let mut engine = HullEngine::new(calib);
        engine.set_silhouette_cameras(&[0, 1]).unwrap();
        engine.set_silhouettes(silhouettes).unwrap();
        engine.filter_contours().unwrap();
        engine.build_most_orthogonal_cameras();
        engine.build_primitives().unwrap();

        let ctx = engine.context();
        assert!(ctx.cameras[0].boundary_primitives);
        assert_eq!(ctx.cameras[0].strip_map.len(), 4, "frame rectangle strips");
        for &id in &ctx.cameras[0].generators {
            assert!(engine.mesh().generator(id).from_boundary);
        }
    }

    #[test]
    fn intact_contours_keep_their_strips_next_to_boundary_ones() {
        let k = pinhole_intrinsics(800.0, 320.0, 240.0);
        let calib = camera_ring(2, 5.0, 0.0, &Pt3::origin(), &k, (640, 480)).unwrap();
        let mut silhouettes = SilhouetteSet::new(2);
        let touching = Contour::new(vec![
            Pt2::new(0.0, 100.0),
            Pt2::new(120.0, 100.0),
            Pt2::new(60.0, 200.0),
        ])
        .unwrap();
        let intact = Contour::new(vec![
            Pt2::new(400.0, 150.0),
            Pt2::new(500.0, 150.0),
            Pt2::new(500.0, 250.0),
            Pt2::new(400.0, 250.0),
        ])
        .unwrap();
        silhouettes
            .set(
                0,
                CameraSilhouette::from_outer_contours(vec![touching, intact]).unwrap(),
            )
            .unwrap();
        let square = Contour::new(vec![
            Pt2::new(200.0, 150.0),
            Pt2::new(400.0, 150.0),
            Pt2::new(400.0, 350.0),
            Pt2::new(200.0, 350.0),
        ])
        .unwrap();
        silhouettes
            .set(1, CameraSilhouette::from_outer_contours(vec![square]).unwrap())
            .unwrap();

        let mut engine = HullEngine::new(calib);
        engine.set_silhouette_cameras(&[0, 1]).unwrap();
        engine.set_silhouettes(silhouettes).unwrap();
        engine.filter_contours().unwrap();
        engine.build_most_orthogonal_cameras();
        engine.build_primitives().unwrap();

        // The intact quad keeps its four strips; the clipped triangle is
        // replaced by the frame rectangle appended after it.
        let ctx = engine.context();
        assert!(ctx.cameras[0].boundary_primitives);
        assert_eq!(ctx.cameras[0].contours.len(), 2);
        assert_eq!(ctx.cameras[0].strip_map.len(), 8);
        let flags: Vec<bool> = ctx.cameras[0]
            .generators
            .iter()
            .map(|&id| engine.mesh().generator(id).from_boundary)
            .collect();
        assert_eq!(
            flags,
            vec![false, false, false, false, true, true, true, true]
        );
    }
}
