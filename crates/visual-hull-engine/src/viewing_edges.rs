//! Crossing resolution and viewing-edge emission.
//!
//! One pass per camera: the partner's generators project into this camera's
//! image as epipolar spans rooted at the epipole, every strict-interior
//! crossing with a strip edge is scored by its distance from the epipole, and
//! the candidates resolve globally nearest-first. Each resolved crossing adds
//! a vertex pair (one on the sweeping ray, its opposite on the crossed
//! strip's generator); consecutive sweep vertices whose midpoint stays inside
//! every other silhouette become a viewing edge.

use visual_hull_core::{point_in_contours, ray_segment_intersection, Pt2, Pt3, Real, WorldRay};

use crate::engine::HullEngine;
use crate::mesh::{GeneratorId, VertexId};
use crate::queue::EdgeDistanceQueue;

/// Image of a world ray in one camera, in conditioned coordinates.
///
/// Both variants start at the camera's stored epipole, which is the
/// projection of the ray origin.
enum EpipolarSpan {
    /// Every point of the ray has positive depth; the image is the segment
    /// from the epipole to the projected direction.
    Bounded { end: Pt2 },
    /// Depth runs out along the ray; the image is the half line from the
    /// epipole through a sampled interior point.
    Unbounded { through: Pt2 },
}

impl HullEngine {
    /// Resolve strip crossings and emit viewing edges for every camera that
    /// received primitives.
    ///
    /// Cameras without a partner or epipole are skipped with a debug log.
    pub fn resolve_viewing_edges(&mut self) {
        let cams = self.ctx.silhouette_cameras.clone();
        for cam in cams {
            self.resolve_camera_pass(cam);
        }
    }

    fn resolve_camera_pass(&mut self, cam: usize) {
        let Some(partner) = self.ctx.cameras[cam].partner else {
            log::debug!("camera {cam}: no partner, pass skipped");
            return;
        };
        let Some(epipole) = self.ctx.cameras[cam].epipole else {
            log::debug!("camera {cam}: no epipole, pass skipped");
            return;
        };
        let num_strips = self.ctx.cameras[cam].num_strips();
        let swept: Vec<GeneratorId> = self.ctx.cameras[partner].generators.clone();
        if num_strips == 0 || swept.is_empty() {
            log::debug!("camera {cam}: nothing to sweep against partner {partner}");
            return;
        }
        let epipole_px = self.ctx.cameras[cam].decondition(&epipole);
        log::debug!(
            "camera {cam}: sweeping {} generators of camera {partner} across {num_strips} strips, \
             epipole at ({:.1}, {:.1}) px",
            swept.len(),
            epipole_px.x,
            epipole_px.y
        );

        // Sweeping ray per partner generator; neighbors share rays, so the
        // left bounding ray of each generator covers all of them once.
        let spans: Vec<Option<EpipolarSpan>> = swept
            .iter()
            .map(|&gid| {
                let ray = self.ctx.mesh.generator(gid).left_ray;
                self.ray_span_in_camera(cam, &ray, &epipole)
            })
            .collect();

        let mut queue = EdgeDistanceQueue::with_capacity(swept.len());
        for (g_pos, span) in spans.iter().enumerate() {
            let Some(span) = span else { continue };
            for s in 0..num_strips {
                let entry = self.ctx.cameras[cam].strip_map[s];
                let dist = match span {
                    EpipolarSpan::Bounded { end } => self
                        .ctx
                        .strip_edge_intersection(
                            cam,
                            entry.contour_id,
                            entry.contour_strip_id,
                            &epipole,
                            end,
                        )
                        .map_or(Real::INFINITY, |hit| (hit.point - epipole).norm()),
                    EpipolarSpan::Unbounded { through } => self.ctx.distance_to_strip(
                        &epipole,
                        through,
                        cam,
                        entry.contour_id,
                        entry.contour_strip_id,
                    ),
                };
                if dist.is_finite() {
                    queue.push(g_pos * num_strips + s, dist);
                }
            }
        }
        log::trace!("camera {cam}: {} crossing candidates queued", queue.len());

        let mut last_strip_vertex: Vec<Option<VertexId>> = vec![None; num_strips];
        while let Some(pair) = queue.pop() {
            let g_pos = pair.id / num_strips;
            let strip = pair.id % num_strips;
            let Some(span) = &spans[g_pos] else { continue };
            self.resolve_crossing(cam, &epipole, swept[g_pos], span, strip, &mut last_strip_vertex);
        }

        self.emit_viewing_edges(cam, partner, &swept);
    }

    /// Project `ray` into `cam` and classify its image.
    ///
    /// `None` disables the ray for this pass: its image collapses onto the
    /// epipole, or no interior point of it projects.
    fn ray_span_in_camera(&self, cam: usize, ray: &WorldRay, epipole: &Pt2) -> Option<EpipolarSpan> {
        let camera = self.calibration.camera(cam);
        let cc = &self.ctx.cameras[cam];
        if let Some(end_px) = camera.project_direction(&ray.dir) {
            let end = cc.condition(&end_px);
            if (end - epipole).norm_squared() <= Real::EPSILON {
                log::trace!("camera {cam}: ray image collapses onto the epipole");
                return None;
            }
            return Some(EpipolarSpan::Bounded { end });
        }
        // Depth decreases along the ray; sample it where depth is still
        // positive to fix the image direction.
        let view = camera.viewing_direction();
        let depth_rate = view.dot(&ray.dir);
        let origin_depth = view.dot(&(ray.origin - camera.center()));
        let lambda = if depth_rate < 0.0 {
            -0.5 * origin_depth / depth_rate
        } else {
            1.0
        };
        let through_px = camera.project(&ray.point_at(lambda))?;
        let through = cc.condition(&through_px);
        if (through - epipole).norm_squared() <= Real::EPSILON {
            log::trace!("camera {cam}: ray image collapses onto the epipole");
            return None;
        }
        Some(EpipolarSpan::Unbounded { through })
    }

    fn resolve_crossing(
        &mut self,
        cam: usize,
        epipole: &Pt2,
        wg_id: GeneratorId,
        span: &EpipolarSpan,
        strip: usize,
        last_strip_vertex: &mut [Option<VertexId>],
    ) {
        let entry = self.ctx.cameras[cam].strip_map[strip];
        let hit = match span {
            EpipolarSpan::Bounded { end } => self.ctx.strip_edge_intersection(
                cam,
                entry.contour_id,
                entry.contour_strip_id,
                epipole,
                end,
            ),
            EpipolarSpan::Unbounded { through } => self
                .ctx
                .strip_points_global(cam, strip)
                .and_then(|(a, b)| ray_segment_intersection(epipole, through, &a, &b)),
        };
        let Some(hit) = hit else {
            log::trace!("camera {cam}: queued crossing on strip {strip} fell through");
            return;
        };
        debug_assert!(
            self.ctx
                .is_inside_strip(cam, entry.contour_id, entry.contour_strip_id, &hit.point),
            "interior crossing must lie inside the strip wedge"
        );

        let sg_id = self.ctx.cameras[cam].generators[strip];
        let (ray, wg_boundary, wg_left) = {
            let wg = self.ctx.mesh.generator(wg_id);
            (wg.left_ray, wg.from_boundary, wg.left_gen)
        };
        let (normal, sg_boundary, sg_right) = {
            let sg = self.ctx.mesh.generator(sg_id);
            (sg.normal(), sg.from_boundary, sg.right_gen)
        };
        let cam_center = self.calibration.camera(cam).center();
        let Some(point) = ray.intersect_plane(&cam_center, &normal) else {
            log::trace!("camera {cam}: ray parallel to strip {strip} plane, crossing dropped");
            return;
        };

        let is_generator_vertex = !wg_boundary && !sg_boundary;
        let prev_swept = self.ctx.mesh.generator(wg_id).vertices.last().copied();

        let va = self
            .ctx
            .mesh
            .add_vertex(wg_id, point, ray.dir, is_generator_vertex);
        let vb = self
            .ctx
            .mesh
            .add_vertex(sg_id, point, ray.dir, is_generator_vertex);
        self.ctx.mesh.link_opposite(va, vb);
        {
            let v = self.ctx.mesh.vertex_mut(va);
            v.left_generator = Some(sg_id);
            v.right_generator = sg_right;
        }
        {
            let v = self.ctx.mesh.vertex_mut(vb);
            v.left_generator = wg_left;
            v.right_generator = Some(wg_id);
        }

        let tol = self.options.coincidence_tol;
        self.ctx.mesh.attach_swept_vertex(wg_id, va, tol);
        self.ctx.mesh.attach_strip_vertex(sg_id, vb, tol);
        if let Some(prev) = prev_swept {
            self.ctx.mesh.link_left_right(prev, va);
        }
        if let Some(prev) = last_strip_vertex[strip] {
            self.ctx.mesh.link_left_right(prev, vb);
        }
        last_strip_vertex[strip] = Some(vb);
    }

    fn emit_viewing_edges(&mut self, cam: usize, partner: usize, swept: &[GeneratorId]) {
        let mut emitted = 0usize;
        for &wg_id in swept {
            let sweep = self.ctx.mesh.generator(wg_id).vertices.clone();
            for i in 0..sweep.len().saturating_sub(1) {
                let (near_id, far_id) = (sweep[i], sweep[i + 1]);
                let a = self.ctx.mesh.vertex(near_id).coords;
                let b = self.ctx.mesh.vertex(far_id).coords;
                let mid = Pt3::from((a.coords + b.coords) * 0.5);
                if !self.point_inside_all_silhouettes(&mid, partner) {
                    continue;
                }
                let Some(opposite) = self.ctx.mesh.vertex(near_id).opposite else {
                    debug_assert!(false, "swept vertices are always paired");
                    continue;
                };
                let sg_id = self.ctx.mesh.vertex(opposite).owning_generator;
                let partner_strip = self.ctx.mesh.generator(sg_id).strip;
                let own_strip = self.ctx.mesh.generator(wg_id).strip;
                let front_facing = self.ctx.strip_faces_epipole(
                    cam,
                    partner_strip.contour,
                    partner_strip.strip,
                );
                let occluding = self.ctx.cameras[partner]
                    .occluding
                    .get(own_strip.contour)
                    .copied()
                    .unwrap_or(false);
                let edge = self.ctx.mesh.add_viewing_edge(
                    own_strip,
                    partner_strip,
                    wg_id,
                    sg_id,
                    near_id,
                    far_id,
                    front_facing,
                    occluding,
                );
                self.ctx.mesh.mark_used_at(wg_id, i);
                self.ctx.mesh.mark_used_at(wg_id, i + 1);
                let left_gen = {
                    let g = self.ctx.mesh.generator_mut(wg_id);
                    if g.left_viewing_edge.is_none() {
                        g.left_viewing_edge = Some(edge);
                    }
                    g.left_gen
                };
                if let Some(lg) = left_gen {
                    let g = self.ctx.mesh.generator_mut(lg);
                    if g.right_viewing_edge.is_none() {
                        g.right_viewing_edge = Some(edge);
                    }
                }
                emitted += 1;
            }
        }
        log::debug!("camera {cam}: emitted {emitted} viewing edges");
    }

    /// Hierarchy-aware visibility of a 3D point: its projection must land
    /// inside the silhouette of every participating camera except `skip`.
    ///
    /// Cameras that built primitives are tested by parity over their
    /// conditioned contours. A camera whose silhouette was clipped by the
    /// frame only rules out points projecting outside the frame, and cameras
    /// that were skipped still constrain through their raw silhouettes. A
    /// point that fails to project is outside.
    fn point_inside_all_silhouettes(&self, point: &Pt3, skip: usize) -> bool {
        for &q in &self.ctx.silhouette_cameras {
            if q == skip {
                continue;
            }
            let Some(px) = self.calibration.camera(q).project(point) else {
                return false;
            };
            let qc = &self.ctx.cameras[q];
            if qc.boundary_primitives {
                let (w, h) = self.calibration.image_size(q);
                if !(px.x > 0.0 && px.y > 0.0 && px.x < w as Real && px.y < h as Real) {
                    return false;
                }
            } else if !qc.contours.is_empty() {
                if !point_in_contours(&qc.contours, &qc.condition(&px)) {
                    return false;
                }
            } else if let Some(sil) = self.silhouettes.as_ref().and_then(|s| s.get(q)) {
                if !sil.contains(&px) {
                    return false;
                }
            }
        }
        true
    }
}
