//! Vertex and generator arena for the growing hull mesh.
//!
//! Vertices and generators live in flat arenas and reference each other by
//! typed ids, so adjacency (left/right along a viewing edge, opposite across a
//! crossing, generator chains along a contour) is always symmetric by
//! construction: the arena owns both sides of every link.

use std::cell::OnceCell;

use visual_hull_core::{Pt3, Real, Vec3, WorldRay};

/// Identifier of a vertex in the hull arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(pub u32);

impl VertexId {
    /// Arena slot of this vertex.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifier of a generator in the hull arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeneratorId(pub u32);

impl GeneratorId {
    /// Arena slot of this generator.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A `(camera, contour, strip)` address of one silhouette strip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StripRef {
    /// Camera id.
    pub cam: usize,
    /// Contour index within the camera.
    pub contour: usize,
    /// Strip index within the contour (the edge starting at that vertex).
    pub strip: usize,
}

/// A reconstructed hull vertex.
///
/// Crossing resolution always creates vertices in pairs: one on the walking
/// generator's ray and its `opposite` on the crossed partner strip, both at
/// the same 3D point.
#[derive(Debug, Clone)]
pub struct HullVertex {
    /// Own id (arena slot).
    pub id: VertexId,
    /// Generator whose resolution created this vertex.
    pub owning_generator: GeneratorId,
    /// Previous vertex along the same viewing-edge chain.
    pub left: Option<VertexId>,
    /// Next vertex along the same viewing-edge chain.
    pub right: Option<VertexId>,
    /// Twin vertex created by the same crossing.
    pub opposite: Option<VertexId>,
    /// Generator bounding the crossed boundary on its left.
    pub left_generator: Option<GeneratorId>,
    /// Generator bounding the crossed boundary on its right.
    pub right_generator: Option<GeneratorId>,
    /// Reconstructed 3D position.
    pub coords: Pt3,
    /// Unit direction of the viewing edge through this vertex.
    pub edge_dir: Vec3,
    /// Cached position of `left`, kept in sync by the linker.
    pub left_coords: Option<Pt3>,
    /// Cached position of `right`, kept in sync by the linker.
    pub right_coords: Option<Pt3>,
    /// `true` for vertices on real contour generators, `false` for vertices
    /// synthesized on image-frame primitives.
    pub is_generator_vertex: bool,
    /// Earlier vertex this one coincides with, when the attachment was
    /// degenerate. Consumers walking a generator can skip vertices carrying
    /// this to deduplicate triple points.
    pub ignore_index: Option<VertexId>,
}

/// An epipolar ray candidate attached to one contour strip.
#[derive(Debug, Clone)]
pub struct Generator {
    /// Own id (arena slot).
    pub id: GeneratorId,
    /// Strip this generator was built from.
    pub strip: StripRef,
    /// Ray through the strip's start point.
    pub left_ray: WorldRay,
    /// Ray through the strip's end point.
    pub right_ray: WorldRay,
    /// `true` when the strip was synthesized from the image frame rather than
    /// a real contour.
    pub from_boundary: bool,
    /// Previous generator along the contour chain.
    pub left_gen: Option<GeneratorId>,
    /// Next generator along the contour chain.
    pub right_gen: Option<GeneratorId>,
    /// First viewing edge emitted along the left bounding ray.
    pub left_viewing_edge: Option<usize>,
    /// First viewing edge emitted along the right bounding ray.
    pub right_viewing_edge: Option<usize>,
    /// Vertices created by this generator's own sweep, nearest first.
    pub vertices: Vec<VertexId>,
    /// Per-vertex consumption flags, parallel to `vertices`.
    pub used: Vec<bool>,
    /// Every vertex attached to this generator, in creation order. The sweep
    /// list is an ordered subsequence of this one.
    pub all_vertices: Vec<VertexId>,
    /// Vertices that coincided with an earlier attachment.
    pub triple_points: Vec<VertexId>,
    normal: OnceCell<Vec3>,
}

impl Generator {
    /// Outward normal of the viewing plane spanned by the bounding rays.
    ///
    /// Computed on first use. Under the material-left winding convention the
    /// cross of the right ray with the left one points to the exterior side.
    /// Degenerate generators (parallel rays) report a zero vector.
    pub fn normal(&self) -> Vec3 {
        *self.normal.get_or_init(|| {
            let n = self.right_ray.dir.cross(&self.left_ray.dir);
            if n.norm_squared() > 0.0 {
                n.normalize()
            } else {
                Vec3::zeros()
            }
        })
    }
}

/// One reconstructed viewing-edge span.
#[derive(Debug, Clone)]
pub struct ViewingEdgeInfo {
    /// Own id (slot in the mesh's edge list).
    pub id: usize,
    /// Strip whose generator swept this edge.
    pub own: StripRef,
    /// Partner strip crossed at the near endpoint.
    pub partner: StripRef,
    /// Sweeping generator.
    pub generator: GeneratorId,
    /// Generator of the crossed partner strip.
    pub partner_generator: GeneratorId,
    /// Near endpoint (smaller epipolar distance).
    pub near_vertex: VertexId,
    /// Far endpoint.
    pub far_vertex: VertexId,
    /// Position of the near endpoint.
    pub near_point: Pt3,
    /// Position of the far endpoint.
    pub far_point: Pt3,
    /// `true` when the partner strip faces the epipole at the near crossing.
    pub front_facing: bool,
    /// `true` when the sweeping contour outlines an occluder.
    pub occluding: bool,
}

impl ViewingEdgeInfo {
    /// Length of the span in world units.
    pub fn length(&self) -> Real {
        (self.far_point - self.near_point).norm()
    }
}

/// Arena holding every vertex, generator, and viewing edge of one
/// reconstruction.
#[derive(Debug, Default)]
pub struct HullMesh {
    vertices: Vec<HullVertex>,
    generators: Vec<Generator>,
    viewing_edges: Vec<ViewingEdgeInfo>,
}

impl HullMesh {
    /// Empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all contents.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.generators.clear();
        self.viewing_edges.clear();
    }

    /// Allocate a generator for a strip with its two bounding rays.
    pub fn add_generator(
        &mut self,
        strip: StripRef,
        left_ray: WorldRay,
        right_ray: WorldRay,
        from_boundary: bool,
    ) -> GeneratorId {
        let id = GeneratorId(self.generators.len() as u32);
        self.generators.push(Generator {
            id,
            strip,
            left_ray,
            right_ray,
            from_boundary,
            left_gen: None,
            right_gen: None,
            left_viewing_edge: None,
            right_viewing_edge: None,
            vertices: Vec::new(),
            used: Vec::new(),
            all_vertices: Vec::new(),
            triple_points: Vec::new(),
            normal: OnceCell::new(),
        });
        id
    }

    /// Allocate an unlinked vertex.
    pub fn add_vertex(
        &mut self,
        owning_generator: GeneratorId,
        coords: Pt3,
        edge_dir: Vec3,
        is_generator_vertex: bool,
    ) -> VertexId {
        let id = VertexId(self.vertices.len() as u32);
        self.vertices.push(HullVertex {
            id,
            owning_generator,
            left: None,
            right: None,
            opposite: None,
            left_generator: None,
            right_generator: None,
            coords,
            edge_dir,
            left_coords: None,
            right_coords: None,
            is_generator_vertex,
            ignore_index: None,
        });
        id
    }

    /// Link `a` and `b` as consecutive vertices of one viewing-edge chain,
    /// updating the cached neighbor coordinates on both sides.
    pub fn link_left_right(&mut self, a: VertexId, b: VertexId) {
        let a_coords = self.vertices[a.index()].coords;
        let b_coords = self.vertices[b.index()].coords;
        {
            let va = &mut self.vertices[a.index()];
            va.right = Some(b);
            va.right_coords = Some(b_coords);
        }
        {
            let vb = &mut self.vertices[b.index()];
            vb.left = Some(a);
            vb.left_coords = Some(a_coords);
        }
    }

    /// Link the two vertices of one crossing as opposites.
    pub fn link_opposite(&mut self, a: VertexId, b: VertexId) {
        self.vertices[a.index()].opposite = Some(b);
        self.vertices[b.index()].opposite = Some(a);
    }

    /// Append a vertex to a generator's sweep list (and to its full list).
    ///
    /// The sweep list stays ordered because candidates resolve nearest-first;
    /// appending a coincident vertex also records it as a triple point.
    pub fn attach_swept_vertex(&mut self, gen: GeneratorId, v: VertexId, coincidence_tol: Real) {
        self.note_triple_point(gen, v, coincidence_tol);
        let g = &mut self.generators[gen.index()];
        g.vertices.push(v);
        g.used.push(false);
        g.all_vertices.push(v);
    }

    /// Append a vertex only to a generator's full list (crossings landing on
    /// its strip from other cameras' sweeps).
    pub fn attach_strip_vertex(&mut self, gen: GeneratorId, v: VertexId, coincidence_tol: Real) {
        self.note_triple_point(gen, v, coincidence_tol);
        self.generators[gen.index()].all_vertices.push(v);
    }

    fn note_triple_point(&mut self, gen: GeneratorId, v: VertexId, tol: Real) {
        let coords = self.vertices[v.index()].coords;
        let coincident = self.generators[gen.index()]
            .all_vertices
            .iter()
            .copied()
            .find(|&other| (self.vertices[other.index()].coords - coords).norm() <= tol);
        if let Some(other) = coincident {
            self.generators[gen.index()].triple_points.push(v);
            self.vertices[v.index()].ignore_index = Some(other);
        }
    }

    /// Mark the sweep vertex at `sweep_idx` as consumed by a viewing edge.
    pub fn mark_used_at(&mut self, gen: GeneratorId, sweep_idx: usize) {
        self.generators[gen.index()].used[sweep_idx] = true;
    }

    /// Record a viewing edge and return its id. Endpoint positions are
    /// snapshotted from the arena.
    pub fn add_viewing_edge(
        &mut self,
        own: StripRef,
        partner: StripRef,
        generator: GeneratorId,
        partner_generator: GeneratorId,
        near_vertex: VertexId,
        far_vertex: VertexId,
        front_facing: bool,
        occluding: bool,
    ) -> usize {
        let id = self.viewing_edges.len();
        let near_point = self.vertices[near_vertex.index()].coords;
        let far_point = self.vertices[far_vertex.index()].coords;
        self.viewing_edges.push(ViewingEdgeInfo {
            id,
            own,
            partner,
            generator,
            partner_generator,
            near_vertex,
            far_vertex,
            near_point,
            far_point,
            front_facing,
            occluding,
        });
        id
    }

    /// Vertex by id.
    pub fn vertex(&self, id: VertexId) -> &HullVertex {
        &self.vertices[id.index()]
    }

    /// Mutable vertex by id.
    pub fn vertex_mut(&mut self, id: VertexId) -> &mut HullVertex {
        &mut self.vertices[id.index()]
    }

    /// Generator by id.
    pub fn generator(&self, id: GeneratorId) -> &Generator {
        &self.generators[id.index()]
    }

    /// Mutable generator by id.
    pub fn generator_mut(&mut self, id: GeneratorId) -> &mut Generator {
        &mut self.generators[id.index()]
    }

    /// Viewing edge by id.
    pub fn viewing_edge(&self, id: usize) -> &ViewingEdgeInfo {
        &self.viewing_edges[id]
    }

    /// All vertices in creation order.
    pub fn vertices(&self) -> &[HullVertex] {
        &self.vertices
    }

    /// All generators in creation order.
    pub fn generators(&self) -> &[Generator] {
        &self.generators
    }

    /// All viewing edges in emission order.
    pub fn viewing_edges(&self) -> &[ViewingEdgeInfo] {
        &self.viewing_edges
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of generators.
    pub fn num_generators(&self) -> usize {
        self.generators.len()
    }

    /// Number of viewing edges.
    pub fn num_viewing_edges(&self) -> usize {
        self.viewing_edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visual_hull_core::Pt3;

    fn dummy_ray(dir: Vec3) -> WorldRay {
        WorldRay {
            origin: Pt3::origin(),
            dir: dir.normalize(),
        }
    }

    fn strip(cam: usize, strip: usize) -> StripRef {
        StripRef {
            cam,
            contour: 0,
            strip,
        }
    }

    #[test]
    fn adjacency_links_are_symmetric() {
        let mut mesh = HullMesh::new();
        let g = mesh.add_generator(
            strip(0, 0),
            dummy_ray(Vec3::new(1.0, 0.0, 1.0)),
            dummy_ray(Vec3::new(-1.0, 0.0, 1.0)),
            false,
        );
        let a = mesh.add_vertex(g, Pt3::new(0.0, 0.0, 1.0), Vec3::z(), true);
        let b = mesh.add_vertex(g, Pt3::new(0.0, 0.0, 2.0), Vec3::z(), true);

        mesh.link_left_right(a, b);
        mesh.link_opposite(a, b);

        assert_eq!(mesh.vertex(a).right, Some(b));
        assert_eq!(mesh.vertex(b).left, Some(a));
        assert_eq!(mesh.vertex(a).right_coords, Some(Pt3::new(0.0, 0.0, 2.0)));
        assert_eq!(mesh.vertex(b).left_coords, Some(Pt3::new(0.0, 0.0, 1.0)));
        assert_eq!(mesh.vertex(a).opposite, Some(b));
        assert_eq!(mesh.vertex(b).opposite, Some(a));
    }

    #[test]
    fn sweep_list_is_an_ordered_subsequence_of_the_full_list() {
        let mut mesh = HullMesh::new();
        let g = mesh.add_generator(
            strip(0, 0),
            dummy_ray(Vec3::new(1.0, 0.0, 1.0)),
            dummy_ray(Vec3::new(-1.0, 0.0, 1.0)),
            false,
        );

        let mut swept = Vec::new();
        for i in 0..4 {
            let v = mesh.add_vertex(g, Pt3::new(i as f64, 0.0, 1.0), Vec3::z(), true);
            mesh.attach_swept_vertex(g, v, 1e-9);
            swept.push(v);
            // Interleave strip-only attachments from a fictional partner.
            let w = mesh.add_vertex(g, Pt3::new(i as f64, 5.0, 1.0), Vec3::z(), true);
            mesh.attach_strip_vertex(g, w, 1e-9);
        }

        let gen = mesh.generator(g);
        assert_eq!(gen.vertices, swept);
        assert_eq!(gen.used, vec![false; 4]);
        // Subsequence check: walk all_vertices and consume the sweep list.
        let mut cursor = gen.vertices.iter().peekable();
        for v in &gen.all_vertices {
            if cursor.peek() == Some(&v) {
                cursor.next();
            }
        }
        assert!(cursor.peek().is_none(), "sweep order must survive in the full list");
    }

    #[test]
    fn coincident_vertices_are_recorded_as_triple_points() {
        let mut mesh = HullMesh::new();
        let g = mesh.add_generator(
            strip(0, 0),
            dummy_ray(Vec3::new(1.0, 0.0, 1.0)),
            dummy_ray(Vec3::new(-1.0, 0.0, 1.0)),
            false,
        );
        let a = mesh.add_vertex(g, Pt3::new(1.0, 2.0, 3.0), Vec3::z(), true);
        mesh.attach_swept_vertex(g, a, 1e-6);
        assert!(mesh.generator(g).triple_points.is_empty());
        assert_eq!(mesh.vertex(a).ignore_index, None);

        let b = mesh.add_vertex(g, Pt3::new(1.0, 2.0, 3.0 + 1e-9), Vec3::z(), true);
        mesh.attach_strip_vertex(g, b, 1e-6);
        assert_eq!(mesh.generator(g).triple_points, vec![b]);
        assert_eq!(mesh.vertex(b).ignore_index, Some(a));

        let c = mesh.add_vertex(g, Pt3::new(9.0, 9.0, 9.0), Vec3::z(), true);
        mesh.attach_swept_vertex(g, c, 1e-6);
        assert_eq!(mesh.generator(g).triple_points, vec![b]);
        assert_eq!(mesh.vertex(c).ignore_index, None);
    }

    #[test]
    fn viewing_edges_snapshot_endpoint_positions() {
        let mut mesh = HullMesh::new();
        let g = mesh.add_generator(
            strip(0, 0),
            dummy_ray(Vec3::new(1.0, 0.0, 1.0)),
            dummy_ray(Vec3::new(-1.0, 0.0, 1.0)),
            false,
        );
        let near = mesh.add_vertex(g, Pt3::new(0.0, 0.0, 1.0), Vec3::z(), true);
        let far = mesh.add_vertex(g, Pt3::new(0.0, 0.0, 4.0), Vec3::z(), true);
        let e = mesh.add_viewing_edge(strip(0, 0), strip(1, 0), g, g, near, far, true, false);

        let edge = mesh.viewing_edge(e);
        assert_eq!(edge.near_point, Pt3::new(0.0, 0.0, 1.0));
        assert_eq!(edge.far_point, Pt3::new(0.0, 0.0, 4.0));
        assert!((edge.length() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn generator_normal_points_outward_and_is_cached() {
        let mut mesh = HullMesh::new();
        // Camera at the origin looking +z; the strip edge runs from pixel
        // (1,-1) to (1,1) with the interior at x < 1, so outward is +x.
        let g = mesh.add_generator(
            strip(0, 0),
            dummy_ray(Vec3::new(1.0, -1.0, 1.0)),
            dummy_ray(Vec3::new(1.0, 1.0, 1.0)),
            false,
        );
        let n = mesh.generator(g).normal();
        let again = mesh.generator(g).normal();
        assert_eq!(n, again);
        assert!((n.norm() - 1.0).abs() < 1e-12);
        assert!(n.x > 0.0, "outward component expected, got {n:?}");
    }
}
