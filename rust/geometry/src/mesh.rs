// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures and assembly
//!
//! Assembly is the only place global vertex indices are produced: each
//! element's local run is appended and its faces are shifted by the
//! running vertex count.

use crate::element::{Element3D, ExtrudedElement, TriangleIndex};
use nalgebra::Point3;
use rustc_hash::FxHashMap;

/// Triangle mesh in a single global index space
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions, in assembly order
    pub positions: Vec<Point3<f64>>,
    /// Triangles indexing into `positions`
    pub faces: Vec<TriangleIndex>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>) {
        self.positions.push(position);
    }

    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.push_face(TriangleIndex::new(i0, i1, i2));
    }

    /// Push an already-global face; indices must not reference vertices
    /// that have not been appended yet
    #[inline]
    fn push_face(&mut self, face: TriangleIndex) {
        debug_assert!(
            (face.max_index() as usize) < self.positions.len(),
            "face {} references a vertex beyond {}",
            face,
            self.positions.len()
        );
        self.faces.push(face);
    }

    /// Append one element's vertex run and its local faces
    pub fn append_element(&mut self, element: &Element3D) {
        let base = self.vertex_count() as u32;
        self.positions.extend_from_slice(&element.vertices);
        for &face in &element.triangles {
            self.push_face(face.offset(base));
        }
    }

    /// Append an extruded solid: bottom run, bottom faces, top run, top
    /// faces, then the side walls over the concatenated run
    pub fn append_extruded(&mut self, solid: &ExtrudedElement) {
        let base = self.vertex_count() as u32;
        self.positions.reserve(solid.vertex_count());
        self.faces.reserve(solid.face_count());

        self.append_element(&solid.bottom);
        self.append_element(&solid.top);
        for &face in &solid.side_walls {
            self.push_face(face.offset(base));
        }
    }

    /// Merge another mesh into this one
    #[inline]
    pub fn merge(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }

        let vertex_offset = self.vertex_count() as u32;

        self.positions.reserve(other.positions.len());
        self.faces.reserve(other.faces.len());

        self.positions.extend_from_slice(&other.positions);
        self.faces
            .extend(other.faces.iter().map(|f| f.offset(vertex_offset)));
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Calculate bounds (min, max)
    #[inline]
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);

        for p in &self.positions {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        (min, max)
    }

    /// Merge vertices that fall into the same grid cell of size `tolerance`
    ///
    /// Faces are remapped to the surviving vertices and faces that collapse
    /// to fewer than three distinct vertices are dropped. Returns the number
    /// of vertices removed.
    pub fn weld_vertices(&mut self, tolerance: f64) -> usize {
        if self.is_empty() || !(tolerance > 0.0) {
            return 0;
        }

        let inv = 1.0 / tolerance;
        let mut cells: FxHashMap<(i64, i64, i64), u32> = FxHashMap::default();
        let mut remap = Vec::with_capacity(self.positions.len());
        let mut welded = Vec::with_capacity(self.positions.len());

        for p in &self.positions {
            let key = (
                (p.x * inv).round() as i64,
                (p.y * inv).round() as i64,
                (p.z * inv).round() as i64,
            );
            let index = *cells.entry(key).or_insert_with(|| {
                welded.push(*p);
                (welded.len() - 1) as u32
            });
            remap.push(index);
        }

        let removed = self.positions.len() - welded.len();
        self.positions = welded;
        self.faces = self
            .faces
            .iter()
            .map(|f| {
                let [a, b, c] = f.0;
                TriangleIndex::new(remap[a as usize], remap[b as usize], remap[c as usize])
            })
            .filter(|f| {
                let [a, b, c] = f.0;
                a != b && b != c && a != c
            })
            .collect();

        removed
    }
}

/// Assemble extruded elements, in order, into one mesh
pub fn assemble<'a, I>(elements: I) -> Mesh
where
    I: IntoIterator<Item = &'a ExtrudedElement>,
{
    let mut mesh = Mesh::new();
    for solid in elements {
        mesh.append_extruded(solid);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element2D;
    use crate::extrusion::{extrude_element, ExtrusionRange};
    use crate::normalize::normalize_element;
    use crate::triangulation::{triangulate_element, TriangulationBackend};
    use nalgebra::Point2;

    fn extruded_square(origin: f64, source_index: usize) -> ExtrudedElement {
        let polygon = vec![
            Point2::new(origin, origin),
            Point2::new(origin + 10.0, origin),
            Point2::new(origin + 10.0, origin + 10.0),
            Point2::new(origin, origin + 10.0),
        ];
        let element = normalize_element(Element2D::new(polygon, source_index)).unwrap();
        let element = triangulate_element(element, TriangulationBackend::default()).unwrap();
        extrude_element(&element, ExtrusionRange::new(0.0, 5.0).unwrap()).unwrap()
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = Mesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_assemble_single_square() {
        let mesh = assemble([&extruded_square(0.0, 0)]);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn test_assemble_offsets_second_element() {
        let first = extruded_square(0.0, 0);
        let second = extruded_square(20.0, 1);
        let mesh = assemble([&first, &second]);

        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.triangle_count(), 24);
        // Faces of the second solid only reference its own run
        assert!(mesh.faces[12..]
            .iter()
            .all(|f| f.0.iter().all(|&i| (8..16).contains(&i))));
        assert_eq!(mesh.positions[8], Point3::new(20.0, 20.0, 0.0));
    }

    #[test]
    fn test_no_forward_references() {
        let solids: Vec<_> = (0..5).map(|i| extruded_square(i as f64 * 15.0, i)).collect();
        let mut mesh = Mesh::new();
        for solid in &solids {
            let before = mesh.faces.len();
            mesh.append_extruded(solid);
            let count = mesh.vertex_count() as u32;
            assert!(mesh.faces[before..].iter().all(|f| f.max_index() < count));
        }
    }

    #[test]
    fn test_vertices_not_deduplicated() {
        // Two identical solids keep separate vertex runs
        let solid = extruded_square(0.0, 0);
        let mesh = assemble([&solid, &solid]);
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.positions[0], mesh.positions[8]);
    }

    #[test]
    fn test_merge() {
        let mut mesh1 = assemble([&extruded_square(0.0, 0)]);
        let mesh2 = assemble([&extruded_square(20.0, 1)]);

        mesh1.merge(&mesh2);
        assert_eq!(mesh1.vertex_count(), 16);
        assert_eq!(mesh1.triangle_count(), 24);
        assert_eq!(mesh1.faces[12], mesh2.faces[0].offset(8));
    }

    #[test]
    fn test_weld_vertices_merges_coincident_runs() {
        let solid = extruded_square(0.0, 0);
        let mut mesh = assemble([&solid, &solid]);

        let removed = mesh.weld_vertices(1e-9);
        assert_eq!(removed, 8);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 24);
        assert!(mesh.faces.iter().all(|f| f.max_index() < 8));
    }

    #[test]
    fn test_weld_vertices_drops_collapsed_faces() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(0.0, 0.0, 1e-12));
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        mesh.add_triangle(0, 1, 2);

        mesh.weld_vertices(1e-6);
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_weld_with_zero_tolerance_is_noop() {
        let mut mesh = assemble([&extruded_square(0.0, 0)]);
        assert_eq!(mesh.weld_vertices(0.0), 0);
        assert_eq!(mesh.vertex_count(), 8);
    }

    #[test]
    fn test_bounds() {
        let mesh = assemble([&extruded_square(0.0, 0), &extruded_square(20.0, 1)]);
        let (min, max) = mesh.bounds();
        assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3::new(30.0, 30.0, 5.0));
    }
}
