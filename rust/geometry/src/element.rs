// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-polygon element definitions
//!
//! Every element owns its own vertex run. Triangle indices stored on an
//! element are local to that run; global indices only exist once the
//! mesh assembler has appended the element to a [`crate::Mesh`].

use crate::error::{Error, Result};
use nalgebra::{Point2, Point3};
use std::fmt;

/// Ordered triple of vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriangleIndex(pub [u32; 3]);

impl TriangleIndex {
    #[inline]
    pub fn new(a: u32, b: u32, c: u32) -> Self {
        Self([a, b, c])
    }

    /// Shift every component by `offset`
    #[inline]
    pub fn offset(self, offset: u32) -> Self {
        let [a, b, c] = self.0;
        Self([a + offset, b + offset, c + offset])
    }

    /// Same triangle with opposite winding
    #[inline]
    pub fn flipped(self) -> Self {
        let [a, b, c] = self.0;
        Self([a, c, b])
    }

    #[inline]
    pub fn max_index(self) -> u32 {
        self.0.iter().copied().max().unwrap_or(0)
    }

    /// The three directed edges (a→b, b→c, c→a)
    #[inline]
    pub fn edges(self) -> [(u32, u32); 3] {
        let [a, b, c] = self.0;
        [(a, b), (b, c), (c, a)]
    }
}

impl fmt::Display for TriangleIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "[{}, {}, {}]", a, b, c)
    }
}

/// A single source polygon in 2D, before extrusion
#[derive(Debug, Clone)]
pub struct Element2D {
    /// Boundary vertices; the closing edge is implicit
    pub polygon: Vec<Point2<f64>>,
    /// Local triangle indices into `polygon` (empty until triangulated)
    pub triangles: Vec<TriangleIndex>,
    /// Set when the normalizer reversed a clockwise boundary
    pub reversed: bool,
    /// Position of the source polygon in its layer's input list
    pub source_index: usize,
}

impl Element2D {
    /// Create an un-normalized, un-triangulated element
    pub fn new(polygon: Vec<Point2<f64>>, source_index: usize) -> Self {
        Self {
            polygon,
            triangles: Vec::new(),
            reversed: false,
            source_index,
        }
    }

    /// Build an element from a flat `x0, y0, x1, y1, ...` coordinate list
    pub fn from_flat(coords: &[f64], source_index: usize) -> Result<Self> {
        Ok(Self::new(polygon_from_flat(coords)?, source_index))
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.polygon.len()
    }

    #[inline]
    pub fn is_triangulated(&self) -> bool {
        !self.triangles.is_empty()
    }
}

/// One z-plane copy of an element
#[derive(Debug, Clone, Default)]
pub struct Element3D {
    pub vertices: Vec<Point3<f64>>,
    pub triangles: Vec<TriangleIndex>,
}

impl Element3D {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Closed solid produced from one [`Element2D`]
///
/// Local index space: `0..n` addresses `bottom.vertices`, `n..2n`
/// addresses `top.vertices`. Cap triangles are relative to their own
/// run; `side_walls` are relative to the concatenated run.
#[derive(Debug, Clone)]
pub struct ExtrudedElement {
    pub bottom: Element3D,
    pub top: Element3D,
    pub side_walls: Vec<TriangleIndex>,
    pub source_index: usize,
}

impl ExtrudedElement {
    /// Total number of vertices in the local run (bottom + top)
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.bottom.vertex_count() + self.top.vertex_count()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.bottom.triangles.len() + self.top.triangles.len() + self.side_walls.len()
    }

    /// All faces expressed in the concatenated local index space
    pub fn local_faces(&self) -> Vec<TriangleIndex> {
        let top_base = self.bottom.vertex_count() as u32;
        let mut faces = Vec::with_capacity(self.face_count());
        faces.extend_from_slice(&self.bottom.triangles);
        faces.extend(self.top.triangles.iter().map(|t| t.offset(top_base)));
        faces.extend_from_slice(&self.side_walls);
        faces
    }
}

/// Pair up a flat coordinate list into a polygon boundary
///
/// A trailing vertex equal to the first one is dropped, since layout
/// data often stores the closing vertex explicitly.
pub fn polygon_from_flat(coords: &[f64]) -> Result<Vec<Point2<f64>>> {
    if coords.len() % 2 != 0 {
        return Err(Error::MalformedPolygon(format!(
            "odd coordinate count {}",
            coords.len()
        )));
    }
    if let Some(bad) = coords.iter().find(|c| !c.is_finite()) {
        return Err(Error::MalformedPolygon(format!(
            "non-finite coordinate {}",
            bad
        )));
    }

    let mut points: Vec<Point2<f64>> = coords
        .chunks_exact(2)
        .map(|pair| Point2::new(pair[0], pair[1]))
        .collect();

    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    Ok(points)
}
