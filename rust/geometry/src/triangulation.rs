// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation
//!
//! Constrained Delaunay triangulation (spade) with the polygon boundary as
//! a closed constraint loop, plus an earcutr ear-clipping backend. Both
//! return indices into the polygon's own vertex list, never introduce new
//! vertices, and emit every triangle counter-clockwise.

use crate::element::{Element2D, TriangleIndex};
use crate::error::{Error, Result};
use nalgebra::Point2;
use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{ConstrainedDelaunayTriangulation, Point2 as CdtPoint, Triangulation};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

type Cdt = ConstrainedDelaunayTriangulation<CdtPoint<f64>>;

/// Triangulation algorithm used for polygon interiors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriangulationBackend {
    /// Constrained Delaunay triangulation with outer-face erasure
    #[default]
    ConstrainedDelaunay,
    /// Ear clipping (earcutr)
    EarClipping,
}

impl TriangulationBackend {
    /// Triangulate a simple polygon with this backend
    pub fn triangulate(self, points: &[Point2<f64>]) -> Result<Vec<TriangleIndex>> {
        match self {
            TriangulationBackend::ConstrainedDelaunay => triangulate_polygon(points),
            TriangulationBackend::EarClipping => triangulate_polygon_earcut(points),
        }
    }
}

impl FromStr for TriangulationBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cdt" | "delaunay" => Ok(TriangulationBackend::ConstrainedDelaunay),
            "earcut" | "ear-clipping" => Ok(TriangulationBackend::EarClipping),
            other => Err(format!("unknown triangulator '{}'", other)),
        }
    }
}

impl fmt::Display for TriangulationBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriangulationBackend::ConstrainedDelaunay => write!(f, "cdt"),
            TriangulationBackend::EarClipping => write!(f, "earcut"),
        }
    }
}

/// Twice the signed area of a triangle (positive when counter-clockwise)
#[inline]
fn doubled_signed_area(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

#[inline]
fn orient_ccw(points: &[Point2<f64>], tri: TriangleIndex) -> TriangleIndex {
    let [a, b, c] = tri.0;
    let area = doubled_signed_area(
        &points[a as usize],
        &points[b as usize],
        &points[c as usize],
    );
    if area < 0.0 {
        tri.flipped()
    } else {
        tri
    }
}

/// A simple polygon always triangulates into exactly `n - 2` triangles
fn check_triangle_count(n: usize, triangles: Vec<TriangleIndex>) -> Result<Vec<TriangleIndex>> {
    if triangles.len() != n - 2 {
        return Err(Error::TriangulationError(format!(
            "expected {} triangles for {} vertices, got {} (polygon is not simple)",
            n - 2,
            n,
            triangles.len()
        )));
    }
    Ok(triangles)
}

/// Triangulate a simple polygon (no holes) by constrained Delaunay triangulation
/// Returns triangle indices into the input points
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<TriangleIndex>> {
    let n = points.len();

    if n < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    // FAST PATH: Triangle - no triangulation needed
    if n == 3 {
        return Ok(vec![orient_ccw(points, TriangleIndex::new(0, 1, 2))]);
    }

    let mut cdt = Cdt::new();
    let mut handles = Vec::with_capacity(n);
    for (i, p) in points.iter().enumerate() {
        let handle = cdt
            .insert(CdtPoint::new(p.x, p.y))
            .map_err(|e| Error::TriangulationError(format!("vertex {}: {:?}", i, e)))?;
        // spade merges coincident points into the existing vertex
        if handle.index() != i {
            return Err(Error::TriangulationError(format!(
                "vertex {} duplicates vertex {}",
                i,
                handle.index()
            )));
        }
        handles.push(handle);
    }

    // The whole boundary is one closed constraint loop
    for i in 0..n {
        let from = handles[i];
        let to = handles[(i + 1) % n];
        if !cdt.can_add_constraint(from, to) {
            return Err(Error::TriangulationError(format!(
                "boundary edge {}-{} crosses another boundary edge",
                i,
                (i + 1) % n
            )));
        }
        cdt.add_constraint(from, to);
    }

    let triangles = interior_faces(&cdt)
        .into_iter()
        .map(|fixed| {
            let [a, b, c] = cdt.face(fixed).vertices();
            let tri = TriangleIndex::new(
                a.fix().index() as u32,
                b.fix().index() as u32,
                c.fix().index() as u32,
            );
            orient_ccw(points, tri)
        })
        .collect();

    check_triangle_count(n, triangles)
}

/// 0-1 BFS relaxation: same-depth neighbours go to the front of the queue
fn relax(
    queue: &mut VecDeque<(FixedFaceHandle<InnerTag>, u32)>,
    depth: &mut [u32],
    face: FixedFaceHandle<InnerTag>,
    d: u32,
    step: u32,
) {
    if d < depth[face.index()] {
        depth[face.index()] = d;
        if step == 0 {
            queue.push_front((face, d));
        } else {
            queue.push_back((face, d));
        }
    }
}

/// Faces enclosed by an odd number of constraint loops
///
/// Flood fill from the outer face: crossing an unconstrained edge keeps the
/// depth, crossing a constraint edge adds one. Even depth is outside the
/// polygon or inside a hole.
fn interior_faces(cdt: &Cdt) -> Vec<FixedFaceHandle<InnerTag>> {
    let mut depth = vec![u32::MAX; cdt.num_all_faces()];
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

    for face in cdt.inner_faces() {
        for edge in face.adjacent_edges() {
            if edge.rev().face().is_outer() {
                let step = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
                relax(&mut queue, &mut depth, face.fix(), step, step);
            }
        }
    }

    while let Some((fixed, d)) = queue.pop_front() {
        if d > depth[fixed.index()] {
            continue;
        }
        for edge in cdt.face(fixed).adjacent_edges() {
            if let Some(neighbor) = edge.rev().face().as_inner() {
                let step = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
                relax(&mut queue, &mut depth, neighbor.fix(), d + step, step);
            }
        }
    }

    cdt.inner_faces()
        .map(|face| face.fix())
        .filter(|face| depth[face.index()] % 2 == 1)
        .collect()
}

/// Triangulate a simple polygon (no holes) with earcutr
pub fn triangulate_polygon_earcut(points: &[Point2<f64>]) -> Result<Vec<TriangleIndex>> {
    let n = points.len();

    if n < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    // Flatten points for earcutr
    let mut vertices = Vec::with_capacity(n * 2);
    for p in points {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    let indices = earcutr::earcut(&vertices, &[], 2)
        .map_err(|e| Error::TriangulationError(format!("{:?}", e)))?;

    let triangles = indices
        .chunks_exact(3)
        .map(|c| orient_ccw(points, TriangleIndex::new(c[0] as u32, c[1] as u32, c[2] as u32)))
        .collect();

    check_triangle_count(n, triangles)
}

/// Fill an element's triangle list from its (normalized) boundary
pub fn triangulate_element(
    mut element: Element2D,
    backend: TriangulationBackend,
) -> Result<Element2D> {
    element.triangles = backend.triangulate(&element.polygon)?;
    Ok(element)
}

/// Sum of the areas of the given triangles
pub fn triangles_area(points: &[Point2<f64>], triangles: &[TriangleIndex]) -> f64 {
    triangles
        .iter()
        .map(|t| {
            let [a, b, c] = t.0;
            doubled_signed_area(&points[a as usize], &points[b as usize], &points[c as usize])
                .abs()
                * 0.5
        })
        .sum()
}
