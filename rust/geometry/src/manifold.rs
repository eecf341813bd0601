// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Edge-usage checks for closed triangle meshes
//!
//! - Watertight: every undirected edge is used by exactly two triangles
//! - Consistently oriented: every directed edge appears once and its
//!   reverse appears once

use crate::element::TriangleIndex;
use rustc_hash::FxHashMap;

/// Edge usage counts for a face list
#[derive(Debug, Clone, Default)]
pub struct EdgeReport {
    /// Undirected edge (low, high) -> number of faces using it
    undirected: FxHashMap<(u32, u32), usize>,
    /// Directed edge (from, to) -> number of faces traversing it
    directed: FxHashMap<(u32, u32), usize>,
}

impl EdgeReport {
    pub fn from_faces(faces: &[TriangleIndex]) -> Self {
        let mut report = Self::default();
        for face in faces {
            for (a, b) in face.edges() {
                *report.directed.entry((a, b)).or_insert(0) += 1;
                *report.undirected.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        report
    }

    /// Number of distinct undirected edges
    pub fn edge_count(&self) -> usize {
        self.undirected.len()
    }

    /// How many faces use the undirected edge `a`-`b`
    pub fn usage(&self, a: u32, b: u32) -> usize {
        self.undirected
            .get(&(a.min(b), a.max(b)))
            .copied()
            .unwrap_or(0)
    }

    /// Edges used by a single face (holes in the surface)
    pub fn boundary_edges(&self) -> Vec<(u32, u32)> {
        self.edges_where(|count| count == 1)
    }

    /// Edges used by three or more faces
    pub fn non_manifold_edges(&self) -> Vec<(u32, u32)> {
        self.edges_where(|count| count > 2)
    }

    fn edges_where(&self, pred: impl Fn(usize) -> bool) -> Vec<(u32, u32)> {
        let mut edges: Vec<_> = self
            .undirected
            .iter()
            .filter(|(_, &count)| pred(count))
            .map(|(&edge, _)| edge)
            .collect();
        edges.sort_unstable();
        edges
    }

    pub fn is_watertight(&self) -> bool {
        !self.undirected.is_empty() && self.undirected.values().all(|&count| count == 2)
    }

    pub fn is_consistently_oriented(&self) -> bool {
        self.is_watertight()
            && self.directed.iter().all(|(&(a, b), &count)| {
                count == 1 && self.directed.get(&(b, a)).copied() == Some(1)
            })
    }
}
