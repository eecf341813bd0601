// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - lifting triangulated 2D elements into closed solids

use crate::element::{Element2D, Element3D, ExtrudedElement, TriangleIndex};
use crate::error::{Error, Result};
use nalgebra::{Point2, Point3};

/// Depth interval a layer is extruded over
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrusionRange {
    pub z_min: f64,
    pub z_max: f64,
}

impl ExtrusionRange {
    pub fn new(z_min: f64, z_max: f64) -> Result<Self> {
        if !z_min.is_finite() || !z_max.is_finite() {
            return Err(Error::InvalidExtrusion(format!(
                "non-finite depth range [{}, {}]",
                z_min, z_max
            )));
        }
        if z_min >= z_max {
            return Err(Error::InvalidExtrusion(format!(
                "z_min ({}) must be below z_max ({})",
                z_min, z_max
            )));
        }
        Ok(Self { z_min, z_max })
    }

    #[inline]
    pub fn depth(&self) -> f64 {
        self.z_max - self.z_min
    }
}

impl Default for ExtrusionRange {
    fn default() -> Self {
        Self {
            z_min: 0.0,
            z_max: 100.0,
        }
    }
}

/// Extrude a normalized, triangulated element into a bottom cap, a top cap
/// and the side walls joining them
///
/// Both caps share the source element's triangle topology. The bottom
/// cap's triangles are flipped so that, together with the
/// counter-clockwise boundary, every face of the solid winds outward.
pub fn extrude_element(element: &Element2D, range: ExtrusionRange) -> Result<ExtrudedElement> {
    if !element.is_triangulated() {
        return Err(Error::InvalidExtrusion(format!(
            "element {} has not been triangulated",
            element.source_index
        )));
    }

    let bottom = create_cap(&element.polygon, &element.triangles, range.z_min, true);
    let top = create_cap(&element.polygon, &element.triangles, range.z_max, false);
    let side_walls = create_side_walls(element.polygon.len());

    Ok(ExtrudedElement {
        bottom,
        top,
        side_walls,
        source_index: element.source_index,
    })
}

/// Lift the boundary to height `z`
#[inline]
fn insert_z(polygon: &[Point2<f64>], z: f64) -> Vec<Point3<f64>> {
    polygon.iter().map(|p| Point3::new(p.x, p.y, z)).collect()
}

/// Create a cap (top or bottom) from the source triangulation
#[inline]
fn create_cap(
    polygon: &[Point2<f64>],
    triangles: &[TriangleIndex],
    z: f64,
    flip: bool,
) -> Element3D {
    let triangles = if flip {
        triangles.iter().map(|t| t.flipped()).collect()
    } else {
        triangles.to_vec()
    };

    Element3D {
        vertices: insert_z(polygon, z),
        triangles,
    }
}

/// Side-wall quads for a boundary of `n` vertices
///
/// Indices address the concatenated run: `0..n` bottom, `n..2n` top. Each
/// quad {b[i], b[i+1], t[i+1], t[i]} is split along b[i]-t[i+1].
#[inline]
fn create_side_walls(n: usize) -> Vec<TriangleIndex> {
    let n = n as u32;
    let mut walls = Vec::with_capacity(n as usize * 2);

    for i in 0..n {
        let next = (i + 1) % n;
        let bottom0 = i;
        let bottom1 = next;
        let top0 = n + i;
        let top1 = n + next;

        walls.push(TriangleIndex::new(bottom0, bottom1, top1));
        walls.push(TriangleIndex::new(top1, top0, bottom0));
    }

    walls
}
