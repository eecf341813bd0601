// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polystack Geometry
//!
//! Turns simple planar polygons into closed, watertight triangle solids:
//! winding normalization, constrained Delaunay triangulation (spade),
//! extrusion between two z-planes, offset-based mesh assembly and ASCII
//! PLY output. nalgebra provides the point types.

pub mod element;
pub mod error;
pub mod extrusion;
pub mod layer;
pub mod manifold;
pub mod mesh;
pub mod normalize;
pub mod ply;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3};

pub use element::{polygon_from_flat, Element2D, Element3D, ExtrudedElement, TriangleIndex};
pub use error::{Error, Result};
pub use extrusion::{extrude_element, ExtrusionRange};
pub use layer::{LayerId, LayerMap};
pub use manifold::EdgeReport;
pub use mesh::{assemble, Mesh};
pub use normalize::{is_clockwise, normalize_element, polygon_area, shoelace_sum};
pub use ply::{read_ply, write_ply, write_ply_file};
pub use triangulation::{
    triangulate_element, triangulate_polygon, triangulate_polygon_earcut, TriangulationBackend,
};
