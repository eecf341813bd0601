// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Run outcome records.

use polystack_geometry::LayerId;
use std::fmt;
use std::path::PathBuf;

/// Pipeline stage a polygon was dropped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Build,
    Normalize,
    Triangulate,
    Extrude,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Build => "build",
            Stage::Normalize => "normalize",
            Stage::Triangulate => "triangulate",
            Stage::Extrude => "extrude",
        };
        f.write_str(name)
    }
}

/// A single polygon that was excluded from its layer's mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedPolygon {
    pub layer: LayerId,
    /// Index in the layer's input list.
    pub polygon_index: usize,
    pub stage: Stage,
    pub error: String,
}

impl fmt::Display for DroppedPolygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "layer {} polygon {} dropped at {}: {}",
            self.layer, self.polygon_index, self.stage, self.error
        )
    }
}

/// A mesh file that could not be written. `layer` is `None` for the
/// combined file.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteFailure {
    pub layer: Option<LayerId>,
    pub path: PathBuf,
    pub error: String,
}

/// Summary of a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Files written successfully, in layer order.
    pub written: Vec<PathBuf>,
    pub dropped: Vec<DroppedPolygon>,
    pub write_failures: Vec<WriteFailure>,
    /// Layers with no surviving polygon, not written.
    pub skipped_layers: Vec<LayerId>,
    pub layers_processed: usize,
}

impl RunReport {
    /// True when every polygon survived and every file was written.
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty() && self.write_failures.is_empty()
    }

    /// Dropped polygons of one layer.
    pub fn dropped_in(&self, layer: LayerId) -> impl Iterator<Item = &DroppedPolygon> + '_ {
        self.dropped.iter().filter(move |d| d.layer == layer)
    }
}
