// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry processing
#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed polygon: {0}")]
    MalformedPolygon(String),

    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("Invalid extrusion parameters: {0}")]
    InvalidExtrusion(String),

    #[error("Failed to write mesh to {path}: {source}")]
    MeshWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse mesh: {0}")]
    MeshParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

