// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for input acquisition and pipeline runs.

use std::path::PathBuf;
use thiserror::Error;

/// The layout source could not supply any layer data. Always fatal.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Cannot read layout file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid layout JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Layout contains no layers")]
    Empty,
}

/// Errors that abort a whole pipeline run.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Input acquisition failed: {0}")]
    Input(#[from] InputError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl From<polystack_geometry::Error> for ProcessingError {
    fn from(err: polystack_geometry::Error) -> Self {
        ProcessingError::Config(err.to_string())
    }
}
