// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polystack Processing
//!
//! Drives the geometry crate over a whole layout: loads per-layer polygon
//! lists, runs every layer through normalize, triangulate, extrude and
//! assemble, and writes one PLY file per layer (or one combined file).
//!
//! Failures are isolated: a bad polygon drops only itself, a failed write
//! affects only its file. Only input acquisition aborts a run.

pub mod config;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod report;
pub mod stages;

pub use config::{OutputMode, PipelineConfig};
pub use error::{InputError, ProcessingError};
pub use input::{JsonLayoutFile, LayoutData, LayoutSource};
pub use pipeline::{process_layer, LayerOutcome, Pipeline};
pub use report::{DroppedPolygon, RunReport, Stage, WriteFailure};
pub use stages::{build_elements, extrude_layers, normalize_layers, triangulate_layers};
