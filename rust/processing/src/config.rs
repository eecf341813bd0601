// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline configuration loaded from environment variables.

use polystack_geometry::{ExtrusionRange, LayerId, TriangulationBackend};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Where assembled meshes are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// One `Layer<id>.ply` per layer.
    #[default]
    PerLayer,
    /// All layers merged into a single file.
    Combined,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-layer" | "layer" | "layers" => Ok(OutputMode::PerLayer),
            "combined" | "single" => Ok(OutputMode::Combined),
            other => Err(format!("unknown output mode '{}'", other)),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::PerLayer => write!(f, "per-layer"),
            OutputMode::Combined => write!(f, "combined"),
        }
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Lower extrusion plane.
    pub z_min: f64,
    /// Upper extrusion plane.
    pub z_max: f64,
    /// Directory receiving the PLY files.
    pub output_dir: PathBuf,
    pub output_mode: OutputMode,
    /// File name used in combined mode.
    pub combined_file: String,
    pub triangulator: TriangulationBackend,
    /// Worker threads for layer processing (1 = sequential, 0 = all cores).
    pub worker_threads: usize,
    /// Grid size for optional vertex welding; `None` keeps every vertex.
    pub weld_tolerance: Option<f64>,
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup, falling back to defaults
    /// for missing or unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            z_min: lookup("POLYSTACK_Z_MIN")
                .unwrap_or_else(|| "0".into())
                .parse()
                .unwrap_or(0.0),
            z_max: lookup("POLYSTACK_Z_MAX")
                .unwrap_or_else(|| "100".into())
                .parse()
                .unwrap_or(100.0),
            output_dir: lookup("POLYSTACK_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            output_mode: lookup("POLYSTACK_OUTPUT_MODE")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            combined_file: lookup("POLYSTACK_COMBINED_FILE")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "AllLayers.ply".into()),
            triangulator: lookup("POLYSTACK_TRIANGULATOR")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            worker_threads: lookup("POLYSTACK_WORKER_THREADS")
                .unwrap_or_else(|| "1".into())
                .parse()
                .unwrap_or(1),
            weld_tolerance: lookup("POLYSTACK_WELD_TOLERANCE")
                .and_then(|s| s.parse().ok())
                .filter(|t: &f64| *t > 0.0),
        }
    }

    /// Validated extrusion range.
    pub fn extrusion_range(&self) -> polystack_geometry::Result<ExtrusionRange> {
        ExtrusionRange::new(self.z_min, self.z_max)
    }

    /// Effective worker count, resolving 0 to the number of cores.
    pub fn resolved_worker_threads(&self) -> usize {
        if self.worker_threads == 0 {
            num_cpus::get()
        } else {
            self.worker_threads
        }
    }

    /// Output path for one layer in per-layer mode.
    pub fn layer_path(&self, layer: LayerId) -> PathBuf {
        self.output_dir.join(format!("Layer{}.ply", layer))
    }

    /// Output path in combined mode.
    pub fn combined_path(&self) -> PathBuf {
        self.output_dir.join(&self.combined_file)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
