// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline driver.
//!
//! Layers are independent: each runs build, normalize, triangulate,
//! extrude and assemble on its own, optionally on a rayon pool. Outcomes
//! are collected in ascending layer order before anything is written, so
//! file contents never depend on scheduling.

use crate::config::{OutputMode, PipelineConfig};
use crate::error::ProcessingError;
use crate::input::{LayoutData, LayoutSource};
use crate::report::{DroppedPolygon, RunReport, Stage, WriteFailure};
use crate::stages::{
    build_elements, build_layer, drop_polygon, extrude_layer, normalize_layer, normalize_layers,
    triangulate_layer, triangulate_layers,
};
use polystack_geometry::{assemble, write_ply_file, Element2D, LayerId, LayerMap, Mesh};
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;

/// Result of running every stage on one layer.
#[derive(Debug, Clone)]
pub struct LayerOutcome {
    pub layer: LayerId,
    pub mesh: Mesh,
    pub dropped: Vec<DroppedPolygon>,
}

/// Run the full per-layer chain: build, normalize, triangulate, extrude,
/// assemble (and weld when configured).
pub fn process_layer(layer: LayerId, polygons: &[Vec<f64>], config: &PipelineConfig) -> LayerOutcome {
    let mut dropped = Vec::new();

    let elements = build_layer(layer, polygons, &mut dropped);
    let elements = normalize_layer(layer, elements, &mut dropped);
    let elements = triangulate_layer(layer, elements, config.triangulator, &mut dropped);

    let solids = match config.extrusion_range() {
        Ok(range) => extrude_layer(layer, &elements, range, &mut dropped),
        Err(e) => {
            let reason = e.to_string();
            for element in &elements {
                drop_polygon(
                    &mut dropped,
                    layer,
                    element.source_index,
                    Stage::Extrude,
                    polystack_geometry::Error::InvalidExtrusion(reason.clone()),
                );
            }
            Vec::new()
        }
    };

    let mut mesh = assemble(&solids);
    if let Some(tolerance) = config.weld_tolerance {
        let removed = mesh.weld_vertices(tolerance);
        tracing::debug!(layer, removed, tolerance, "Welded coincident vertices");
    }

    tracing::debug!(
        layer,
        polygons = polygons.len(),
        solids = solids.len(),
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "Layer processed"
    );

    LayerOutcome {
        layer,
        mesh,
        dropped,
    }
}

/// Layer-by-layer polygon to solid pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline, rejecting an unusable extrusion range up front.
    pub fn new(config: PipelineConfig) -> Result<Self, ProcessingError> {
        config.extrusion_range()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process every layer, returning outcomes in ascending layer order.
    pub fn process(&self, data: LayoutData) -> Result<Vec<LayerOutcome>, ProcessingError> {
        let layers: Vec<(LayerId, Vec<Vec<f64>>)> = data.layers.into_iter().collect();
        let workers = self.config.resolved_worker_threads();

        if workers <= 1 || layers.len() <= 1 {
            return Ok(layers
                .iter()
                .map(|(layer, polygons)| process_layer(*layer, polygons, &self.config))
                .collect());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()?;
        tracing::debug!(workers, layers = layers.len(), "Processing layers in parallel");

        let config = &self.config;
        Ok(pool.install(|| {
            layers
                .par_iter()
                .map(|(layer, polygons)| process_layer(*layer, polygons, config))
                .collect()
        }))
    }

    /// Build, normalize and triangulate every layer without extruding.
    /// Used for the layer-map dump.
    pub fn triangulated_layers(
        &self,
        data: LayoutData,
    ) -> (LayerMap<Element2D>, Vec<DroppedPolygon>) {
        let (map, mut dropped) = build_elements(data);
        let (map, more) = normalize_layers(map);
        dropped.extend(more);
        let (map, more) = triangulate_layers(map, self.config.triangulator);
        dropped.extend(more);
        (map, dropped)
    }

    /// Load the layout, process every layer and write the meshes.
    ///
    /// Only input acquisition is fatal. Dropped polygons and failed writes
    /// are collected in the returned report.
    pub fn run(&self, source: &dyn LayoutSource) -> Result<RunReport, ProcessingError> {
        let start = Instant::now();
        let data = source.load()?;

        tracing::info!(
            source = %source.describe(),
            layers = data.layer_count(),
            polygons = data.polygon_count(),
            z_min = self.config.z_min,
            z_max = self.config.z_max,
            triangulator = %self.config.triangulator,
            "Loaded layout"
        );

        let outcomes = self.process(data)?;
        let mut report = RunReport {
            layers_processed: outcomes.len(),
            ..RunReport::default()
        };

        if let Err(e) = std::fs::create_dir_all(&self.config.output_dir) {
            tracing::warn!(
                dir = %self.config.output_dir.display(),
                error = %e,
                "Cannot create output directory"
            );
        }

        match self.config.output_mode {
            OutputMode::PerLayer => self.write_per_layer(outcomes, &mut report),
            OutputMode::Combined => self.write_combined(outcomes, &mut report),
        }

        tracing::info!(
            written = report.written.len(),
            dropped = report.dropped.len(),
            write_failures = report.write_failures.len(),
            skipped_layers = report.skipped_layers.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Run complete"
        );

        Ok(report)
    }

    fn write_per_layer(&self, outcomes: Vec<LayerOutcome>, report: &mut RunReport) {
        for outcome in outcomes {
            report.dropped.extend(outcome.dropped);
            if outcome.mesh.is_empty() {
                tracing::warn!(layer = outcome.layer, "Layer has no surviving polygons, skipping");
                report.skipped_layers.push(outcome.layer);
                continue;
            }
            let path = self.config.layer_path(outcome.layer);
            write_mesh(&outcome.mesh, &path, Some(outcome.layer), report);
        }
    }

    fn write_combined(&self, outcomes: Vec<LayerOutcome>, report: &mut RunReport) {
        let mut combined = Mesh::new();
        for outcome in outcomes {
            report.dropped.extend(outcome.dropped);
            if outcome.mesh.is_empty() {
                tracing::warn!(layer = outcome.layer, "Layer has no surviving polygons, skipping");
                report.skipped_layers.push(outcome.layer);
                continue;
            }
            combined.merge(&outcome.mesh);
        }

        if combined.is_empty() {
            tracing::warn!("No layer produced geometry, nothing to write");
            return;
        }
        let path = self.config.combined_path();
        write_mesh(&combined, &path, None, report);
    }
}

fn write_mesh(mesh: &Mesh, path: &Path, layer: Option<LayerId>, report: &mut RunReport) {
    match write_ply_file(mesh, path) {
        Ok(()) => {
            tracing::info!(
                path = %path.display(),
                vertices = mesh.vertex_count(),
                triangles = mesh.triangle_count(),
                "Wrote mesh"
            );
            report.written.push(path.to_path_buf());
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to write mesh");
            report.write_failures.push(WriteFailure {
                layer,
                path: path.to_path_buf(),
                error: e.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn square(x: f64, y: f64, size: f64) -> Vec<f64> {
        vec![x, y, x + size, y, x + size, y + size, x, y + size]
    }

    fn layout(layers: &[(LayerId, Vec<Vec<f64>>)]) -> LayoutData {
        LayoutData {
            layers: layers.iter().cloned().collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_process_layer_square() {
        let config = PipelineConfig {
            z_min: 0.0,
            z_max: 5.0,
            ..PipelineConfig::default()
        };
        let outcome = process_layer(6, &[square(0.0, 0.0, 10.0)], &config);

        assert!(outcome.dropped.is_empty());
        assert_eq!(outcome.mesh.vertex_count(), 8);
        assert_eq!(outcome.mesh.triangle_count(), 12);
        assert!(outcome.mesh.positions[..4].iter().all(|p| p.z == 0.0));
        assert!(outcome.mesh.positions[4..].iter().all(|p| p.z == 5.0));
    }

    #[test]
    fn test_process_layer_keeps_siblings_of_bad_polygon() {
        let polygons = vec![
            square(0.0, 0.0, 1.0),
            vec![0.0, 0.0, 4.0, 0.0],
            square(5.0, 5.0, 1.0),
        ];
        let outcome = process_layer(1, &polygons, &PipelineConfig::default());

        assert_eq!(outcome.dropped.len(), 1);
        assert_eq!(outcome.dropped[0].polygon_index, 1);
        assert_eq!(outcome.dropped[0].stage, Stage::Normalize);
        assert_eq!(outcome.mesh.vertex_count(), 16);
        assert_eq!(outcome.mesh.triangle_count(), 24);
    }

    #[test]
    fn test_process_layer_welds_when_configured() {
        // Two squares sharing an edge
        let polygons = vec![square(0.0, 0.0, 1.0), square(1.0, 0.0, 1.0)];
        let config = PipelineConfig {
            weld_tolerance: Some(1e-6),
            ..PipelineConfig::default()
        };
        let outcome = process_layer(1, &polygons, &config);
        assert_eq!(outcome.mesh.vertex_count(), 12);
        assert_eq!(outcome.mesh.triangle_count(), 24);
    }

    #[test]
    fn test_invalid_range_rejected_by_pipeline() {
        let config = PipelineConfig {
            z_min: 3.0,
            z_max: 3.0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            Pipeline::new(config),
            Err(ProcessingError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_range_drops_at_extrude() {
        let config = PipelineConfig {
            z_min: 1.0,
            z_max: 0.0,
            ..PipelineConfig::default()
        };
        let outcome = process_layer(2, &[square(0.0, 0.0, 1.0)], &config);
        assert!(outcome.mesh.is_empty());
        assert_eq!(outcome.dropped[0].stage, Stage::Extrude);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let data = layout(&[
            (1, vec![square(0.0, 0.0, 1.0)]),
            (2, vec![square(0.0, 0.0, 2.0), square(3.0, 0.0, 1.0)]),
            (3, vec![vec![0.0, 0.0, 1.0]]),
            (4, vec![square(-1.0, -1.0, 0.5)]),
        ]);

        let sequential = Pipeline::new(PipelineConfig::default())
            .unwrap()
            .process(data.clone())
            .unwrap();
        let parallel = Pipeline::new(PipelineConfig {
            worker_threads: 3,
            ..PipelineConfig::default()
        })
        .unwrap()
        .process(data)
        .unwrap();

        assert_eq!(sequential.len(), parallel.len());
        for (a, b) in sequential.iter().zip(&parallel) {
            assert_eq!(a.layer, b.layer);
            assert_eq!(a.mesh, b.mesh);
            assert_eq!(a.dropped, b.dropped);
        }
    }

    #[test]
    fn test_triangulated_layers_dump() {
        let data = layout(&[(6, vec![vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0]])]);
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let (map, dropped) = pipeline.triangulated_layers(data);

        assert!(dropped.is_empty());
        assert_eq!(
            map.to_string(),
            "layers = {\n  6 : [\n    ([[0, 0], [1, 0], [0, 1]], [[0, 1, 2]], false)\n  ]\n}"
        );
    }
}
