// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline stages.
//!
//! Each stage consumes its input and returns a fresh collection. A polygon
//! that fails is logged, recorded as a [`DroppedPolygon`] and left out;
//! its siblings carry on. Per-layer functions are what the driver runs;
//! the [`LayerMap`] variants apply them to every layer.

use crate::input::LayoutData;
use crate::report::{DroppedPolygon, Stage};
use polystack_geometry::{
    extrude_element, normalize_element, triangulate_element, Element2D, ExtrudedElement,
    ExtrusionRange, LayerId, LayerMap, TriangulationBackend,
};

pub(crate) fn drop_polygon(
    dropped: &mut Vec<DroppedPolygon>,
    layer: LayerId,
    polygon_index: usize,
    stage: Stage,
    error: polystack_geometry::Error,
) {
    tracing::warn!(
        layer,
        polygon = polygon_index,
        stage = %stage,
        error = %error,
        "Dropping polygon"
    );
    dropped.push(DroppedPolygon {
        layer,
        polygon_index,
        stage,
        error: error.to_string(),
    });
}

/// Turn one layer's flat coordinate lists into elements.
pub fn build_layer(
    layer: LayerId,
    polygons: &[Vec<f64>],
    dropped: &mut Vec<DroppedPolygon>,
) -> Vec<Element2D> {
    polygons
        .iter()
        .enumerate()
        .filter_map(|(i, coords)| match Element2D::from_flat(coords, i) {
            Ok(element) => Some(element),
            Err(e) => {
                drop_polygon(dropped, layer, i, Stage::Build, e);
                None
            }
        })
        .collect()
}

pub fn normalize_layer(
    layer: LayerId,
    elements: Vec<Element2D>,
    dropped: &mut Vec<DroppedPolygon>,
) -> Vec<Element2D> {
    elements
        .into_iter()
        .filter_map(|element| {
            let index = element.source_index;
            match normalize_element(element) {
                Ok(element) => Some(element),
                Err(e) => {
                    drop_polygon(dropped, layer, index, Stage::Normalize, e);
                    None
                }
            }
        })
        .collect()
}

pub fn triangulate_layer(
    layer: LayerId,
    elements: Vec<Element2D>,
    backend: TriangulationBackend,
    dropped: &mut Vec<DroppedPolygon>,
) -> Vec<Element2D> {
    elements
        .into_iter()
        .filter_map(|element| {
            let index = element.source_index;
            match triangulate_element(element, backend) {
                Ok(element) => Some(element),
                Err(e) => {
                    drop_polygon(dropped, layer, index, Stage::Triangulate, e);
                    None
                }
            }
        })
        .collect()
}

pub fn extrude_layer(
    layer: LayerId,
    elements: &[Element2D],
    range: ExtrusionRange,
    dropped: &mut Vec<DroppedPolygon>,
) -> Vec<ExtrudedElement> {
    elements
        .iter()
        .filter_map(|element| match extrude_element(element, range) {
            Ok(solid) => Some(solid),
            Err(e) => {
                drop_polygon(dropped, layer, element.source_index, Stage::Extrude, e);
                None
            }
        })
        .collect()
}

pub fn build_elements(data: LayoutData) -> (LayerMap<Element2D>, Vec<DroppedPolygon>) {
    let mut dropped = Vec::new();
    let map = data
        .layers
        .into_iter()
        .map(|(layer, polygons)| (layer, build_layer(layer, &polygons, &mut dropped)))
        .collect();
    (map, dropped)
}

pub fn normalize_layers(map: LayerMap<Element2D>) -> (LayerMap<Element2D>, Vec<DroppedPolygon>) {
    let mut dropped = Vec::new();
    let map = map.map_layers(|layer, elements| normalize_layer(layer, elements, &mut dropped));
    (map, dropped)
}

pub fn triangulate_layers(
    map: LayerMap<Element2D>,
    backend: TriangulationBackend,
) -> (LayerMap<Element2D>, Vec<DroppedPolygon>) {
    let mut dropped = Vec::new();
    let map = map.map_layers(|layer, elements| {
        triangulate_layer(layer, elements, backend, &mut dropped)
    });
    (map, dropped)
}

pub fn extrude_layers(
    map: LayerMap<Element2D>,
    range: ExtrusionRange,
) -> (LayerMap<ExtrudedElement>, Vec<DroppedPolygon>) {
    let mut dropped = Vec::new();
    let map = map.map_layers(|layer, elements| extrude_layer(layer, &elements, range, &mut dropped));
    (map, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn layout() -> LayoutData {
        let mut layers = BTreeMap::new();
        layers.insert(
            1,
            vec![
                // clockwise square
                vec![0.0, 0.0, 0.0, 10.0, 10.0, 10.0, 10.0, 0.0],
                // odd coordinate count
                vec![0.0, 0.0, 1.0],
                // collinear
                vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0],
            ],
        );
        layers.insert(
            2,
            vec![
                // self-intersecting, non-zero area
                vec![0.0, 0.0, 4.0, 4.0, 4.0, 0.0, 0.0, 2.0],
                vec![0.0, 0.0, 4.0, 0.0, 0.0, 3.0],
            ],
        );
        LayoutData { layers }
    }

    #[test]
    fn test_stages_drop_failures_and_keep_siblings() {
        let (map, build_drops) = build_elements(layout());
        assert_eq!(map.element_count(), 4);
        assert_eq!(build_drops.len(), 1);
        assert_eq!(build_drops[0].stage, Stage::Build);
        assert_eq!((build_drops[0].layer, build_drops[0].polygon_index), (1, 1));

        let (map, norm_drops) = normalize_layers(map);
        assert_eq!(norm_drops.len(), 1);
        assert_eq!((norm_drops[0].layer, norm_drops[0].polygon_index), (1, 2));
        assert!(map.get(1).unwrap()[0].reversed);

        let (map, tri_drops) = triangulate_layers(map, TriangulationBackend::default());
        assert_eq!(tri_drops.len(), 1);
        assert_eq!(tri_drops[0].stage, Stage::Triangulate);
        assert_eq!((tri_drops[0].layer, tri_drops[0].polygon_index), (2, 0));

        let (solids, ext_drops) = extrude_layers(map, ExtrusionRange::default());
        assert!(ext_drops.is_empty());
        assert_eq!(solids.get(1).unwrap().len(), 1);
        assert_eq!(solids.get(2).unwrap()[0].source_index, 1);
    }

    #[test]
    fn test_extrude_rejects_untriangulated() {
        let element = Element2D::from_flat(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0], 3).unwrap();
        let mut dropped = Vec::new();
        let solids = extrude_layer(7, &[element], ExtrusionRange::default(), &mut dropped);
        assert!(solids.is_empty());
        assert_eq!(dropped[0].stage, Stage::Extrude);
        assert_eq!(dropped[0].polygon_index, 3);
    }
}
