// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use polystack_geometry::triangulation::triangles_area;
use polystack_geometry::{
    assemble, extrude_element, normalize_element, polygon_area, read_ply, triangulate_element,
    write_ply, EdgeReport, Element2D, ExtrusionRange, Point2, TriangleIndex,
    TriangulationBackend,
};
use std::f64::consts::PI;
use std::io::Cursor;

fn regular_polygon(n: usize, radius: f64) -> Vec<Point2<f64>> {
    (0..n)
        .map(|i| {
            let a = 2.0 * PI * i as f64 / n as f64;
            Point2::new(radius * a.cos(), radius * a.sin())
        })
        .collect()
}

/// Star with alternating outer/inner radii (concave, simple)
fn star(points: usize, outer: f64, inner: f64) -> Vec<Point2<f64>> {
    (0..points * 2)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let a = PI * i as f64 / points as f64;
            Point2::new(r * a.cos(), r * a.sin())
        })
        .collect()
}

/// Staircase outline, strongly concave
fn staircase(steps: usize) -> Vec<Point2<f64>> {
    let mut pts = vec![Point2::new(0.0, 0.0), Point2::new(steps as f64, 0.0)];
    for s in (0..steps).rev() {
        pts.push(Point2::new((s + 1) as f64, (steps - s) as f64));
        pts.push(Point2::new(s as f64, (steps - s) as f64));
    }
    pts
}

fn samples() -> Vec<Vec<Point2<f64>>> {
    let mut clockwise_star = star(7, 10.0, 4.0);
    clockwise_star.reverse();
    vec![
        regular_polygon(3, 1.0),
        regular_polygon(12, 5.0),
        regular_polygon(64, 1000.0),
        star(5, 10.0, 3.0),
        clockwise_star,
        staircase(6),
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(6.0, 0.0),
            Point2::new(6.0, 2.0),
            Point2::new(2.0, 2.0),
            Point2::new(2.0, 6.0),
            Point2::new(0.0, 6.0),
        ],
    ]
}

#[test]
fn triangulation_covers_polygon_exactly() {
    for backend in [
        TriangulationBackend::ConstrainedDelaunay,
        TriangulationBackend::EarClipping,
    ] {
        for polygon in samples() {
            let n = polygon.len();
            let element = normalize_element(Element2D::new(polygon, 0)).unwrap();
            let element = triangulate_element(element, backend).unwrap();

            assert_eq!(element.triangles.len(), n - 2, "{} on {} vertices", backend, n);
            assert!(element.triangles.iter().all(|t| (t.max_index() as usize) < n));
            assert_relative_eq!(
                triangles_area(&element.polygon, &element.triangles),
                polygon_area(&element.polygon),
                max_relative = 1e-9
            );
        }
    }
}

#[test]
fn every_extruded_sample_is_a_closed_oriented_solid() {
    let range = ExtrusionRange::new(0.0, 5.0).unwrap();
    for polygon in samples() {
        let n = polygon.len();
        let element = normalize_element(Element2D::new(polygon, 0)).unwrap();
        let element = triangulate_element(element, TriangulationBackend::default()).unwrap();
        let solid = extrude_element(&element, range).unwrap();

        let report = EdgeReport::from_faces(&solid.local_faces());
        assert!(report.boundary_edges().is_empty());
        assert!(report.non_manifold_edges().is_empty());
        assert!(report.is_consistently_oriented());

        // Side-wall edges and rungs are each shared by exactly two triangles
        let n32 = n as u32;
        for i in 0..n32 {
            let next = (i + 1) % n32;
            assert_eq!(report.usage(i, next), 2);
            assert_eq!(report.usage(n32 + i, n32 + next), 2);
            assert_eq!(report.usage(i, n32 + i), 2);
        }
    }
}

#[test]
fn square_concrete_case() {
    let square = vec![
        Point2::new(0.0, 0.0),
        Point2::new(10.0, 0.0),
        Point2::new(10.0, 10.0),
        Point2::new(0.0, 10.0),
    ];

    let element = normalize_element(Element2D::new(square.clone(), 0)).unwrap();
    assert!(!element.reversed);
    assert_eq!(element.polygon, square);

    let element = triangulate_element(element, TriangulationBackend::default()).unwrap();
    assert_eq!(element.triangles.len(), 2);

    let solid = extrude_element(&element, ExtrusionRange::new(0.0, 5.0).unwrap()).unwrap();
    let mesh = assemble([&solid]);
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.triangle_count(), 12);
}

#[test]
fn assembled_layer_round_trips_through_ply() {
    let range = ExtrusionRange::new(-2.5, 7.125).unwrap();
    let solids: Vec<_> = samples()
        .into_iter()
        .enumerate()
        .map(|(i, polygon)| {
            let element = normalize_element(Element2D::new(polygon, i)).unwrap();
            let element = triangulate_element(element, TriangulationBackend::default()).unwrap();
            extrude_element(&element, range).unwrap()
        })
        .collect();
    let mesh = assemble(&solids);

    let mut buf = Vec::new();
    write_ply(&mesh, &mut buf).unwrap();
    let parsed = read_ply(Cursor::new(buf)).unwrap();

    assert_eq!(parsed.vertex_count(), mesh.vertex_count());
    assert_eq!(parsed.triangle_count(), mesh.triangle_count());
    assert_eq!(parsed.positions, mesh.positions);
    assert_eq!(parsed.faces, mesh.faces);
}

#[test]
fn degenerate_sibling_does_not_reach_the_mesh() {
    let polygons = vec![
        vec![Point2::new(0.0, 0.0), Point2::new(4.0, 0.0)],
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
        ],
        regular_polygon(6, 2.0),
    ];

    let solids: Vec<_> = polygons
        .into_iter()
        .enumerate()
        .filter_map(|(i, p)| normalize_element(Element2D::new(p, i)).ok())
        .map(|e| triangulate_element(e, TriangulationBackend::default()).unwrap())
        .map(|e| extrude_element(&e, ExtrusionRange::default()).unwrap())
        .collect();

    assert_eq!(solids.len(), 1);
    assert_eq!(solids[0].source_index, 2);

    let mesh = assemble(&solids);
    assert_eq!(mesh.vertex_count(), 12);
    assert_eq!(mesh.triangle_count(), 4 + 4 + 12);
    assert!(mesh
        .faces
        .iter()
        .all(|f: &TriangleIndex| (f.max_index() as usize) < mesh.vertex_count()));
}
