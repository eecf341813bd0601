// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Winding-order normalization
//!
//! Uses the edge form of the shoelace formula,
//! `sum((x[i+1] - x[i]) * (y[i+1] + y[i]))`, which is positive for a
//! clockwise boundary. Every element leaving [`normalize_element`] is
//! counter-clockwise.

use crate::element::Element2D;
use crate::error::{Error, Result};
use nalgebra::Point2;

/// Relative tolerance below which the enclosed area counts as zero
const AREA_EPSILON: f64 = 1e-12;

/// Edge-form shoelace sum; positive means clockwise, equals `-2 * signed area`
#[inline]
pub fn shoelace_sum(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let v1 = &points[i];
            let v2 = &points[(i + 1) % n];
            (v2.x - v1.x) * (v2.y + v1.y)
        })
        .sum()
}

#[inline]
pub fn is_clockwise(points: &[Point2<f64>]) -> bool {
    shoelace_sum(points) > 0.0
}

/// Unsigned enclosed area
#[inline]
pub fn polygon_area(points: &[Point2<f64>]) -> f64 {
    shoelace_sum(points).abs() * 0.5
}

/// Larger side of the bounding box
fn extent(points: &[Point2<f64>]) -> f64 {
    let (min_x, max_x, min_y, max_y) = points.iter().fold(
        (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
        |(min_x, max_x, min_y, max_y), p| {
            (min_x.min(p.x), max_x.max(p.x), min_y.min(p.y), max_y.max(p.y))
        },
    );
    (max_x - min_x).max(max_y - min_y)
}

/// Reject degenerate input and bring the boundary into counter-clockwise order
pub fn normalize_element(mut element: Element2D) -> Result<Element2D> {
    let n = element.polygon.len();
    if n < 3 {
        return Err(Error::MalformedPolygon(format!(
            "polygon has {} vertices, need at least 3",
            n
        )));
    }

    let sum = shoelace_sum(&element.polygon);
    let size = extent(&element.polygon);
    if size <= 0.0 || sum.abs() <= AREA_EPSILON * size * size {
        return Err(Error::MalformedPolygon(
            "polygon encloses zero area".to_string(),
        ));
    }

    if sum > 0.0 {
        element.polygon.reverse();
        element.reversed = true;
    }

    Ok(element)
}
