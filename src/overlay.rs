//! Renderer-facing overlay descriptors.
//!
//! Query executors stay purely geometric; the functions here derive the
//! drawable shapes (query shape, matched markers, connectors) from a request
//! and its result. How an external renderer draws them is its own business.

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::query::QueryResult;
use crate::types::{BoundingBox, GeoPoint};

/// Role tag a renderer can key styling on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayRole {
    QueryShape,
    Matched,
    Unmatched,
    Connector,
}

/// A drawable shape produced alongside a query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Overlay {
    Circle {
        lat: f64,
        lng: f64,
        radius_degrees: f64,
        role: OverlayRole,
    },
    Polygon {
        vertices: Vec<(f64, f64)>,
        role: OverlayRole,
    },
    Rect {
        bounds: BoundingBox,
        role: OverlayRole,
    },
    Marker {
        point: GeoPoint,
        role: OverlayRole,
    },
    Connector {
        from: (f64, f64),
        to: (f64, f64),
        role: OverlayRole,
    },
}

fn matched_markers(result: &QueryResult) -> impl Iterator<Item = Overlay> + '_ {
    result.points.iter().map(|p| Overlay::Marker {
        point: p.clone(),
        role: OverlayRole::Matched,
    })
}

/// Search circle, one matched marker per result, and an unmatched marker
/// for every dataset point the circle missed.
pub fn for_range(
    center: &Point,
    radius_degrees: f64,
    result: &QueryResult,
    dataset: &[GeoPoint],
) -> Vec<Overlay> {
    let mut overlays = vec![Overlay::Circle {
        lat: center.y(),
        lng: center.x(),
        radius_degrees,
        role: OverlayRole::QueryShape,
    }];
    overlays.extend(matched_markers(result));

    // Multiset match: each result point accounts for one dataset point, so
    // duplicate copies beyond the matched ones still get dimmed.
    let mut consumed = vec![false; result.points.len()];
    for point in dataset {
        let hit = (0..result.points.len()).find(|&i| !consumed[i] && result.points[i] == *point);
        match hit {
            Some(i) => consumed[i] = true,
            None => overlays.push(Overlay::Marker {
                point: point.clone(),
                role: OverlayRole::Unmatched,
            }),
        }
    }
    overlays
}

/// Matched markers plus a connector from the center to each neighbor.
pub fn for_knn(center: &Point, result: &QueryResult) -> Vec<Overlay> {
    let mut overlays: Vec<Overlay> = matched_markers(result).collect();
    overlays.extend(result.points.iter().map(|p| Overlay::Connector {
        from: (center.y(), center.x()),
        to: (p.lat, p.lng),
        role: OverlayRole::Connector,
    }));
    overlays
}

/// Polygon outline plus matched markers.
pub fn for_polygon(vertices: &[Point], result: &QueryResult) -> Vec<Overlay> {
    let mut overlays = vec![Overlay::Polygon {
        vertices: vertices.iter().map(|v| (v.y(), v.x())).collect(),
        role: OverlayRole::QueryShape,
    }];
    overlays.extend(matched_markers(result));
    overlays
}

/// Query rectangle plus matched markers.
pub fn for_window(bounds: &BoundingBox, result: &QueryResult) -> Vec<Overlay> {
    let mut overlays = vec![Overlay::Rect {
        bounds: *bounds,
        role: OverlayRole::QueryShape,
    }];
    overlays.extend(matched_markers(result));
    overlays
}
