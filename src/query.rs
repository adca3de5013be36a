//! The four query algorithms, expressed against the [`SpatialIndex`]
//! capability surface.
//!
//! Executors compute points and metrics only; overlay descriptors for a
//! renderer are built separately in [`crate::overlay`], so everything here is
//! testable headlessly.

use geo::{Intersects, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{GeodexError, Result};
use crate::index::SpatialIndex;
use crate::timer::QueryTimer;
use crate::types::{BoundingBox, GeoPoint};

/// Performance sample for one query execution. Produced fresh per query,
/// never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryMetrics {
    pub elapsed_millis: f64,
    pub nodes_visited: usize,
    pub result_count: usize,
}

/// Matching points plus the metrics of the execution that found them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub points: Vec<GeoPoint>,
    pub metrics: QueryMetrics,
}

fn finish(timer: &mut QueryTimer, nodes_visited: usize, points: Vec<GeoPoint>) -> Result<QueryResult> {
    timer.stop()?;
    let metrics = QueryMetrics {
        elapsed_millis: timer.elapsed_millis()?,
        nodes_visited,
        result_count: points.len(),
    };
    Ok(QueryResult { points, metrics })
}

/// Circular range query.
///
/// Candidates come from the backend's window query over the bounding square
/// of side `2 * radius` around the center, then an exact planar distance
/// filter keeps those within the radius (boundary inclusive). The radius is
/// in degrees; the caller converts from meters.
pub fn range_query(
    index: &dyn SpatialIndex,
    center: &Point,
    radius_degrees: f64,
) -> Result<QueryResult> {
    if !radius_degrees.is_finite() || radius_degrees < 0.0 {
        return Err(GeodexError::InvalidInput(format!(
            "range radius must be non-negative and finite, got {radius_degrees}"
        )));
    }
    let mut timer = QueryTimer::new();
    timer.start()?;

    let square = BoundingBox::around(center, radius_degrees, radius_degrees)?;
    let points: Vec<GeoPoint> = index
        .window_query(&square)
        .into_iter()
        .filter(|p| p.distance_to(center) <= radius_degrees)
        .collect();

    finish(&mut timer, index.nodes_visited(), points)
}

/// k-nearest-neighbor query.
///
/// Expanding-window search: the window doubles until it holds at least k
/// candidates or covers the whole structure, then one final pass at the
/// kth-candidate distance guarantees no closer point outside the window was
/// missed. Distance ties keep the backend's first-seen enumeration order,
/// which is deterministic for a fixed structure. The reported node count
/// sums every expansion pass, so the metric reflects the full traversal
/// effort rather than the last window alone.
pub fn knn_query(index: &dyn SpatialIndex, center: &Point, k: usize) -> Result<QueryResult> {
    if k == 0 {
        return Err(GeodexError::InvalidInput("k must be at least 1".to_string()));
    }
    let mut timer = QueryTimer::new();
    timer.start()?;

    let target = k.min(index.len());
    if target == 0 {
        return finish(&mut timer, 0, Vec::new());
    }

    let mut visited = 0;
    let mut half_width = KNN_SEED_HALF_WIDTH_DEGREES;
    let mut candidates = index.window_query(&BoundingBox::around(center, half_width, half_width)?);
    visited += index.nodes_visited();
    while candidates.len() < target && half_width < KNN_MAX_HALF_WIDTH_DEGREES {
        half_width *= 2.0;
        candidates = index.window_query(&BoundingBox::around(center, half_width, half_width)?);
        visited += index.nodes_visited();
    }

    let mut best = rank(candidates, center, target);

    // The square window can miss a point closer than the current kth
    // neighbor but outside the box corners; widen to the kth distance once.
    let kth_distance = best
        .last()
        .map(|(d, _)| *d)
        .unwrap_or(KNN_SEED_HALF_WIDTH_DEGREES);
    if kth_distance > half_width || best.len() < target {
        let reach = kth_distance.max(half_width);
        let candidates = index.window_query(&BoundingBox::around(center, reach, reach)?);
        visited += index.nodes_visited();
        best = rank(candidates, center, target);
    }

    let points: Vec<GeoPoint> = best.into_iter().map(|(_, p)| p).collect();
    finish(&mut timer, visited, points)
}

const KNN_SEED_HALF_WIDTH_DEGREES: f64 = 0.01;
const KNN_MAX_HALF_WIDTH_DEGREES: f64 = 360.0;

/// Keep the k nearest candidates, ascending distance, stable on ties.
fn rank(candidates: Vec<GeoPoint>, center: &Point, k: usize) -> SmallVec<[(f64, GeoPoint); 8]> {
    let mut ranked: SmallVec<[(f64, GeoPoint); 8]> = candidates
        .into_iter()
        .map(|p| (p.distance_to(center), p))
        .collect();
    ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(k);
    ranked
}

/// Polygon intersection query.
///
/// Candidates come from the backend via the polygon's bounding box, then the
/// exact point-in-polygon decision uses `geo`'s intersection test, which is
/// boundary inclusive: a point exactly on an edge counts as contained,
/// independent of which backend produced the candidate.
pub fn polygon_query(index: &dyn SpatialIndex, vertices: &[Point]) -> Result<QueryResult> {
    if vertices.len() < 3 {
        return Err(GeodexError::InvalidPolygon {
            vertices: vertices.len(),
        });
    }
    let mut timer = QueryTimer::new();
    timer.start()?;

    let mut min_lat = f64::INFINITY;
    let mut max_lat = f64::NEG_INFINITY;
    let mut min_lng = f64::INFINITY;
    let mut max_lng = f64::NEG_INFINITY;
    for v in vertices {
        min_lat = min_lat.min(v.y());
        max_lat = max_lat.max(v.y());
        min_lng = min_lng.min(v.x());
        max_lng = max_lng.max(v.x());
    }
    let bbox = BoundingBox::new(min_lat, max_lat, min_lng, max_lng)?;

    let ring: LineString = vertices.iter().map(|p| (p.x(), p.y())).collect();
    let polygon = Polygon::new(ring, vec![]);

    let points: Vec<GeoPoint> = index
        .window_query(&bbox)
        .into_iter()
        .filter(|p| polygon.intersects(&p.position()))
        .collect();

    finish(&mut timer, index.nodes_visited(), points)
}

/// Axis-aligned window query: the backends' native operation, no extra
/// filtering layer.
pub fn window_query(index: &dyn SpatialIndex, bounds: &BoundingBox) -> Result<QueryResult> {
    let mut timer = QueryTimer::new();
    timer.start()?;
    let points = index.window_query(bounds);
    finish(&mut timer, index.nodes_visited(), points)
}
