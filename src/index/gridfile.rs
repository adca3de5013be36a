//! Grid-file directory: a fixed cell grid with point buckets.

use std::cell::Cell;

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::index::SpatialIndex;
use crate::types::{BoundingBox, GeoPoint, StructureKind};

/// Fixed `resolution x resolution` directory over the build extent. Each
/// occupied cell owns a bucket of points; a window query visits only the
/// cells its box overlaps. Points outside the extent clamp into the edge
/// cells, which keeps lookups correct because candidates are re-checked
/// against the exact box.
pub struct GridFile {
    bounds: BoundingBox,
    resolution: usize,
    bucket_capacity: usize,
    buckets: FxHashMap<(usize, usize), Vec<GeoPoint>>,
    len: usize,
    visited: Cell<usize>,
}

impl GridFile {
    pub fn new(bounds: BoundingBox, resolution: usize, bucket_capacity: usize) -> Self {
        assert!(resolution > 0, "grid resolution must be greater than zero");
        Self {
            bounds,
            resolution,
            bucket_capacity,
            buckets: FxHashMap::default(),
            len: 0,
            visited: Cell::new(0),
        }
    }

    /// Cell coordinate for one axis, clamped to the directory.
    fn cell_coord(&self, value: f64, min: f64, span: f64) -> usize {
        if span <= 0.0 {
            return 0;
        }
        let raw = ((value - min) / span * self.resolution as f64).floor();
        (raw.max(0.0) as usize).min(self.resolution - 1)
    }

    fn cell_of(&self, point: &GeoPoint) -> (usize, usize) {
        (
            self.cell_coord(point.lat, self.bounds.min_lat, self.bounds.lat_span()),
            self.cell_coord(point.lng, self.bounds.min_lng, self.bounds.lng_span()),
        )
    }

    /// Inclusive cell ranges covered by a query box.
    fn cell_range(&self, bounds: &BoundingBox) -> ((usize, usize), (usize, usize)) {
        let lat_span = self.bounds.lat_span();
        let lng_span = self.bounds.lng_span();
        (
            (
                self.cell_coord(bounds.min_lat, self.bounds.min_lat, lat_span),
                self.cell_coord(bounds.max_lat, self.bounds.min_lat, lat_span),
            ),
            (
                self.cell_coord(bounds.min_lng, self.bounds.min_lng, lng_span),
                self.cell_coord(bounds.max_lng, self.bounds.min_lng, lng_span),
            ),
        )
    }
}

impl SpatialIndex for GridFile {
    fn insert(&mut self, point: GeoPoint) -> Result<()> {
        let cell = self.cell_of(&point);
        let bucket = self.buckets.entry(cell).or_default();
        if bucket.len() == self.bucket_capacity {
            log::debug!("gridfile: bucket {cell:?} past soft capacity {}", self.bucket_capacity);
        }
        bucket.push(point);
        self.len += 1;
        Ok(())
    }

    fn window_query(&self, bounds: &BoundingBox) -> Vec<GeoPoint> {
        self.visited.set(0);
        let mut out = Vec::new();
        if self.len == 0 {
            return out;
        }

        let ((lat_lo, lat_hi), (lng_lo, lng_hi)) = self.cell_range(bounds);
        let mut visited = 0;
        for lat_cell in lat_lo..=lat_hi {
            for lng_cell in lng_lo..=lng_hi {
                visited += 1;
                let Some(bucket) = self.buckets.get(&(lat_cell, lng_cell)) else {
                    continue;
                };
                for point in bucket {
                    if bounds.contains(&point.position()) {
                        out.push(point.clone());
                    }
                }
            }
        }
        self.visited.set(visited);
        out
    }

    fn nodes_visited(&self) -> usize {
        self.visited.get()
    }

    /// Percentage of directory cells holding at least one point.
    fn load_factor(&self) -> Option<f64> {
        let total = (self.resolution * self.resolution) as f64;
        let occupied = self.buckets.values().filter(|b| !b.is_empty()).count() as f64;
        Some(occupied / total * 100.0)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn kind(&self) -> StructureKind {
        StructureKind::GridFile
    }
}
