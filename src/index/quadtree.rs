//! Quadrant-subdivision tree over a fixed build extent.

use std::cell::Cell;

use crate::error::Result;
use crate::index::SpatialIndex;
use crate::types::{BoundingBox, GeoPoint, StructureKind};

struct QuadNode {
    bounds: BoundingBox,
    depth: usize,
    points: Vec<GeoPoint>,
    children: Option<Box<[QuadNode; 4]>>,
}

/// Region quadtree: a quadrant splits into four once it holds `capacity`
/// points, down to `max_depth`. Quadrant assignment is half-open (a point on
/// the shared mid line goes to the north/east child), so every point lands in
/// exactly one quadrant.
pub struct QuadTree {
    root: QuadNode,
    capacity: usize,
    max_depth: usize,
    len: usize,
    /// Points outside the build extent; scanned alongside the root.
    outliers: Vec<GeoPoint>,
    visited: Cell<usize>,
}

impl QuadNode {
    fn leaf(bounds: BoundingBox, depth: usize) -> Self {
        Self {
            bounds,
            depth,
            points: Vec::new(),
            children: None,
        }
    }

    fn quadrant_of(&self, point: &GeoPoint) -> usize {
        let mid_lat = (self.bounds.min_lat + self.bounds.max_lat) / 2.0;
        let mid_lng = (self.bounds.min_lng + self.bounds.max_lng) / 2.0;
        let north = point.lat >= mid_lat;
        let east = point.lng >= mid_lng;
        match (north, east) {
            (true, true) => 0,
            (true, false) => 1,
            (false, false) => 2,
            (false, true) => 3,
        }
    }

    fn subdivide(&mut self) {
        let mid_lat = (self.bounds.min_lat + self.bounds.max_lat) / 2.0;
        let mid_lng = (self.bounds.min_lng + self.bounds.max_lng) / 2.0;
        let b = &self.bounds;
        let depth = self.depth + 1;
        let quads = [
            // Order matches quadrant_of: NE, NW, SW, SE.
            BoundingBox {
                min_lat: mid_lat,
                max_lat: b.max_lat,
                min_lng: mid_lng,
                max_lng: b.max_lng,
            },
            BoundingBox {
                min_lat: mid_lat,
                max_lat: b.max_lat,
                min_lng: b.min_lng,
                max_lng: mid_lng,
            },
            BoundingBox {
                min_lat: b.min_lat,
                max_lat: mid_lat,
                min_lng: b.min_lng,
                max_lng: mid_lng,
            },
            BoundingBox {
                min_lat: b.min_lat,
                max_lat: mid_lat,
                min_lng: mid_lng,
                max_lng: b.max_lng,
            },
        ];
        let mut children = Box::new(quads.map(|q| QuadNode::leaf(q, depth)));
        for point in std::mem::take(&mut self.points) {
            let quadrant = self.quadrant_of(&point);
            children[quadrant].points.push(point);
        }
        self.children = Some(children);
    }

    fn insert(&mut self, point: GeoPoint, capacity: usize, max_depth: usize) {
        let quadrant = self.quadrant_of(&point);
        if let Some(children) = &mut self.children {
            children[quadrant].insert(point, capacity, max_depth);
            return;
        }

        self.points.push(point);
        if self.points.len() > capacity && self.depth < max_depth {
            self.subdivide();
        }
    }
}

impl QuadTree {
    pub fn new(bounds: BoundingBox, capacity: usize, max_depth: usize) -> Self {
        Self {
            root: QuadNode::leaf(bounds, 0),
            capacity,
            max_depth,
            len: 0,
            outliers: Vec::new(),
            visited: Cell::new(0),
        }
    }

    fn collect_window(&self, node: &QuadNode, bounds: &BoundingBox, out: &mut Vec<GeoPoint>) {
        self.visited.set(self.visited.get() + 1);

        for point in &node.points {
            if bounds.contains(&point.position()) {
                out.push(point.clone());
            }
        }
        if let Some(children) = &node.children {
            for child in children.iter() {
                if child.bounds.intersects(bounds) {
                    self.collect_window(child, bounds, out);
                }
            }
        }
    }
}

impl SpatialIndex for QuadTree {
    fn insert(&mut self, point: GeoPoint) -> Result<()> {
        if self.root.bounds.contains(&point.position()) {
            self.root.insert(point, self.capacity, self.max_depth);
        } else {
            log::debug!(
                "quadtree: point '{}' outside build extent, kept aside",
                point.name
            );
            self.outliers.push(point);
        }
        self.len += 1;
        Ok(())
    }

    fn window_query(&self, bounds: &BoundingBox) -> Vec<GeoPoint> {
        self.visited.set(0);
        let mut out = Vec::new();
        if self.len == 0 {
            return out;
        }
        self.collect_window(&self.root, bounds, &mut out);
        for point in &self.outliers {
            if bounds.contains(&point.position()) {
                out.push(point.clone());
            }
        }
        out
    }

    fn nodes_visited(&self) -> usize {
        self.visited.get()
    }

    fn len(&self) -> usize {
        self.len
    }

    fn kind(&self) -> StructureKind {
        StructureKind::QuadTree
    }
}
