//! Point-partitioning k-d tree over (lat, lng).

use std::cell::Cell;

use crate::error::Result;
use crate::index::SpatialIndex;
use crate::types::{BoundingBox, GeoPoint, StructureKind};

struct KdNode {
    point: GeoPoint,
    left: Option<Box<KdNode>>,
    right: Option<Box<KdNode>>,
}

/// Binary tree alternating the splitting axis between latitude (even depth)
/// and longitude (odd depth). Points equal on the splitting axis go right, so
/// insertion order fully determines the shape and traversal order.
pub struct KdTree {
    root: Option<Box<KdNode>>,
    len: usize,
    visited: Cell<usize>,
}

/// Coordinate on the splitting axis for a given depth.
fn axis_key(point: &GeoPoint, depth: usize) -> f64 {
    if depth % 2 == 0 { point.lat } else { point.lng }
}

fn axis_range(bounds: &BoundingBox, depth: usize) -> (f64, f64) {
    if depth % 2 == 0 {
        (bounds.min_lat, bounds.max_lat)
    } else {
        (bounds.min_lng, bounds.max_lng)
    }
}

impl KdTree {
    pub fn new() -> Self {
        Self {
            root: None,
            len: 0,
            visited: Cell::new(0),
        }
    }

    /// Walks down to the insertion slot iteratively. The tree is not
    /// rebalanced, so coordinate-sorted input degenerates into a chain; a
    /// loop keeps that case at constant stack depth.
    fn insert_point(&mut self, point: GeoPoint) {
        let mut depth = 0;
        let mut slot = &mut self.root;
        while let Some(node) = slot {
            slot = if axis_key(&point, depth) < axis_key(&node.point, depth) {
                &mut node.left
            } else {
                &mut node.right
            };
            depth += 1;
        }
        *slot = Some(Box::new(KdNode {
            point,
            left: None,
            right: None,
        }));
    }

    /// Explicit-stack traversal, pushed right-before-left so enumeration
    /// matches in-order left-first and stays flat on degenerate chains.
    fn collect_window(&self, bounds: &BoundingBox, out: &mut Vec<GeoPoint>) {
        let mut stack: Vec<(&KdNode, usize)> = Vec::new();
        if let Some(root) = &self.root {
            stack.push((root, 0));
        }
        while let Some((node, depth)) = stack.pop() {
            self.visited.set(self.visited.get() + 1);

            if bounds.contains(&node.point.position()) {
                out.push(node.point.clone());
            }

            let key = axis_key(&node.point, depth);
            let (lo, hi) = axis_range(bounds, depth);

            // The left subtree only holds keys strictly below this node's
            // key, the right subtree keys at or above it.
            if let Some(right) = &node.right
                && hi >= key
            {
                stack.push((right, depth + 1));
            }
            if let Some(left) = &node.left
                && lo < key
            {
                stack.push((left, depth + 1));
            }
        }
    }
}

impl Default for KdTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialIndex for KdTree {
    fn insert(&mut self, point: GeoPoint) -> Result<()> {
        self.insert_point(point);
        self.len += 1;
        Ok(())
    }

    fn window_query(&self, bounds: &BoundingBox) -> Vec<GeoPoint> {
        self.visited.set(0);
        let mut out = Vec::new();
        self.collect_window(bounds, &mut out);
        out
    }

    fn nodes_visited(&self) -> usize {
        self.visited.get()
    }

    fn len(&self) -> usize {
        self.len
    }

    fn kind(&self) -> StructureKind {
        StructureKind::KdTree
    }
}
