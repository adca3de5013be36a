//! Bounding-box tree (R-tree) with quadratic node splits.

use std::cell::Cell;

use crate::error::Result;
use crate::index::SpatialIndex;
use crate::types::{BoundingBox, GeoPoint, StructureKind};

fn point_box(point: &GeoPoint) -> BoundingBox {
    BoundingBox {
        min_lat: point.lat,
        max_lat: point.lat,
        min_lng: point.lng,
        max_lng: point.lng,
    }
}

fn union(a: &BoundingBox, b: &BoundingBox) -> BoundingBox {
    BoundingBox {
        min_lat: a.min_lat.min(b.min_lat),
        max_lat: a.max_lat.max(b.max_lat),
        min_lng: a.min_lng.min(b.min_lng),
        max_lng: a.max_lng.max(b.max_lng),
    }
}

fn area(b: &BoundingBox) -> f64 {
    b.lat_span() * b.lng_span()
}

/// Extra area needed for `b` to also cover `add`.
fn enlargement(b: &BoundingBox, add: &BoundingBox) -> f64 {
    area(&union(b, add)) - area(b)
}

struct RNode {
    bbox: BoundingBox,
    points: Vec<GeoPoint>,
    children: Vec<RNode>,
}

impl RNode {
    fn leaf_with(point: GeoPoint) -> Self {
        Self {
            bbox: point_box(&point),
            points: vec![point],
            children: Vec::new(),
        }
    }

    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn recompute_bbox(&mut self) {
        let boxes: Vec<BoundingBox> = if self.is_leaf() {
            self.points.iter().map(point_box).collect()
        } else {
            self.children.iter().map(|c| c.bbox).collect()
        };
        let mut iter = boxes.into_iter();
        if let Some(first) = iter.next() {
            self.bbox = iter.fold(first, |acc, b| union(&acc, &b));
        }
    }
}

/// R-tree over point entries. Leaves hold up to `max_entries` points and
/// split quadratically on overflow; the split propagates upward and grows a
/// new root when it reaches the top.
pub struct RTree {
    root: Option<RNode>,
    max_entries: usize,
    min_entries: usize,
    len: usize,
    visited: Cell<usize>,
}

impl RTree {
    pub fn new(max_entries: usize, min_entries: usize) -> Self {
        assert!(
            min_entries >= 2 && max_entries >= 2 * min_entries,
            "rtree entry bounds must satisfy 2 <= min and max >= 2*min"
        );
        Self {
            root: None,
            max_entries,
            min_entries,
            len: 0,
            visited: Cell::new(0),
        }
    }

    /// Insert into `node`; returns a split-off sibling when the node
    /// overflowed.
    fn insert_into(&self, node: &mut RNode, point: GeoPoint) -> Option<RNode> {
        node.bbox = union(&node.bbox, &point_box(&point));

        if node.is_leaf() {
            node.points.push(point);
            if node.points.len() > self.max_entries {
                return Some(self.split_leaf(node));
            }
            return None;
        }

        let target = Self::choose_subtree(node, &point);
        if let Some(sibling) = self.insert_into(&mut node.children[target], point) {
            node.children.push(sibling);
            if node.children.len() > self.max_entries {
                return Some(self.split_internal(node));
            }
        }
        None
    }

    /// Child needing the least bbox enlargement, area then index as
    /// tie-breakers, keeping the choice deterministic.
    fn choose_subtree(node: &RNode, point: &GeoPoint) -> usize {
        let pb = point_box(point);
        let mut best = 0;
        let mut best_enlargement = f64::INFINITY;
        let mut best_area = f64::INFINITY;
        for (i, child) in node.children.iter().enumerate() {
            let grow = enlargement(&child.bbox, &pb);
            let child_area = area(&child.bbox);
            if grow < best_enlargement || (grow == best_enlargement && child_area < best_area) {
                best = i;
                best_enlargement = grow;
                best_area = child_area;
            }
        }
        best
    }

    /// Quadratic split seeds: the pair whose combined box wastes the most
    /// area.
    fn pick_seeds(boxes: &[BoundingBox]) -> (usize, usize) {
        let mut seeds = (0, 1);
        let mut worst = f64::NEG_INFINITY;
        for i in 0..boxes.len() {
            for j in (i + 1)..boxes.len() {
                let waste = area(&union(&boxes[i], &boxes[j])) - area(&boxes[i]) - area(&boxes[j]);
                if waste > worst {
                    worst = waste;
                    seeds = (i, j);
                }
            }
        }
        seeds
    }

    fn split_leaf(&self, node: &mut RNode) -> RNode {
        let points = std::mem::take(&mut node.points);
        let boxes: Vec<BoundingBox> = points.iter().map(point_box).collect();
        let assignment = self.distribute(&boxes);

        let mut right_points = Vec::new();
        for (point, to_right) in points.into_iter().zip(assignment) {
            if to_right {
                right_points.push(point);
            } else {
                node.points.push(point);
            }
        }
        node.recompute_bbox();

        let mut sibling = RNode {
            bbox: point_box(&right_points[0]),
            points: right_points,
            children: Vec::new(),
        };
        sibling.recompute_bbox();
        sibling
    }

    fn split_internal(&self, node: &mut RNode) -> RNode {
        let children = std::mem::take(&mut node.children);
        let boxes: Vec<BoundingBox> = children.iter().map(|c| c.bbox).collect();
        let assignment = self.distribute(&boxes);

        let mut right_children = Vec::new();
        for (child, to_right) in children.into_iter().zip(assignment) {
            if to_right {
                right_children.push(child);
            } else {
                node.children.push(child);
            }
        }
        node.recompute_bbox();

        let mut sibling = RNode {
            bbox: right_children[0].bbox,
            points: Vec::new(),
            children: right_children,
        };
        sibling.recompute_bbox();
        sibling
    }

    /// Assign each box to the left (false) or right (true) group, seeded
    /// quadratically, each following entry joining the group whose box grows
    /// least while both groups are guaranteed `min_entries`.
    fn distribute(&self, boxes: &[BoundingBox]) -> Vec<bool> {
        let (left_seed, right_seed) = Self::pick_seeds(boxes);
        let mut assignment = vec![false; boxes.len()];
        assignment[right_seed] = true;

        let mut left_bbox = boxes[left_seed];
        let mut right_bbox = boxes[right_seed];
        let mut left_count = 1;
        let mut right_count = 1;
        let remaining = boxes.len() - 2;

        for (i, b) in boxes.iter().enumerate() {
            if i == left_seed || i == right_seed {
                continue;
            }
            let assigned = left_count + right_count - 2;
            let still_to_place = remaining - assigned;

            // Force the tail into a group that would otherwise underfill.
            let to_right = if left_count + still_to_place <= self.min_entries {
                false
            } else if right_count + still_to_place <= self.min_entries {
                true
            } else {
                enlargement(&right_bbox, b) < enlargement(&left_bbox, b)
            };

            assignment[i] = to_right;
            if to_right {
                right_bbox = union(&right_bbox, b);
                right_count += 1;
            } else {
                left_bbox = union(&left_bbox, b);
                left_count += 1;
            }
        }
        assignment
    }

    fn collect_window(&self, node: &RNode, bounds: &BoundingBox, out: &mut Vec<GeoPoint>) {
        self.visited.set(self.visited.get() + 1);

        if node.is_leaf() {
            for point in &node.points {
                if bounds.contains(&point.position()) {
                    out.push(point.clone());
                }
            }
            return;
        }
        for child in &node.children {
            if child.bbox.intersects(bounds) {
                self.collect_window(child, bounds, out);
            }
        }
    }
}

impl SpatialIndex for RTree {
    fn insert(&mut self, point: GeoPoint) -> Result<()> {
        match self.root.take() {
            None => self.root = Some(RNode::leaf_with(point)),
            Some(mut root) => {
                if let Some(sibling) = self.insert_into(&mut root, point) {
                    let bbox = union(&root.bbox, &sibling.bbox);
                    self.root = Some(RNode {
                        bbox,
                        points: Vec::new(),
                        children: vec![root, sibling],
                    });
                } else {
                    self.root = Some(root);
                }
            }
        }
        self.len += 1;
        Ok(())
    }

    fn window_query(&self, bounds: &BoundingBox) -> Vec<GeoPoint> {
        self.visited.set(0);
        let mut out = Vec::new();
        if let Some(root) = &self.root
            && root.bbox.intersects(bounds)
        {
            self.collect_window(root, bounds, &mut out);
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
        StructureKind::RTree
    }
}
