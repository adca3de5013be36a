//! Interchangeable spatial index structures behind one capability surface.
//!
//! The four backends share no data layout (point-partitioning tree, quadrant
//! tree, bucket directory, bounding-box tree), so the engine talks to them
//! exclusively through [`SpatialIndex`]. Every backend answers the native
//! window (rectangle) query; the range, k-NN, and polygon executors in
//! [`crate::query`] are built on top of it.

mod gridfile;
mod kdtree;
mod quadtree;
mod rtree;

pub use gridfile::GridFile;
pub use kdtree::KdTree;
pub use quadtree::QuadTree;
pub use rtree::RTree;

use crate::error::Result;
use crate::types::{BoundingBox, Config, GeoPoint, StructureKind};

/// Margin in degrees added around the dataset bounds when a backend needs a
/// fixed build extent (quadtree, grid file).
const BOUNDS_PADDING_DEGREES: f64 = 0.01;

/// Capability contract every spatial index backend satisfies.
///
/// `window_query` must return every indexed point inside the box, boundary
/// inclusive, in an order that is deterministic for a fixed structure state.
/// `nodes_visited` reports the internal nodes examined by the most recent
/// query on this instance; the counter is reset at the start of each query,
/// so repeating an identical query reports an identical count.
pub trait SpatialIndex {
    /// Add one point. Called in dataset order during a build.
    fn insert(&mut self, point: GeoPoint) -> Result<()>;

    /// All indexed points inside `bounds`, boundary inclusive.
    fn window_query(&self, bounds: &BoundingBox) -> Vec<GeoPoint>;

    /// Internal nodes traversed by the most recently completed query.
    fn nodes_visited(&self) -> usize;

    /// Occupancy percentage (0-100) where the backend has a meaningful
    /// notion of fill; `None` means "not applicable", never zero.
    fn load_factor(&self) -> Option<f64> {
        None
    }

    /// Number of indexed points.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn kind(&self) -> StructureKind;
}

/// Build the selected structure from a dataset, inserting in dataset order.
///
/// The bounds-requiring backends receive the dataset's bounding box padded by
/// a small margin; an empty dataset gets a unit box so every query still
/// answers cleanly with zero results.
pub fn build_index(
    kind: StructureKind,
    points: &[GeoPoint],
    config: &Config,
) -> Result<Box<dyn SpatialIndex>> {
    let bounds = BoundingBox::of_points(points)
        .map(|b| b.padded(BOUNDS_PADDING_DEGREES))
        .unwrap_or(BoundingBox {
            min_lat: 0.0,
            max_lat: 1.0,
            min_lng: 0.0,
            max_lng: 1.0,
        });

    let mut index: Box<dyn SpatialIndex> = match kind {
        StructureKind::KdTree => Box::new(KdTree::new()),
        StructureKind::QuadTree => Box::new(QuadTree::new(
            bounds,
            config.quadtree_capacity,
            config.quadtree_max_depth,
        )),
        StructureKind::GridFile => Box::new(GridFile::new(
            bounds,
            config.grid_resolution,
            config.grid_bucket_capacity,
        )),
        StructureKind::RTree => Box::new(RTree::new(
            config.rtree_max_entries,
            config.rtree_min_entries,
        )),
    };

    for point in points {
        index.insert(point.clone())?;
    }

    log::debug!("built {} over {} points", kind, points.len());
    Ok(index)
}
