//! Comparative spatial-index engine: four interchangeable 2D index
//! structures behind one capability surface, four query algorithms, and a
//! performance ledger that makes cross-structure benchmarking meaningful.
//!
//! ```rust
//! use geodex::{Explorer, GeoPoint, QueryRequest, StructureKind};
//! use geo::Point;
//!
//! let mut explorer = Explorer::default();
//! explorer.load_dataset(vec![
//!     GeoPoint::new(6.2476, -75.5658, "Parque Lleras", "park"),
//!     GeoPoint::new(6.2442, -75.5812, "Parque Botero", "culture"),
//! ])?;
//!
//! let outcome = explorer.execute(&QueryRequest::Range {
//!     center: Point::new(-75.5658, 6.2476),
//!     radius_meters: 2_000.0,
//! })?;
//! println!(
//!     "{} hits in {:.3} ms",
//!     outcome.result.points.len(),
//!     outcome.result.metrics.elapsed_millis
//! );
//!
//! explorer.set_structure(StructureKind::RTree)?;
//! # Ok::<(), geodex::GeodexError>(())
//! ```

pub mod error;
pub mod explorer;
pub mod index;
pub mod metrics;
pub mod overlay;
pub mod query;
pub mod timer;
pub mod types;

pub use error::{GeodexError, Result};
pub use explorer::{Explorer, QueryOutcome, QueryRequest};

pub use geo::{Point, Polygon};

pub use index::{GridFile, KdTree, QuadTree, RTree, SpatialIndex, build_index};

pub use metrics::{ComparisonLedger, LedgerSample, LedgerSummary, PerformanceReport};

pub use overlay::{Overlay, OverlayRole};

pub use query::{QueryMetrics, QueryResult, knn_query, polygon_query, range_query, window_query};

pub use timer::QueryTimer;

pub use types::{BoundingBox, Config, GeoPoint, QueryKind, StructureKind};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Explorer, GeodexError, QueryOutcome, QueryRequest, Result};

    pub use geo::Point;

    pub use crate::{BoundingBox, Config, GeoPoint, QueryKind, StructureKind};

    pub use crate::index::{SpatialIndex, build_index};

    pub use crate::{ComparisonLedger, QueryMetrics, QueryResult};
}
