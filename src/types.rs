//! Core data types and configuration for geodex.
//!
//! Points and boxes are expressed in decimal degrees. The `geo` crate is the
//! coordinate substrate: `geo::Point` carries `x = lng`, `y = lat`.

use geo::{Distance, Euclidean, Point};
use serde::de::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GeodexError, Result};

/// A named geographic point of interest.
///
/// Immutable once loaded; no coordinate normalization or validation beyond
/// what the data source guarantees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    #[serde(alias = "type")]
    pub category: String,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            name: name.into(),
            category: category.into(),
        }
    }

    /// Coordinates as a `geo::Point` (x = lng, y = lat).
    pub fn position(&self) -> Point {
        Point::new(self.lng, self.lat)
    }

    /// Planar Euclidean distance in degrees. The flat-earth approximation is
    /// deliberate: query radii are pre-converted from meters by the caller.
    pub fn distance_to(&self, other: &Point) -> f64 {
        Euclidean.distance(self.position(), *other)
    }
}

/// An axis-aligned latitude/longitude rectangle.
///
/// Invariant: `min_lat <= max_lat` and `min_lng <= max_lng`, enforced at
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Create a bounding box, validating coordinate order.
    pub fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Result<Self> {
        if !(min_lat.is_finite() && max_lat.is_finite() && min_lng.is_finite() && max_lng.is_finite())
        {
            return Err(GeodexError::InvalidInput(
                "bounding box coordinates must be finite".to_string(),
            ));
        }
        if min_lat > max_lat {
            return Err(GeodexError::InvalidInput(format!(
                "min_lat ({min_lat}) must be <= max_lat ({max_lat})"
            )));
        }
        if min_lng > max_lng {
            return Err(GeodexError::InvalidInput(format!(
                "min_lng ({min_lng}) must be <= max_lng ({max_lng})"
            )));
        }
        Ok(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// The box centered on `center` with the given half-spans.
    pub fn around(center: &Point, half_lat: f64, half_lng: f64) -> Result<Self> {
        Self::new(
            center.y() - half_lat,
            center.y() + half_lat,
            center.x() - half_lng,
            center.x() + half_lng,
        )
    }

    /// The tight bounding box of a point set, or `None` when empty.
    pub fn of_points(points: &[GeoPoint]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = Self {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lng: first.lng,
            max_lng: first.lng,
        };
        for p in &points[1..] {
            bbox.min_lat = bbox.min_lat.min(p.lat);
            bbox.max_lat = bbox.max_lat.max(p.lat);
            bbox.min_lng = bbox.min_lng.min(p.lng);
            bbox.max_lng = bbox.max_lng.max(p.lng);
        }
        Some(bbox)
    }

    /// Grow the box by `margin` degrees on every side.
    pub fn padded(&self, margin: f64) -> Self {
        Self {
            min_lat: self.min_lat - margin,
            max_lat: self.max_lat + margin,
            min_lng: self.min_lng - margin,
            max_lng: self.max_lng + margin,
        }
    }

    /// Boundary-inclusive containment test.
    pub fn contains(&self, point: &Point) -> bool {
        point.y() >= self.min_lat
            && point.y() <= self.max_lat
            && point.x() >= self.min_lng
            && point.x() <= self.max_lng
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_lat <= other.max_lat
            && self.max_lat >= other.min_lat
            && self.min_lng <= other.max_lng
            && self.max_lng >= other.min_lng
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_lng + self.max_lng) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lng_span(&self) -> f64 {
        self.max_lng - self.min_lng
    }
}

/// Selector over the interchangeable spatial index structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    KdTree,
    QuadTree,
    GridFile,
    RTree,
}

impl StructureKind {
    pub const ALL: [StructureKind; 4] = [
        StructureKind::KdTree,
        StructureKind::QuadTree,
        StructureKind::GridFile,
        StructureKind::RTree,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StructureKind::KdTree => "kdtree",
            StructureKind::QuadTree => "quadtree",
            StructureKind::GridFile => "gridfile",
            StructureKind::RTree => "rtree",
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four query algorithms the engine can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Range,
    Knn,
    Polygon,
    Window,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Range => "range",
            QueryKind::Knn => "knn",
            QueryKind::Polygon => "polygon",
            QueryKind::Window => "window",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine configuration.
///
/// Policy constants the host application may tune live here rather than being
/// hard-coded: the meters-to-degrees conversion used for range radii, the
/// viewport fraction used to size window queries, the default k, and the
/// structural knobs of each backend.
///
/// # Example
///
/// ```rust
/// use geodex::Config;
///
/// let config = Config::default();
///
/// let json = r#"{
///     "default_k": 10,
///     "window_fraction": 0.5
/// }"#;
/// let config: Config = Config::from_json(json).unwrap();
/// assert_eq!(config.default_k, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Meters per degree used to convert range radii (flat approximation).
    #[serde(default = "Config::default_meters_per_degree")]
    pub meters_per_degree: f64,

    /// Fraction of the viewport span a window query covers in each dimension.
    #[serde(default = "Config::default_window_fraction")]
    pub window_fraction: f64,

    /// k used when a k-NN request omits it.
    #[serde(default = "Config::default_k_value")]
    pub default_k: usize,

    /// Points a quadtree quadrant holds before subdividing.
    #[serde(default = "Config::default_quadtree_capacity")]
    pub quadtree_capacity: usize,

    /// Maximum quadtree subdivision depth.
    #[serde(default = "Config::default_quadtree_max_depth")]
    pub quadtree_max_depth: usize,

    /// Cells per axis in the grid-file directory.
    #[serde(default = "Config::default_grid_resolution")]
    pub grid_resolution: usize,

    /// Soft per-bucket capacity used for the grid-file load factor.
    #[serde(default = "Config::default_grid_bucket_capacity")]
    pub grid_bucket_capacity: usize,

    /// Maximum entries in an R-tree node before it splits.
    #[serde(default = "Config::default_rtree_max_entries")]
    pub rtree_max_entries: usize,

    /// Minimum entries kept on each side of an R-tree split.
    #[serde(default = "Config::default_rtree_min_entries")]
    pub rtree_min_entries: usize,
}

impl Config {
    const fn default_meters_per_degree() -> f64 {
        111_320.0
    }

    const fn default_window_fraction() -> f64 {
        0.3
    }

    const fn default_k_value() -> usize {
        5
    }

    const fn default_quadtree_capacity() -> usize {
        4
    }

    const fn default_quadtree_max_depth() -> usize {
        8
    }

    const fn default_grid_resolution() -> usize {
        4
    }

    const fn default_grid_bucket_capacity() -> usize {
        10
    }

    const fn default_rtree_max_entries() -> usize {
        9
    }

    const fn default_rtree_min_entries() -> usize {
        4
    }

    pub fn with_default_k(mut self, k: usize) -> Self {
        assert!(k > 0, "default k must be greater than zero");
        self.default_k = k;
        self
    }

    pub fn with_window_fraction(mut self, fraction: f64) -> Self {
        assert!(
            fraction > 0.0 && fraction <= 1.0,
            "window fraction must be in (0, 1]"
        );
        self.window_fraction = fraction;
        self
    }

    pub fn with_meters_per_degree(mut self, meters: f64) -> Self {
        assert!(meters > 0.0, "meters per degree must be positive");
        self.meters_per_degree = meters;
        self
    }

    pub fn with_grid_resolution(mut self, resolution: usize) -> Self {
        assert!(resolution > 0, "grid resolution must be greater than zero");
        self.grid_resolution = resolution;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.meters_per_degree.is_finite() || self.meters_per_degree <= 0.0 {
            return Err("meters_per_degree must be positive and finite".to_string());
        }
        if !self.window_fraction.is_finite()
            || self.window_fraction <= 0.0
            || self.window_fraction > 1.0
        {
            return Err("window_fraction must be in (0, 1]".to_string());
        }
        if self.default_k == 0 {
            return Err("default_k must be greater than zero".to_string());
        }
        if self.quadtree_capacity == 0 {
            return Err("quadtree_capacity must be greater than zero".to_string());
        }
        if self.quadtree_max_depth == 0 {
            return Err("quadtree_max_depth must be greater than zero".to_string());
        }
        if self.grid_resolution == 0 {
            return Err("grid_resolution must be greater than zero".to_string());
        }
        if self.grid_bucket_capacity == 0 {
            return Err("grid_bucket_capacity must be greater than zero".to_string());
        }
        if self.rtree_min_entries < 2 {
            return Err("rtree_min_entries must be at least 2".to_string());
        }
        if self.rtree_max_entries < 2 * self.rtree_min_entries {
            return Err("rtree_max_entries must be at least twice rtree_min_entries".to_string());
        }
        Ok(())
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as a JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meters_per_degree: Self::default_meters_per_degree(),
            window_fraction: Self::default_window_fraction(),
            default_k: Self::default_k_value(),
            quadtree_capacity: Self::default_quadtree_capacity(),
            quadtree_max_depth: Self::default_quadtree_max_depth(),
            grid_resolution: Self::default_grid_resolution(),
            grid_bucket_capacity: Self::default_grid_bucket_capacity(),
            rtree_max_entries: Self::default_rtree_max_entries(),
            rtree_min_entries: Self::default_rtree_min_entries(),
        }
    }
}
