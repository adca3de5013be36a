//! Orchestrator owning the dataset, the active structure, and the ledger.

use geo::Point;

use crate::error::{GeodexError, Result};
use crate::index::{SpatialIndex, build_index};
use crate::metrics::{ComparisonLedger, PerformanceReport};
use crate::overlay::{self, Overlay};
use crate::query::{self, QueryResult};
use crate::types::{BoundingBox, Config, GeoPoint, QueryKind, StructureKind};

/// External-collaborator inputs for one query execution.
///
/// `Range` carries its radius in meters (converted through
/// [`Config::meters_per_degree`]); a `Knn` request without `k` falls back to
/// [`Config::default_k`]; `Window` derives its box from the supplied viewport
/// (a rectangle of [`Config::window_fraction`] of the viewport span, centered
/// on the viewport center).
#[derive(Debug, Clone, PartialEq)]
pub enum QueryRequest {
    Range { center: Point, radius_meters: f64 },
    Knn { center: Point, k: Option<usize> },
    Polygon { vertices: Vec<Point> },
    Window { viewport: BoundingBox },
}

impl QueryRequest {
    pub fn kind(&self) -> QueryKind {
        match self {
            QueryRequest::Range { .. } => QueryKind::Range,
            QueryRequest::Knn { .. } => QueryKind::Knn,
            QueryRequest::Polygon { .. } => QueryKind::Polygon,
            QueryRequest::Window { .. } => QueryKind::Window,
        }
    }
}

/// A query result together with its renderable overlay descriptors.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub result: QueryResult,
    pub overlays: Vec<Overlay>,
}

/// The engine front door.
///
/// Owns a single dataset and at most one built structure at a time. Loading
/// a dataset or switching the structure kind triggers a full rebuild; the
/// previous structure is discarded entirely. Only the [`ComparisonLedger`]
/// survives across rebuilds.
///
/// # Example
///
/// ```rust
/// use geodex::{Explorer, GeoPoint, QueryRequest, StructureKind};
/// use geo::Point;
///
/// let mut explorer = Explorer::default();
/// explorer.load_dataset(vec![
///     GeoPoint::new(6.2476, -75.5658, "Parque Lleras", "park"),
///     GeoPoint::new(6.2442, -75.5812, "Parque Botero", "culture"),
/// ])?;
/// explorer.set_structure(StructureKind::RTree)?;
///
/// let outcome = explorer.execute(&QueryRequest::Knn {
///     center: Point::new(-75.57, 6.25),
///     k: Some(1),
/// })?;
/// assert_eq!(outcome.result.points.len(), 1);
/// # Ok::<(), geodex::GeodexError>(())
/// ```
pub struct Explorer {
    config: Config,
    dataset: Vec<GeoPoint>,
    structure: Option<Box<dyn SpatialIndex>>,
    structure_kind: StructureKind,
    selected_query: Option<QueryKind>,
    ledger: ComparisonLedger,
}

impl Default for Explorer {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Explorer {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            dataset: Vec::new(),
            structure: None,
            structure_kind: StructureKind::KdTree,
            selected_query: None,
            ledger: ComparisonLedger::new(),
        }
    }

    /// Replace the dataset wholesale and rebuild the active structure kind
    /// over it. An empty dataset is valid: every query then returns zero
    /// results without error.
    pub fn load_dataset(&mut self, points: Vec<GeoPoint>) -> Result<()> {
        self.dataset = points;
        self.rebuild()?;
        log::info!(
            "loaded {} points, rebuilt {}",
            self.dataset.len(),
            self.structure_kind
        );
        Ok(())
    }

    /// Switch the active structure kind. Rebuilds immediately when a dataset
    /// is present; otherwise only records the selection.
    pub fn set_structure(&mut self, kind: StructureKind) -> Result<()> {
        self.structure_kind = kind;
        if self.structure.is_some() || !self.dataset.is_empty() {
            self.rebuild()?;
        }
        Ok(())
    }

    fn rebuild(&mut self) -> Result<()> {
        // The old structure is dropped here; nothing is shared or migrated.
        self.structure = Some(build_index(
            self.structure_kind,
            &self.dataset,
            &self.config,
        )?);
        Ok(())
    }

    /// Choose the query type subsequent [`Explorer::execute_selected`] calls
    /// will run.
    pub fn select_query(&mut self, kind: QueryKind) {
        self.selected_query = Some(kind);
    }

    pub fn selected_query(&self) -> Option<QueryKind> {
        self.selected_query
    }

    /// Execute a query against the built structure. The request's kind
    /// becomes the selected query; a successful run is recorded in the
    /// ledger, a failed one leaves no partial state behind.
    pub fn execute(&mut self, request: &QueryRequest) -> Result<QueryOutcome> {
        let index = self.structure.as_deref().ok_or(GeodexError::NoStructure)?;

        let outcome = match request {
            QueryRequest::Range {
                center,
                radius_meters,
            } => {
                let radius_degrees = radius_meters / self.config.meters_per_degree;
                let result = query::range_query(index, center, radius_degrees)?;
                let overlays = overlay::for_range(center, radius_degrees, &result, &self.dataset);
                QueryOutcome { result, overlays }
            }
            QueryRequest::Knn { center, k } => {
                let k = k.unwrap_or(self.config.default_k);
                let result = query::knn_query(index, center, k)?;
                let overlays = overlay::for_knn(center, &result);
                QueryOutcome { result, overlays }
            }
            QueryRequest::Polygon { vertices } => {
                let result = query::polygon_query(index, vertices)?;
                let overlays = overlay::for_polygon(vertices, &result);
                QueryOutcome { result, overlays }
            }
            QueryRequest::Window { viewport } => {
                let bounds = self.window_bounds(viewport)?;
                let result = query::window_query(index, &bounds)?;
                let overlays = overlay::for_window(&bounds, &result);
                QueryOutcome { result, overlays }
            }
        };

        self.selected_query = Some(request.kind());
        self.ledger
            .record(self.structure_kind, request.kind(), outcome.result.metrics);
        Ok(outcome)
    }

    /// Execute the previously selected query type; fails with
    /// [`GeodexError::NoQuerySelected`] when none was chosen and rejects a
    /// request of a different kind.
    pub fn execute_selected(&mut self, request: &QueryRequest) -> Result<QueryOutcome> {
        let selected = self.selected_query.ok_or(GeodexError::NoQuerySelected)?;
        if selected != request.kind() {
            return Err(GeodexError::InvalidInput(format!(
                "selected query is {selected}, request is {}",
                request.kind()
            )));
        }
        self.execute(request)
    }

    /// The window box: a rectangle covering `window_fraction` of the
    /// viewport span in each dimension, centered on the viewport center.
    fn window_bounds(&self, viewport: &BoundingBox) -> Result<BoundingBox> {
        let half_lat = viewport.lat_span() * self.config.window_fraction / 2.0;
        let half_lng = viewport.lng_span() * self.config.window_fraction / 2.0;
        BoundingBox::around(&viewport.center(), half_lat, half_lng)
    }

    /// Drop the dataset, structure, and query selection. The ledger stays.
    pub fn clear(&mut self) {
        self.dataset.clear();
        self.structure = None;
        self.selected_query = None;
        log::info!("cleared dataset and structure");
    }

    pub fn dataset(&self) -> &[GeoPoint] {
        &self.dataset
    }

    pub fn structure_kind(&self) -> StructureKind {
        self.structure_kind
    }

    pub fn is_built(&self) -> bool {
        self.structure.is_some()
    }

    /// Load factor of the active structure, when it reports one.
    pub fn load_factor(&self) -> Option<f64> {
        self.structure.as_deref().and_then(SpatialIndex::load_factor)
    }

    pub fn ledger(&self) -> &ComparisonLedger {
        &self.ledger
    }

    pub fn reset_ledger(&mut self) {
        self.ledger.reset();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Snapshot for the export collaborator.
    pub fn performance_report(&self) -> PerformanceReport {
        PerformanceReport::from_ledger(
            &self.ledger,
            self.structure_kind,
            self.dataset.len(),
            self.selected_query,
        )
    }
}
