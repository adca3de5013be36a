use geo::Point;
use geodex::{
    BoundingBox, Config, Explorer, GeoPoint, QueryKind, QueryRequest, StructureKind, build_index,
};

fn city_points() -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(6.2476, -75.5658, "Parque Lleras", "park"),
        GeoPoint::new(6.2442, -75.5812, "Parque Botero", "culture"),
        GeoPoint::new(6.2518, -75.5636, "Parque El Poblado", "park"),
        GeoPoint::new(6.2308, -75.5906, "Universidad de Antioquia", "education"),
        GeoPoint::new(6.1747, -75.5978, "Aeropuerto Jose Maria Cordova", "transport"),
        GeoPoint::new(6.2914, -75.5361, "Parque Arvi", "nature"),
        GeoPoint::new(6.2303, -75.5761, "Plaza Mayor", "convention"),
        GeoPoint::new(6.2707, -75.5675, "Estadio Atanasio Girardot", "sport"),
        GeoPoint::new(6.2443, -75.5735, "Catedral Metropolitana", "religious"),
        GeoPoint::new(6.2490, -75.5748, "Museo de Antioquia", "culture"),
    ]
}

#[test]
fn test_full_workflow_across_structures() {
    let mut explorer = Explorer::default();
    explorer.load_dataset(city_points()).unwrap();

    let center = Point::new(-75.5748, 6.2490);
    let viewport = BoundingBox::new(6.15, 6.30, -75.62, -75.52).unwrap();
    let polygon = vec![
        Point::new(-75.60, 6.22),
        Point::new(-75.55, 6.22),
        Point::new(-75.55, 6.26),
        Point::new(-75.60, 6.26),
    ];

    for kind in StructureKind::ALL {
        explorer.set_structure(kind).unwrap();

        let range = explorer
            .execute(&QueryRequest::Range {
                center,
                radius_meters: 2_000.0,
            })
            .unwrap();
        let knn = explorer
            .execute(&QueryRequest::Knn {
                center,
                k: Some(3),
            })
            .unwrap();
        let poly = explorer
            .execute(&QueryRequest::Polygon {
                vertices: polygon.clone(),
            })
            .unwrap();
        let window = explorer
            .execute(&QueryRequest::Window { viewport })
            .unwrap();

        assert!(!range.result.points.is_empty(), "{kind} range found nothing");
        assert_eq!(knn.result.points.len(), 3, "{kind} knn wrong length");
        assert!(!poly.result.points.is_empty(), "{kind} polygon found nothing");
        assert!(!window.result.points.is_empty(), "{kind} window found nothing");

        assert_eq!(explorer.ledger().samples(kind).len(), 4);
    }

    let report = explorer.performance_report();
    assert_eq!(report.summaries.len(), 4);
    assert_eq!(report.last_query, Some(QueryKind::Window));
    assert!(explorer.ledger().fastest().is_some());
}

#[test]
fn test_all_structures_agree_on_results() {
    // Query semantics are backend independent: every structure must return
    // the same point set for the same query.
    let points = city_points();
    let config = Config::default();
    let center = Point::new(-75.5748, 6.2490);
    let radius = 2_000.0 / config.meters_per_degree;
    let bbox = BoundingBox::new(6.20, 6.26, -75.59, -75.55).unwrap();

    let mut range_answers = Vec::new();
    let mut window_answers = Vec::new();
    for kind in StructureKind::ALL {
        let index = build_index(kind, &points, &config).unwrap();

        let mut range: Vec<String> = geodex::range_query(index.as_ref(), &center, radius)
            .unwrap()
            .points
            .into_iter()
            .map(|p| p.name)
            .collect();
        range.sort();
        range_answers.push(range);

        let mut window: Vec<String> = geodex::window_query(index.as_ref(), &bbox)
            .unwrap()
            .points
            .into_iter()
            .map(|p| p.name)
            .collect();
        window.sort();
        window_answers.push(window);
    }

    assert!(range_answers.windows(2).all(|w| w[0] == w[1]));
    assert!(window_answers.windows(2).all(|w| w[0] == w[1]));
    assert!(!range_answers[0].is_empty());
    assert!(!window_answers[0].is_empty());
}

#[test]
fn test_knn_agrees_on_distances_across_structures() {
    let points = city_points();
    let config = Config::default();
    let center = Point::new(-75.57, 6.24);

    let mut per_structure: Vec<Vec<f64>> = Vec::new();
    for kind in StructureKind::ALL {
        let index = build_index(kind, &points, &config).unwrap();
        let result = geodex::knn_query(index.as_ref(), &center, 5).unwrap();
        per_structure.push(
            result
                .points
                .iter()
                .map(|p| p.distance_to(&center))
                .collect(),
        );
    }

    // Tie-breaking may differ per backend, but the distance profile must not.
    for distances in &per_structure[1..] {
        assert_eq!(distances.len(), per_structure[0].len());
        for (a, b) in distances.iter().zip(&per_structure[0]) {
            assert!((a - b).abs() < 1e-12);
        }
    }
}

#[test]
fn test_rebuild_on_dataset_replacement() {
    let mut explorer = Explorer::default();
    explorer.load_dataset(city_points()).unwrap();

    let viewport = BoundingBox::new(6.15, 6.30, -75.62, -75.52).unwrap();
    let before = explorer
        .execute(&QueryRequest::Window { viewport })
        .unwrap();
    assert!(!before.result.points.is_empty());

    // Replacing the dataset rebuilds; the old points are gone entirely.
    explorer
        .load_dataset(vec![GeoPoint::new(50.0, 50.0, "elsewhere", "t")])
        .unwrap();
    let after = explorer
        .execute(&QueryRequest::Window { viewport })
        .unwrap();
    assert!(after.result.points.is_empty());

    // Both runs were recorded against the same structure kind.
    assert_eq!(
        explorer.ledger().samples(StructureKind::KdTree).len(),
        2
    );
}

#[test]
fn test_report_exports_as_json() {
    let mut explorer = Explorer::default();
    explorer.load_dataset(city_points()).unwrap();
    explorer
        .execute(&QueryRequest::Knn {
            center: Point::new(-75.57, 6.24),
            k: None,
        })
        .unwrap();

    let report = explorer.performance_report();
    let json = serde_json::to_string_pretty(&report).unwrap();
    assert!(json.contains("\"structure\": \"kdtree\""));
    assert!(json.contains("\"last_query\": \"knn\""));

    let back: geodex::PerformanceReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back.dataset_size, 10);
}

#[test]
fn test_dataset_parses_original_shape() {
    // Points round-trip through the wire shape the host application uses,
    // including the legacy "type" field name.
    let json = r#"[
        {"lat": 4.7110, "lng": -74.0721, "name": "Plaza de Bolivar", "type": "history"},
        {"lat": 4.6097, "lng": -74.0817, "name": "Zona Rosa", "type": "commerce"}
    ]"#;
    let points: Vec<GeoPoint> = serde_json::from_str(json).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].category, "history");

    let mut explorer = Explorer::default();
    explorer.load_dataset(points).unwrap();
    assert!(explorer.is_built());
}
