use geo::Point;
use geodex::{BoundingBox, Config, GeoPoint, StructureKind, build_index};

/// Deterministic coordinate sequence so failures are reproducible.
fn scattered_points(count: usize) -> Vec<GeoPoint> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut next = || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    (0..count)
        .map(|i| {
            let lat = next() * 10.0 - 5.0;
            let lng = next() * 10.0 - 5.0;
            GeoPoint::new(lat, lng, format!("p{i}"), "t")
        })
        .collect()
}

fn names(points: Vec<GeoPoint>) -> Vec<String> {
    let mut names: Vec<String> = points.into_iter().map(|p| p.name).collect();
    names.sort();
    names
}

#[test]
fn test_window_matches_brute_force_on_scattered_data() {
    let points = scattered_points(200);
    let config = Config::default();
    let boxes = [
        BoundingBox::new(-1.0, 1.0, -1.0, 1.0).unwrap(),
        BoundingBox::new(-5.0, 5.0, -5.0, 5.0).unwrap(),
        BoundingBox::new(2.0, 2.5, -4.0, 0.0).unwrap(),
        BoundingBox::new(4.9, 5.0, 4.9, 5.0).unwrap(),
    ];

    for kind in StructureKind::ALL {
        let index = build_index(kind, &points, &config).unwrap();
        for bbox in &boxes {
            let got = names(index.window_query(bbox));
            let expected = names(
                points
                    .iter()
                    .filter(|p| bbox.contains(&p.position()))
                    .cloned()
                    .collect(),
            );
            assert_eq!(got, expected, "{kind} window mismatch for {bbox:?}");
        }
    }
}

#[test]
fn test_range_matches_brute_force_on_scattered_data() {
    let points = scattered_points(200);
    let config = Config::default();
    let center = Point::new(0.5, -0.5);

    for kind in StructureKind::ALL {
        let index = build_index(kind, &points, &config).unwrap();
        for radius in [0.1, 1.0, 3.0, 20.0] {
            let got = names(
                geodex::range_query(index.as_ref(), &center, radius)
                    .unwrap()
                    .points,
            );
            let expected = names(
                points
                    .iter()
                    .filter(|p| p.distance_to(&center) <= radius)
                    .cloned()
                    .collect(),
            );
            assert_eq!(got, expected, "{kind} range mismatch for r={radius}");
        }
    }
}

#[test]
fn test_knn_excludes_nothing_closer() {
    let points = scattered_points(150);
    let config = Config::default();
    let center = Point::new(1.0, 1.0);

    for kind in StructureKind::ALL {
        let index = build_index(kind, &points, &config).unwrap();
        for k in [1, 7, 50, 150] {
            let result = geodex::knn_query(index.as_ref(), &center, k).unwrap();
            assert_eq!(result.points.len(), k.min(points.len()));

            let farthest = result
                .points
                .last()
                .map(|p| p.distance_to(&center))
                .unwrap();
            for p in &points {
                if !result.points.contains(p) {
                    assert!(
                        p.distance_to(&center) >= farthest,
                        "{kind} k={k} excluded a closer point"
                    );
                }
            }
        }
    }
}

#[test]
fn test_single_point_dataset() {
    let points = vec![GeoPoint::new(3.0, 3.0, "only", "t")];
    let config = Config::default();
    for kind in StructureKind::ALL {
        let index = build_index(kind, &points, &config).unwrap();

        let hit = BoundingBox::new(3.0, 3.0, 3.0, 3.0).unwrap();
        assert_eq!(index.window_query(&hit).len(), 1, "{kind}");

        let miss = BoundingBox::new(4.0, 5.0, 4.0, 5.0).unwrap();
        assert!(index.window_query(&miss).is_empty(), "{kind}");

        let knn = geodex::knn_query(index.as_ref(), &Point::new(0.0, 0.0), 5).unwrap();
        assert_eq!(knn.points.len(), 1);
    }
}

#[test]
fn test_duplicate_points_all_returned() {
    let mut points = Vec::new();
    for i in 0..9 {
        points.push(GeoPoint::new(1.0, 2.0, format!("dup{i}"), "t"));
    }
    points.push(GeoPoint::new(4.0, 4.0, "lone", "t"));

    let config = Config::default();
    let bbox = BoundingBox::new(1.0, 1.0, 2.0, 2.0).unwrap();
    for kind in StructureKind::ALL {
        let index = build_index(kind, &points, &config).unwrap();
        assert_eq!(index.window_query(&bbox).len(), 9, "{kind} lost duplicates");
    }
}

#[test]
fn test_negative_coordinates() {
    let points = vec![
        GeoPoint::new(-33.4489, -70.6693, "Santiago", "city"),
        GeoPoint::new(-34.6037, -58.3816, "Buenos Aires", "city"),
        GeoPoint::new(-12.0464, -77.0428, "Lima", "city"),
    ];
    let config = Config::default();
    for kind in StructureKind::ALL {
        let index = build_index(kind, &points, &config).unwrap();
        let bbox = BoundingBox::new(-35.0, -30.0, -71.0, -58.0).unwrap();
        assert_eq!(names(index.window_query(&bbox)), vec!["Buenos Aires", "Santiago"]);
    }
}

#[test]
fn test_degenerate_collinear_dataset() {
    // All points on one meridian stresses split logic in every backend.
    let points: Vec<GeoPoint> = (0..40)
        .map(|i| GeoPoint::new(f64::from(i) * 0.25, 7.0, format!("p{i}"), "t"))
        .collect();
    let config = Config::default();
    let bbox = BoundingBox::new(2.0, 5.0, 7.0, 7.0).unwrap();
    let expected = points
        .iter()
        .filter(|p| (2.0..=5.0).contains(&p.lat))
        .count();

    for kind in StructureKind::ALL {
        let index = build_index(kind, &points, &config).unwrap();
        assert_eq!(index.window_query(&bbox).len(), expected, "{kind}");
    }
}
