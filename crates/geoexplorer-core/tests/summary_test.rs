//! End-to-end checks of normalization, summaries and color scales

use geoexplorer_core::color::{color_scale, ScaleOptions};
use geoexplorer_core::summary::{normalize, summarize, PropertySummary};
use geoexplorer_core::ExplorerError;
use proptest::prelude::*;
use serde_json::{json, Value};

fn point(x: f64, y: f64) -> Value {
    json!({"type": "Point", "coordinates": [x, y]})
}

fn feature(geometry: Value, properties: Value) -> Value {
    json!({"type": "Feature", "geometry": geometry, "properties": properties})
}

#[test]
fn test_feature_count_matches_input() {
    let collection = json!({
        "type": "FeatureCollection",
        "features": [feature(point(0.0, 0.0), json!({})), feature(point(1.0, 1.0), json!({}))]
    });
    assert_eq!(normalize(collection).unwrap().features.len(), 2);

    let geometries = json!({
        "type": "GeometryCollection",
        "geometries": [point(0.0, 0.0), point(1.0, 1.0), point(2.0, 2.0), point(3.0, 3.0)]
    });
    assert_eq!(normalize(geometries).unwrap().features.len(), 4);

    assert_eq!(normalize(feature(point(0.0, 0.0), json!({}))).unwrap().features.len(), 1);
    assert_eq!(normalize(point(0.0, 0.0)).unwrap().features.len(), 1);
}

#[test]
fn test_unsupported_input_fails_loudly() {
    let err = normalize(json!({"type": "Topology", "objects": {}})).unwrap_err();
    assert!(err.is_invalid_input());
    assert!(matches!(err, ExplorerError::InvalidGeometryType { ref kind } if kind == "Topology"));
}

#[test]
fn test_categorical_summary() {
    let input = json!({
        "type": "FeatureCollection",
        "features": [
            feature(point(0.0, 0.0), json!({"a": "x"})),
            feature(point(0.0, 0.0), json!({"a": "y"})),
            feature(point(0.0, 0.0), json!({"a": "x"}))
        ]
    });

    let summary = summarize(input).unwrap();
    let a = &summary.properties["a"];
    assert_eq!(a.count, 3);
    let values = a.values.as_ref().unwrap();
    assert_eq!(values.len(), 2);
    assert_eq!(values["x"], 2);
    assert_eq!(values["y"], 1);
}

#[test]
fn test_summary_drives_color_scale() {
    let input = json!({
        "type": "FeatureCollection",
        "features": [
            feature(point(0.0, 0.0), json!({"height": 3.0, "class": "roof"})),
            feature(point(0.0, 0.0), json!({"height": 3.0, "class": "road"}))
        ]
    });
    let summary = summarize(input).unwrap();

    let height = color_scale("Blues", &summary.properties["height"], &ScaleOptions::default());
    let (lo, hi) = height.domain().unwrap();
    assert!(hi - lo >= 1.0);

    let class = color_scale("Set2", &summary.properties["class"], &ScaleOptions::default());
    assert_ne!(class.color_for_text("roof"), class.color_for_text("road"));
}

proptest! {
    #[test]
    fn prop_degenerate_domain_never_zero_width(n in -1_000_000i64..1_000_000, clamp in any::<bool>()) {
        let x = n as f64 / 4.0;
        let mut summary = PropertySummary::default();
        summary.merge_number(x);
        summary.merge_number(x);

        let options = ScaleOptions {
            clamp: clamp.then_some((x, x)),
            ..Default::default()
        };
        let scale = color_scale("Reds", &summary, &options);
        let (lo, hi) = scale.domain().unwrap();
        prop_assert!(hi - lo >= 1.0);
        prop_assert!(scale.color_for_number(x).is_some());
    }
}
