//! Normalization of arbitrary GeoJSON input into a FeatureCollection

use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, Value as GeometryValue};
use serde_json::Value;

use crate::error::{ExplorerError, Result};

/// GeoJSON `type` values accepted by [`normalize`]
pub const SUPPORTED_TYPES: [&str; 9] = [
    "FeatureCollection",
    "Feature",
    "GeometryCollection",
    "Point",
    "LineString",
    "Polygon",
    "MultiPoint",
    "MultiLineString",
    "MultiPolygon",
];

/// Normalize a GeoJSON document into a FeatureCollection.
///
/// Bare geometries become features with empty properties, a
/// GeometryCollection becomes one feature per member geometry, a single
/// Feature is wrapped and a FeatureCollection is returned as is.
///
/// # Errors
/// `InvalidGeometryType` when the root `type` is missing or not one of
/// [`SUPPORTED_TYPES`]; `InvalidInput` when the document is otherwise
/// malformed.
pub fn normalize(input: Value) -> Result<FeatureCollection> {
    let kind = match input.get("type") {
        Some(Value::String(kind)) => kind.as_str(),
        Some(other) => {
            return Err(ExplorerError::InvalidGeometryType { kind: other.to_string() });
        }
        None => {
            return Err(ExplorerError::InvalidGeometryType { kind: "<missing>".to_string() });
        }
    };

    if !SUPPORTED_TYPES.contains(&kind) {
        return Err(ExplorerError::InvalidGeometryType { kind: kind.to_string() });
    }

    let geojson = GeoJson::from_json_value(input).map_err(|e| ExplorerError::InvalidInput {
        reason: format!("Failed to parse GeoJSON: {}", e),
    })?;

    Ok(normalize_geojson(geojson))
}

/// Normalize already parsed GeoJSON
pub fn normalize_geojson(geojson: GeoJson) -> FeatureCollection {
    match geojson {
        GeoJson::FeatureCollection(collection) => collection,
        GeoJson::Feature(feature) => collection_of(vec![feature]),
        GeoJson::Geometry(geometry) => match geometry.value {
            GeometryValue::GeometryCollection(members) => {
                collection_of(members.into_iter().map(bare_feature).collect())
            }
            _ => collection_of(vec![bare_feature(geometry)]),
        },
    }
}

fn collection_of(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection { bbox: None, features, foreign_members: None }
}

fn bare_feature(geometry: geojson::Geometry) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(JsonObject::new()),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feature_collection_passthrough() {
        let input = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}, "properties": {"a": 1}},
                {"type": "Feature", "geometry": null, "properties": null}
            ]
        });

        let collection = normalize(input).unwrap();
        assert_eq!(collection.features.len(), 2);
        assert_eq!(collection.features[0].properties.as_ref().unwrap()["a"], 1);
    }

    #[test]
    fn test_feature_wrapped() {
        let input = json!({
            "type": "Feature",
            "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]},
            "properties": {"name": "road"}
        });

        let collection = normalize(input).unwrap();
        assert_eq!(collection.features.len(), 1);
    }

    #[test]
    fn test_geometry_collection_split() {
        let input = json!({
            "type": "GeometryCollection",
            "geometries": [
                {"type": "Point", "coordinates": [0.0, 0.0]},
                {"type": "Point", "coordinates": [1.0, 1.0]},
                {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}
            ]
        });

        let collection = normalize(input).unwrap();
        assert_eq!(collection.features.len(), 3);
        for feature in &collection.features {
            assert!(feature.geometry.is_some());
            assert!(feature.properties.as_ref().unwrap().is_empty());
        }
    }

    #[test]
    fn test_bare_geometries_wrapped() {
        let inputs = [
            json!({"type": "Point", "coordinates": [0.0, 0.0]}),
            json!({"type": "MultiPoint", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}),
            json!({"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}),
            json!({"type": "MultiLineString", "coordinates": [[[0.0, 0.0], [1.0, 1.0]]]}),
            json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]}),
            json!({"type": "MultiPolygon", "coordinates": [[[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]]}),
        ];

        for input in inputs {
            let collection = normalize(input).unwrap();
            assert_eq!(collection.features.len(), 1);
        }
    }

    #[test]
    fn test_unsupported_type_rejected() {
        for input in [json!({"type": "Topology"}), json!({"type": 4}), json!({"coordinates": []})] {
            let err = normalize(input).unwrap_err();
            assert!(matches!(err, ExplorerError::InvalidGeometryType { .. }));
            assert!(err.is_invalid_input());
        }
    }

    #[test]
    fn test_malformed_supported_type_rejected() {
        let err = normalize(json!({"type": "Point"})).unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidInput { .. }));
    }
}
