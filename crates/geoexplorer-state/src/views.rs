//! GeoJSON views derived from filter and working set state

use geoexplorer_core::geo::{point_on_surface, point_on_surface_geojson};
use geoexplorer_core::models::{Condition, Dataset};
use geojson::{Feature, FeatureCollection, JsonObject};
use serde_json::Value;
use std::sync::Arc;

/// Region conditions as a FeatureCollection.
///
/// `excluded`, when set, is left out; it is compared by value so a clone
/// of a listed condition also matches.
pub fn conditions_geojson(conditions: &[Condition], excluded: Option<&Condition>) -> FeatureCollection {
    let features = conditions
        .iter()
        .filter(|condition| excluded != Some(*condition))
        .filter_map(Condition::region_feature)
        .cloned()
        .collect();

    FeatureCollection { bbox: None, features, foreign_members: None }
}

/// The selected condition's feature, if it is a region
pub fn selected_condition_geojson(selected: Option<&Condition>) -> Option<&Feature> {
    selected.and_then(Condition::region_feature)
}

/// A point guaranteed to lie on the dataset's bounds
pub fn dataset_point(dataset: &Dataset) -> Option<geojson::Geometry> {
    dataset.bounds().and_then(point_on_surface_geojson)
}

/// One `[x, y]` position per dataset with usable bounds
pub fn heatmap_points(datasets: &[Arc<Dataset>]) -> Vec<[f64; 2]> {
    datasets
        .iter()
        .filter_map(|dataset| dataset.bounds())
        .filter_map(point_on_surface)
        .map(|point| [point.x(), point.y()])
        .collect()
}

/// Dataset footprints as features carrying `id` and `name`.
/// Datasets without bounds are skipped.
pub fn datasets_geojson(datasets: &[Arc<Dataset>]) -> FeatureCollection {
    let features = datasets
        .iter()
        .filter_map(|dataset| {
            let bounds = dataset.bounds()?;
            let mut properties = JsonObject::new();
            properties.insert("id".to_string(), Value::String(dataset.id.to_string()));
            properties.insert("name".to_string(), Value::String(dataset.name.clone()));
            Some(Feature {
                bbox: None,
                geometry: Some(bounds.clone()),
                id: Some(geojson::feature::Id::String(dataset.id.to_string())),
                properties: Some(properties),
                foreign_members: None,
            })
        })
        .collect();

    FeatureCollection { bbox: None, features, foreign_members: None }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::{TimeZone, Utc};

    pub fn square(x0: f64, y0: f64, size: f64) -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::Polygon(vec![vec![
            vec![x0, y0],
            vec![x0 + size, y0],
            vec![x0 + size, y0 + size],
            vec![x0, y0 + size],
            vec![x0, y0],
        ]]))
    }

    pub fn region(x0: f64, y0: f64) -> Condition {
        Condition::region(Feature {
            bbox: None,
            geometry: Some(square(x0, y0, 1.0)),
            id: None,
            properties: None,
            foreign_members: None,
        })
    }

    pub fn date_range() -> Condition {
        Condition::date_range(
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2020, 12, 31, 0, 0, 0).unwrap(),
        )
    }

    pub fn dataset(id: &str, x0: f64, y0: f64) -> Arc<Dataset> {
        Arc::new(Dataset::new(id, format!("Dataset {}", id)).with_bounds(square(x0, y0, 2.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_only_regions_become_features() {
        let conditions = vec![region(0.0, 0.0), date_range(), region(5.0, 5.0)];
        let collection = conditions_geojson(&conditions, None);
        assert_eq!(collection.features.len(), 2);
    }

    #[test]
    fn test_excluded_condition_left_out() {
        let conditions = vec![region(0.0, 0.0), region(5.0, 5.0)];
        let selected = region(5.0, 5.0);

        let collection = conditions_geojson(&conditions, Some(&selected));

        assert_eq!(collection.features.len(), 1);
        assert_eq!(collection.features[0], *conditions[0].region_feature().unwrap());
    }

    #[test]
    fn test_selected_condition_geojson() {
        let selected = region(1.0, 1.0);
        assert!(selected_condition_geojson(Some(&selected)).is_some());
        assert!(selected_condition_geojson(Some(&date_range())).is_none());
        assert!(selected_condition_geojson(None).is_none());
    }

    #[test]
    fn test_heatmap_points_lie_in_bounds() {
        let datasets = vec![dataset("a", 0.0, 0.0), Arc::new(Dataset::new("b", "No bounds"))];
        let points = heatmap_points(&datasets);

        assert_eq!(points.len(), 1);
        let [x, y] = points[0];
        assert!((0.0..=2.0).contains(&x));
        assert!((0.0..=2.0).contains(&y));
    }

    #[test]
    fn test_datasets_geojson_properties() {
        let collection = datasets_geojson(&[dataset("a", 0.0, 0.0)]);
        let properties = collection.features[0].properties.as_ref().unwrap();
        assert_eq!(properties["id"], "a");
        assert_eq!(properties["name"], "Dataset a");
    }
}
