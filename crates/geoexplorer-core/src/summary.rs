//! GeoJSON summarizer
//!
//! Normalizes GeoJSON input into a FeatureCollection and derives the
//! statistics used to build color scales for rendering.

pub mod accumulate;
pub mod normalize;
pub mod style;

use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::Result;

pub use accumulate::{accumulate, is_style_only, PropertySummary, STYLE_ONLY_PROPERTIES};
pub use normalize::{normalize, normalize_geojson, SUPPORTED_TYPES};
pub use style::{apply_color_scale, style, StyleRules, VisProperties};

/// Coarse geometry class used for styling and summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryClass {
    Point,
    Line,
    Polygon,
}

impl GeometryClass {
    /// Classify a geometry value. Collections have no class.
    pub fn of(value: &geojson::Value) -> Option<Self> {
        match value {
            geojson::Value::Point(_) | geojson::Value::MultiPoint(_) => Some(GeometryClass::Point),
            geojson::Value::LineString(_) | geojson::Value::MultiLineString(_) => {
                Some(GeometryClass::Line)
            }
            geojson::Value::Polygon(_) | geojson::Value::MultiPolygon(_) => {
                Some(GeometryClass::Polygon)
            }
            geojson::Value::GeometryCollection(_) => None,
        }
    }
}

/// Which geometry classes occur in a collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryTypes {
    pub point_alike: bool,
    pub line_alike: bool,
    pub polygon_alike: bool,
}

/// Derived statistics over a feature set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub types: GeometryTypes,
    pub properties: BTreeMap<String, PropertySummary>,
}

/// Normalize then summarize a GeoJSON document
pub fn summarize(input: Value) -> Result<Summary> {
    let collection = normalize(input)?;
    Ok(summarize_collection(&collection))
}

/// Summarize an already normalized collection
pub fn summarize_collection(collection: &FeatureCollection) -> Summary {
    let mut types = GeometryTypes::default();
    for feature in &collection.features {
        match feature.geometry.as_ref().and_then(|g| GeometryClass::of(&g.value)) {
            Some(GeometryClass::Point) => types.point_alike = true,
            Some(GeometryClass::Line) => types.line_alike = true,
            Some(GeometryClass::Polygon) => types.polygon_alike = true,
            None => {}
        }
    }

    let properties = accumulate(collection.features.iter().filter_map(|f| f.properties.as_ref()));

    tracing::debug!(
        features = collection.features.len(),
        properties = properties.len(),
        "Summarized feature collection"
    );

    Summary { types, properties }
}
