//! Writing visualization properties into features

use geojson::{FeatureCollection, JsonObject};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::GeometryClass;
use crate::color::ColorScale;

/// Style properties written into every feature of one geometry class
pub type StyleRules = JsonObject;

/// Style rules per geometry class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisProperties {
    pub point: StyleRules,
    pub line: StyleRules,
    pub polygon: StyleRules,
}

impl VisProperties {
    pub fn rules(&self, class: GeometryClass) -> &StyleRules {
        match class {
            GeometryClass::Point => &self.point,
            GeometryClass::Line => &self.line,
            GeometryClass::Polygon => &self.polygon,
        }
    }
}

fn rules(value: Value) -> StyleRules {
    match value {
        Value::Object(map) => map,
        _ => StyleRules::new(),
    }
}

impl Default for VisProperties {
    fn default() -> Self {
        Self {
            point: rules(json!({
                "radius": 8,
                "stroke": true,
                "strokeColor": "#999999",
                "strokeWidth": 2,
                "strokeOpacity": 1,
                "fill": true,
                "fillColor": "#BEE37B",
                "fillOpacity": 0.75
            })),
            line: rules(json!({
                "stroke": true,
                "strokeColor": "#999999",
                "strokeWidth": 2,
                "strokeOpacity": 1
            })),
            polygon: rules(json!({
                "stroke": true,
                "strokeColor": "#999999",
                "strokeWidth": 1,
                "strokeOpacity": 1,
                "fill": true,
                "fillColor": "#BEE37B",
                "fillOpacity": 0.75
            })),
        }
    }
}

/// Append the style properties for each feature's geometry class. Features
/// without a classifiable geometry are left as they are.
pub fn style(collection: &mut FeatureCollection, vis: &VisProperties) {
    for feature in &mut collection.features {
        let Some(class) = feature.geometry.as_ref().and_then(|g| GeometryClass::of(&g.value)) else {
            continue;
        };
        let properties = feature.properties.get_or_insert_with(JsonObject::new);
        for (key, value) in vis.rules(class) {
            properties.insert(key.clone(), value.clone());
        }
    }
}

/// Color every feature by one property through a color scale, writing the
/// color under `target` (e.g. `fillColor`). Returns how many features were
/// colored.
pub fn apply_color_scale(
    collection: &mut FeatureCollection,
    property: &str,
    scale: &ColorScale,
    target: &str,
) -> usize {
    let mut colored = 0;
    for feature in &mut collection.features {
        let Some(properties) = feature.properties.as_mut() else {
            continue;
        };
        let Some(color) = properties.get(property).and_then(|v| scale.color(v)) else {
            continue;
        };
        properties.insert(target.to_string(), Value::String(color.to_string()));
        colored += 1;
    }
    colored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{color_scale, ScaleOptions};
    use crate::summary::{normalize, summarize_collection};

    fn collection() -> FeatureCollection {
        normalize(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}, "properties": {"height": 1}},
                {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}, "properties": null},
                {"type": "Feature", "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]}, "properties": {"height": 9}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_style_by_geometry_class() {
        let mut fc = collection();
        style(&mut fc, &VisProperties::default());

        let point = fc.features[0].properties.as_ref().unwrap();
        assert_eq!(point["radius"], 8);
        let line = fc.features[1].properties.as_ref().unwrap();
        assert!(line.get("fillColor").is_none());
        assert_eq!(line["strokeWidth"], 2);
        let polygon = fc.features[2].properties.as_ref().unwrap();
        assert_eq!(polygon["strokeWidth"], 1);
    }

    #[test]
    fn test_styled_properties_do_not_change_summary() {
        let mut fc = collection();
        let before = summarize_collection(&fc);
        style(&mut fc, &VisProperties::default());
        assert_eq!(summarize_collection(&fc).properties, before.properties);
    }

    #[test]
    fn test_apply_color_scale() {
        let mut fc = collection();
        let summary = summarize_collection(&fc);
        let scale = color_scale("Blues", &summary.properties["height"], &ScaleOptions::default());

        let colored = apply_color_scale(&mut fc, "height", &scale, "fillColor");
        assert_eq!(colored, 2);

        let low = &fc.features[0].properties.as_ref().unwrap()["fillColor"];
        let high = &fc.features[2].properties.as_ref().unwrap()["fillColor"];
        assert_eq!(low, scale.range()[0]);
        assert_eq!(high, scale.range()[8]);
    }
}
