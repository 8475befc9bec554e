use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Backend identifier of a saved filter
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterId(pub String);

impl FilterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One spatial or temporal predicate of a filter.
///
/// On the wire a condition is an object tagged by `type`. Tags other than
/// `region` and `daterange`, and date ranges whose bounds are not RFC 3339
/// timestamps, are kept verbatim so a load/save cycle does not drop them.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Spatial predicate: datasets whose bounds intersect the feature
    Region { geojson: geojson::Feature },

    /// Temporal predicate over the acquisition time
    DateRange { start: DateTime<Utc>, end: DateTime<Utc> },

    /// A condition type this client does not interpret
    Other { kind: String, fields: Map<String, Value> },
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
enum TaggedCondition {
    #[serde(rename = "region")]
    Region { geojson: geojson::Feature },
    #[serde(rename = "daterange")]
    DateRange { start: DateTime<Utc>, end: DateTime<Utc> },
}

impl From<TaggedCondition> for Condition {
    fn from(tagged: TaggedCondition) -> Self {
        match tagged {
            TaggedCondition::Region { geojson } => Condition::Region { geojson },
            TaggedCondition::DateRange { start, end } => Condition::DateRange { start, end },
        }
    }
}

impl Condition {
    pub fn region(geojson: geojson::Feature) -> Self {
        Condition::Region { geojson }
    }

    pub fn date_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Condition::DateRange { start, end }
    }

    /// The wire `type` tag
    pub fn kind(&self) -> &str {
        match self {
            Condition::Region { .. } => "region",
            Condition::DateRange { .. } => "daterange",
            Condition::Other { kind, .. } => kind,
        }
    }

    pub fn is_region(&self) -> bool {
        matches!(self, Condition::Region { .. })
    }

    /// The region feature, if this is a region condition
    pub fn region_feature(&self) -> Option<&geojson::Feature> {
        match self {
            Condition::Region { geojson } => Some(geojson),
            _ => None,
        }
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Condition::Region { geojson } => {
                TaggedCondition::Region { geojson: geojson.clone() }.serialize(serializer)
            }
            Condition::DateRange { start, end } => {
                TaggedCondition::DateRange { start: *start, end: *end }.serialize(serializer)
            }
            Condition::Other { kind, fields } => {
                let mut object = fields.clone();
                object.insert("type".to_string(), Value::String(kind.clone()));
                object.serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut object = Map::<String, Value>::deserialize(deserializer)?;
        let kind = match object.get("type") {
            Some(Value::String(kind)) => kind.clone(),
            Some(_) => return Err(D::Error::custom("condition `type` must be a string")),
            None => return Err(D::Error::missing_field("type")),
        };

        match kind.as_str() {
            "region" => {
                let tagged: TaggedCondition =
                    serde_json::from_value(Value::Object(object)).map_err(D::Error::custom)?;
                Ok(tagged.into())
            }
            "daterange" => match serde_json::from_value::<TaggedCondition>(Value::Object(object.clone())) {
                Ok(tagged) => Ok(tagged.into()),
                Err(e) => {
                    // Timestamps this client cannot read stay opaque
                    tracing::warn!(error = %e, "Keeping unreadable date range condition as is");
                    object.remove("type");
                    Ok(Condition::Other { kind, fields: object })
                }
            },
            _ => {
                object.remove("type");
                Ok(Condition::Other { kind, fields: object })
            }
        }
    }
}

/// A set of conditions used to select datasets. Transient until the
/// backend assigns an id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FilterId>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Filter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: None, name: name.into(), conditions: Vec::new() }
    }

    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn region_json() -> Value {
        json!({
            "type": "region",
            "geojson": {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
                "properties": {}
            }
        })
    }

    #[test]
    fn test_region_condition_wire_format() {
        let condition: Condition = serde_json::from_value(region_json()).unwrap();
        assert!(condition.is_region());
        assert_eq!(condition.kind(), "region");

        let back = serde_json::to_value(&condition).unwrap();
        assert_eq!(back["type"], "region");
        assert_eq!(back["geojson"]["geometry"]["type"], "Point");
    }

    #[test]
    fn test_daterange_condition() {
        let condition: Condition = serde_json::from_value(json!({
            "type": "daterange",
            "start": "2016-01-01T00:00:00Z",
            "end": "2016-12-31T00:00:00Z"
        }))
        .unwrap();

        match condition {
            Condition::DateRange { start, end } => assert!(start < end),
            other => panic!("unexpected condition {:?}", other),
        }
    }

    #[test]
    fn test_unknown_condition_kept_verbatim() {
        let value = json!({"type": "cloudcover", "max": 20});
        let condition: Condition = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(condition.kind(), "cloudcover");
        assert!(condition.region_feature().is_none());
        assert_eq!(serde_json::to_value(&condition).unwrap(), value);
    }

    #[test]
    fn test_date_only_range_kept_verbatim() {
        let value = json!({"type": "daterange", "start": "2016-01-01", "end": "2016-12-31"});
        let condition: Condition = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(condition.kind(), "daterange");
        assert!(matches!(condition, Condition::Other { .. }));
        assert_eq!(serde_json::to_value(&condition).unwrap(), value);
    }

    #[test]
    fn test_filter_survives_unreadable_date_range() {
        let text = json!({
            "_id": "f2",
            "name": "2016 scenes",
            "conditions": [
                region_json(),
                {"type": "daterange", "start": "2016-01-01", "end": "2016-12-31"}
            ]
        })
        .to_string();
        let filter: Filter = serde_json::from_str(&text).unwrap();

        assert_eq!(filter.conditions.len(), 2);
        assert!(filter.conditions[0].is_region());
        assert_eq!(filter.conditions[1].kind(), "daterange");
    }

    #[test]
    fn test_malformed_region_rejected() {
        let value = json!({"type": "region", "geojson": "not a feature"});
        assert!(serde_json::from_value::<Condition>(value).is_err());
    }

    #[test]
    fn test_condition_without_type_rejected() {
        assert!(serde_json::from_value::<Condition>(json!({"max": 1})).is_err());
    }

    #[test]
    fn test_filter_from_backend() {
        let filter: Filter = serde_json::from_value(json!({
            "_id": "f1",
            "name": "Area of interest",
            "conditions": [region_json()]
        }))
        .unwrap();

        assert!(filter.is_saved());
        assert_eq!(filter.conditions.len(), 1);

        let unsaved = Filter::new("draft");
        let value = serde_json::to_value(&unsaved).unwrap();
        assert!(value.get("_id").is_none());
    }
}
