use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Backend identifier of a dataset item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(pub String);

impl DatasetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DatasetId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Geospatial metadata attached to a dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometa {
    /// Footprint of the dataset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<geojson::Geometry>,

    /// Any other geometa fields the backend reports
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A dataset as cached from the backend. Read-only on the client side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(rename = "_id")]
    pub id: DatasetId,

    pub name: String,

    #[serde(default)]
    pub geometa: Geometa,

    #[serde(default)]
    pub meta: Map<String, Value>,
}

impl Dataset {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: DatasetId::new(id),
            name: name.into(),
            geometa: Geometa::default(),
            meta: Map::new(),
        }
    }

    pub fn with_bounds(mut self, bounds: geojson::Geometry) -> Self {
        self.geometa.bounds = Some(bounds);
        self
    }

    pub fn bounds(&self) -> Option<&geojson::Geometry> {
        self.geometa.bounds.as_ref()
    }
}
