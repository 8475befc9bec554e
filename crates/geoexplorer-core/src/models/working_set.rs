use serde::{Deserialize, Serialize};
use std::fmt;

use super::{DatasetId, FilterId};

/// Backend identifier of a working set
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkingSetId(pub String);

impl WorkingSetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkingSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named collection of datasets, optionally nested under a parent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingSet {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<WorkingSetId>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_id: Option<FilterId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_working_set_id: Option<WorkingSetId>,

    #[serde(default)]
    pub dataset_ids: Vec<DatasetId>,
}

impl WorkingSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn with_parent(mut self, parent: WorkingSetId) -> Self {
        self.parent_working_set_id = Some(parent);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_working_set_camel_case_wire_format() {
        let ws: WorkingSet = serde_json::from_value(json!({
            "_id": "w2",
            "name": "Buildings",
            "filterId": "f1",
            "parentWorkingSetId": "w1",
            "datasetIds": ["d1", "d2"]
        }))
        .unwrap();

        assert_eq!(ws.id, Some(WorkingSetId::new("w2")));
        assert_eq!(ws.parent_working_set_id, Some(WorkingSetId::new("w1")));
        assert_eq!(ws.dataset_ids.len(), 2);

        let value = serde_json::to_value(WorkingSet::new("fresh")).unwrap();
        assert_eq!(value, json!({"name": "fresh", "datasetIds": []}));
    }
}
