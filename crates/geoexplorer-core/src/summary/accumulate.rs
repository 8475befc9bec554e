//! Per-property statistics over feature properties

use geojson::JsonObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Property keys that only carry styling and are left out of summaries.
/// Kept sorted for binary search.
pub const STYLE_ONLY_PROPERTIES: [&str; 15] = [
    "cluster",
    "clusterDistance",
    "clusterFillColor",
    "clusterRadius",
    "clusterStrokeColor",
    "fill",
    "fillColor",
    "fillColorKey",
    "fillOpacity",
    "radius",
    "stroke",
    "strokeColor",
    "strokeColorKey",
    "strokeOpacity",
    "strokeWidth",
];

pub fn is_style_only(key: &str) -> bool {
    STYLE_ONLY_PROPERTIES.binary_search(&key).is_ok()
}

/// Accumulated statistics for one property key.
///
/// Text values feed the categorical `values` histogram and finite numbers
/// feed the numeric aggregates. A key holding both kinds updates both
/// sides independently; nothing reconciles them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySummary {
    /// Every value seen, whatever its type
    pub count: usize,

    /// Occurrences per distinct text value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<BTreeMap<String, usize>>,

    #[serde(default)]
    pub n_finite: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default)]
    pub sum: f64,

    #[serde(default)]
    pub sumsq: f64,
}

impl PropertySummary {
    /// Merge one JSON property value
    pub fn merge(&mut self, value: &Value) {
        match value {
            Value::String(text) => self.merge_text(text),
            Value::Number(number) => match number.as_f64() {
                Some(x) => self.merge_number(x),
                None => self.count += 1,
            },
            _ => self.count += 1,
        }
    }

    pub fn merge_text(&mut self, text: &str) {
        self.count += 1;
        *self.values.get_or_insert_with(BTreeMap::new).entry(text.to_string()).or_insert(0) += 1;
    }

    /// Non-finite numbers are counted but do not touch the aggregates
    pub fn merge_number(&mut self, x: f64) {
        self.count += 1;
        if !x.is_finite() {
            return;
        }
        self.n_finite += 1;
        self.min = Some(self.min.map_or(x, |m| m.min(x)));
        self.max = Some(self.max.map_or(x, |m| m.max(x)));
        self.sum += x;
        self.sumsq += x * x;
    }

    pub fn is_categorical(&self) -> bool {
        self.values.is_some()
    }

    pub fn distinct_values(&self) -> usize {
        self.values.as_ref().map_or(0, BTreeMap::len)
    }

    pub fn mean(&self) -> Option<f64> {
        (self.n_finite > 0).then(|| self.sum / self.n_finite as f64)
    }

    /// Population variance of the finite values
    pub fn variance(&self) -> Option<f64> {
        let mean = self.mean()?;
        Some((self.sumsq / self.n_finite as f64 - mean * mean).max(0.0))
    }
}

/// Accumulate property objects into per-key summaries, skipping
/// [`STYLE_ONLY_PROPERTIES`]
pub fn accumulate<'a, I>(properties: I) -> BTreeMap<String, PropertySummary>
where
    I: IntoIterator<Item = &'a JsonObject>,
{
    let mut accumulated: BTreeMap<String, PropertySummary> = BTreeMap::new();

    for object in properties {
        for (key, value) in object {
            if is_style_only(key) {
                continue;
            }
            accumulated.entry(key.clone()).or_default().merge(value);
        }
    }

    accumulated
}
