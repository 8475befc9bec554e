use geoexplorer_core::color::Scheme;
use geoexplorer_core::config::ConfigSource;
use geoexplorer_core::geo::point_on_surface;
use geoexplorer_core::models::{Condition, Dataset, Filter};
use geoexplorer_core::summary::PropertySummary;
use geoexplorer_state::FlatWorkingSet;
use serde::Serialize;
use tabled::Tabled;

/// One row of the property table of `summarize`
#[derive(Debug, Serialize, Tabled)]
pub struct PropertyRow {
    #[tabled(rename = "Property")]
    pub property: String,
    #[tabled(rename = "Count")]
    pub count: usize,
    #[tabled(rename = "Kind")]
    pub kind: &'static str,
    #[tabled(rename = "Distinct")]
    pub distinct: usize,
    #[tabled(rename = "Min")]
    pub min: String,
    #[tabled(rename = "Max")]
    pub max: String,
    #[tabled(rename = "Mean")]
    pub mean: String,
}

impl PropertyRow {
    pub fn new(property: &str, summary: &PropertySummary) -> Self {
        let kind = match (summary.is_categorical(), summary.n_finite > 0) {
            (true, true) => "mixed",
            (true, false) => "categorical",
            (false, true) => "numeric",
            (false, false) => "other",
        };
        Self {
            property: property.to_string(),
            count: summary.count,
            kind,
            distinct: summary.distinct_values(),
            min: number(summary.min),
            max: number(summary.max),
            mean: number(summary.mean()),
        }
    }
}

/// Output for color-scale command
#[derive(Debug, Serialize)]
pub struct ColorScaleOutput {
    pub property: String,
    pub scheme: String,
    pub domain: Option<(f64, f64)>,
    pub range: Vec<&'static str>,
    pub colored: usize,
    pub features: usize,
    pub output: Option<String>,
}

#[derive(Debug, Serialize, Tabled)]
pub struct SchemeRow {
    #[tabled(rename = "Scheme")]
    pub name: &'static str,
    #[tabled(rename = "Category")]
    pub category: &'static str,
    #[tabled(rename = "Sizes")]
    pub sizes: String,
}

impl From<&Scheme> for SchemeRow {
    fn from(scheme: &Scheme) -> Self {
        let sizes = scheme.sizes();
        let sizes = match (sizes.first(), sizes.last()) {
            (Some(first), Some(last)) => format!("{}-{}", first, last),
            _ => String::new(),
        };
        Self { name: scheme.name, category: scheme.category.name(), sizes }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct DatasetRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    /// A point inside the dataset bounds, `lon, lat`
    #[tabled(rename = "Location")]
    pub location: String,
}

impl From<&Dataset> for DatasetRow {
    fn from(dataset: &Dataset) -> Self {
        let location = dataset
            .bounds()
            .and_then(point_on_surface)
            .map(|point| format!("{:.5}, {:.5}", point.x(), point.y()))
            .unwrap_or_else(|| "-".to_string());
        Self { id: dataset.id.to_string(), name: dataset.name.clone(), location }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct WorkingSetRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Level")]
    pub level: usize,
    #[tabled(rename = "Datasets")]
    pub datasets: usize,
}

impl WorkingSetRow {
    /// Names are indented by level when rendered as a table
    pub fn new(entry: &FlatWorkingSet<'_>, indent: bool) -> Self {
        let name = if indent {
            format!("{}{}", "  ".repeat(entry.level), entry.working_set.name)
        } else {
            entry.working_set.name.clone()
        };
        Self {
            name,
            id: entry.working_set.id.as_ref().map(ToString::to_string).unwrap_or_default(),
            level: entry.level,
            datasets: entry.working_set.dataset_ids.len(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct FilterRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Conditions")]
    pub conditions: usize,
}

impl From<&Filter> for FilterRow {
    fn from(filter: &Filter) -> Self {
        Self {
            id: filter.id.as_ref().map(ToString::to_string).unwrap_or_default(),
            name: filter.name.clone(),
            conditions: filter.conditions.len(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct ConditionRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Type")]
    pub kind: String,
    #[tabled(rename = "Detail")]
    pub detail: String,
}

impl ConditionRow {
    pub fn new(index: usize, condition: &Condition) -> Self {
        let detail = match condition.region_feature() {
            Some(feature) => feature
                .geometry
                .as_ref()
                .map(|geometry| geometry_name(&geometry.value).to_string())
                .unwrap_or_else(|| "no geometry".to_string()),
            None => serde_json::to_string(condition).unwrap_or_default(),
        };
        Self { index, kind: condition.kind().to_string(), detail }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

impl ConfigRow {
    pub fn new(key: String, value: String, source: ConfigSource) -> Self {
        Self { key, value, source: format!("{:?}", source) }
    }
}

fn geometry_name(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn number(value: Option<f64>) -> String {
    value.map(|x| format!("{}", x)).unwrap_or_else(|| "-".to_string())
}
