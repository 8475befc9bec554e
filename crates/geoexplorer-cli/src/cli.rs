use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// geoexplorer - Explore geospatial datasets from the command line
#[derive(Parser, Debug)]
#[command(name = "geoexplorer")]
#[command(about = "Explore geospatial datasets, working sets and filters", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the backend REST API
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize the geometry types and properties of a GeoJSON document
    Summarize(SummarizeArgs),

    /// Color features by a property using a ColorBrewer scheme
    ColorScale(ColorScaleArgs),

    /// List the available ColorBrewer schemes
    Schemes,

    /// Browse datasets on the backend
    #[command(subcommand)]
    Datasets(DatasetsCommand),

    /// Manage working sets on the backend
    #[command(subcommand)]
    WorkingSets(WorkingSetsCommand),

    /// Browse saved filters on the backend
    #[command(subcommand)]
    Filters(FiltersCommand),

    /// Print notifications pushed by the backend until interrupted
    Watch(WatchArgs),

    /// Show the effective configuration and where each value comes from
    Config,
}

/// Where GeoJSON input comes from
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct GeoJsonSource {
    /// GeoJSON file on disk
    pub file: Option<PathBuf>,

    /// Download the data of a backend dataset instead
    #[arg(long)]
    pub dataset: Option<String>,
}

#[derive(Parser, Debug)]
pub struct SummarizeArgs {
    #[command(flatten)]
    pub source: GeoJsonSource,
}

#[derive(Parser, Debug)]
pub struct ColorScaleArgs {
    #[command(flatten)]
    pub source: GeoJsonSource,

    /// Property to color by
    #[arg(short, long)]
    pub property: String,

    /// Scheme name, e.g. Blues or colorbrewer.sequential.Blues_9
    #[arg(short, long, default_value = "YlGnBu")]
    pub scheme: String,

    /// Quantize in log space
    #[arg(long)]
    pub log: bool,

    /// Use a quantile scale over the property values
    #[arg(long, conflicts_with = "log")]
    pub quantile: bool,

    /// Replace the property range with MIN,MAX
    #[arg(long, value_delimiter = ',', value_name = "MIN,MAX", allow_negative_numbers = true)]
    pub clamp: Option<Vec<f64>>,

    /// Feature property receiving the color
    #[arg(long, default_value = "fillColor")]
    pub target: String,

    /// Write the colored FeatureCollection to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum DatasetsCommand {
    /// List every dataset
    List,

    /// Show one dataset
    Get { id: String },

    /// Load several datasets by id, skipping ids that fail
    Ids {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Datasets intersecting every region read from GeoJSON files
    Search {
        /// GeoJSON file holding a region (Feature, Geometry or FeatureCollection)
        #[arg(long = "region")]
        regions: Vec<PathBuf>,
    },

    /// Datasets of a working set
    WorkingSet { id: String },

    /// Metadata of a dataset's item
    Metadata { id: String },

    /// Tile metadata of a large image dataset
    Tiles { id: String },
}

#[derive(Subcommand, Debug)]
pub enum WorkingSetsCommand {
    /// List working sets as an indented tree
    List,

    /// Create an empty working set
    Add {
        name: String,

        /// Nest the new working set under this one
        #[arg(long)]
        parent: Option<String>,
    },

    /// Delete a working set
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum FiltersCommand {
    /// List saved filters
    List,

    /// Show a filter's conditions
    Show { id: String },
}

#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Only print events of these types
    #[arg(long = "type")]
    pub kinds: Vec<String>,
}
