//! Geo module for spatial operations on dataset footprints

pub mod spatial;

pub use spatial::{
    geometries_intersect, point_on_surface, point_on_surface_geojson, to_geo_geometry,
};
