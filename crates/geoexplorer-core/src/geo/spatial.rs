use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::interior_point::InteriorPoint;
use geo::algorithm::intersects::Intersects;
use geo::{Geometry as GeoGeometry, Point, Rect};

/// Convert a GeoJSON geometry into a `geo` geometry
pub fn to_geo_geometry(geometry: &geojson::Geometry) -> Option<GeoGeometry<f64>> {
    GeoGeometry::<f64>::try_from(geometry.clone()).ok()
}

/// A representative point guaranteed to lie on or inside the geometry.
/// Returns None for empty geometries.
pub fn point_on_surface(geometry: &geojson::Geometry) -> Option<Point<f64>> {
    to_geo_geometry(geometry)?.interior_point()
}

/// GeoJSON Point geometry at the point on surface
pub fn point_on_surface_geojson(geometry: &geojson::Geometry) -> Option<geojson::Geometry> {
    let point = point_on_surface(geometry)?;
    Some(geojson::Geometry::new(geojson::Value::Point(vec![point.x(), point.y()])))
}

/// Check if two geometries intersect
pub fn geometries_intersect(a: &geojson::Geometry, b: &geojson::Geometry) -> bool {
    match (to_geo_geometry(a), to_geo_geometry(b)) {
        (Some(a), Some(b)) => {
            // Reject on disjoint envelopes before the exact test
            match (a.bounding_rect(), b.bounding_rect()) {
                (Some(ra), Some(rb)) if !bounding_boxes_intersect(&ra, &rb) => false,
                _ => a.intersects(&b),
            }
        }
        _ => false,
    }
}

/// Check if two bounding boxes intersect
fn bounding_boxes_intersect(bbox1: &Rect, bbox2: &Rect) -> bool {
    let x_overlap = bbox1.min().x <= bbox2.max().x && bbox1.max().x >= bbox2.min().x;
    let y_overlap = bbox1.min().y <= bbox2.max().y && bbox1.max().y >= bbox2.min().y;

    x_overlap && y_overlap
}
