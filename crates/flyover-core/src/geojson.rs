//! GeoJSON conversions for routes and scene geometry.

use crate::geo::Coordinate;
use crate::route::Route;
use serde_json::{json, Value};

fn position(at: Coordinate) -> Value {
    json!([at.lon, at.lat])
}

/// A Point feature with a `name` property.
pub fn point_feature(at: Coordinate, name: &str) -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "Point",
            "coordinates": position(at),
        },
        "properties": { "name": name },
    })
}

/// A LineString feature over an ordered coordinate sequence.
pub fn line_feature(points: &[Coordinate]) -> Value {
    let coordinates: Vec<Value> = points.iter().copied().map(position).collect();
    json!({
        "type": "Feature",
        "geometry": {
            "type": "LineString",
            "coordinates": coordinates,
        },
        "properties": {},
    })
}

/// A FeatureCollection holding the route line and its endpoints.
pub fn route_collection(route: &Route) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            line_feature(route.points()),
            point_feature(route.origin(), "origin"),
            point_feature(route.destination(), "destination"),
        ],
    })
}
