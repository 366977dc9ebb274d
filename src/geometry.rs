use geo::{Bearing, Distance, Haversine, Length, LineString, Point};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A WGS84 coordinate, longitude first.
///
/// The ordering is lexicographic on (lon, lat) with total float order, and is
/// the ordering of the location indexes of the graph store. The nearest-node
/// snap is defined directly on top of it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

impl PartialEq for LonLat {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LonLat {}

impl PartialOrd for LonLat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LonLat {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lon
            .total_cmp(&other.lon)
            .then(self.lat.total_cmp(&other.lat))
    }
}

impl From<LonLat> for Point<f64> {
    fn from(coord: LonLat) -> Self {
        Point::new(coord.lon, coord.lat)
    }
}

/// Great-circle distance in meters.
pub fn distance(from: &LonLat, to: &LonLat) -> f64 {
    Haversine.distance(Point::from(*from), Point::from(*to))
}

/// Bearing from `from` to `to` in degrees, clockwise from north,
/// normalized to [0, 360).
pub fn bearing(from: &LonLat, to: &LonLat) -> f64 {
    Haversine.bearing(Point::from(*from), Point::from(*to)).rem_euclid(360.0)
}

/// Length in meters of the polyline through `coords`, in order.
pub fn arc_length(coords: &[LonLat]) -> f64 {
    if coords.len() < 2 {
        return 0.0;
    }
    let line: LineString<f64> = coords
        .iter()
        .map(|coord| (coord.lon, coord.lat))
        .collect::<Vec<_>>()
        .into();
    Haversine.length(&line)
}

/// Signed turn angle between two bearings, in (-180, 180].
///
/// Computed as ((post - pre + 540) mod 360) - 180.
pub fn turn_angle(pre: f64, post: f64) -> f64 {
    (post - pre + 540.0).rem_euclid(360.0) - 180.0
}
