use crate::config::PlannerConfig;
use crate::engine::{self, Router, TransitRouter};
use crate::geometry::LonLat;
use crate::graph::{queries, GraphStore};
use crate::response::{self, Directions};
use crate::time::{self, SecondsSinceDayStart};
use chrono::DateTime;
use chrono_tz::Tz;
use std::time::SystemTime;
use tracing::debug;

/// One trip-planning query: exactly two coordinates and a departure.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub from: LonLat,
    pub to: LonLat,
    pub departure: DateTime<Tz>,
}

/// Computes a door-to-door itinerary.
///
/// Returns `Ok(None)` when an endpoint cannot be snapped to the network or
/// when no path exists; those are ordinary outcomes of a well-formed query.
/// Malformed queries are rejected with [`BadRequest`].
pub fn plan(
    store: &GraphStore,
    request: &PlanRequest,
    config: &PlannerConfig,
) -> Result<Option<Directions>, BadRequest> {
    for coordinate in [request.from, request.to] {
        if !coordinate.is_valid() {
            return Err(BadRequest::Coordinates(coordinate));
        }
    }
    let midnight =
        time::zone_midnight(&request.departure).ok_or(BadRequest::DepartureDatetime)?;
    let elapsed = request
        .departure
        .signed_duration_since(midnight)
        .num_seconds();
    let departure = u32::try_from(elapsed)
        .map(SecondsSinceDayStart::from_seconds)
        .map_err(|_| BadRequest::DepartureDatetime)?;

    let src = match queries::nearest_node(store, &request.from) {
        Some(node) => node,
        None => {
            debug!("source {:?} snaps to no node", request.from);
            return Ok(None);
        }
    };
    let dst = match queries::nearest_node(store, &request.to) {
        Some(node) => node,
        None => {
            debug!("destination {:?} snaps to no node", request.to);
            return Ok(None);
        }
    };

    let date = request.departure.date_naive();
    let active_trips = queries::day_trips(store, date);
    debug!("{} trips active on {}", active_trips.len(), date);

    let router = Router::Transit(TransitRouter::new(
        store,
        config.walking_speed_m_s,
        active_trips,
    ));

    let compute_timer = SystemTime::now();
    let has_path = engine::shortest_path(&router, [(src, departure)], dst);
    debug!(
        "traversal finished in {} ms",
        compute_timer
            .elapsed()
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default()
    );

    match has_path {
        Some(path) => {
            let directions = response::build_directions(store, &path, midnight.timestamp());
            Ok(Some(directions))
        }
        None => {
            debug!("traversal exhausted without reaching the destination");
            Ok(None)
        }
    }
}

/// A query rejected at the boundary, before any routing happens.
#[derive(Debug, Clone, PartialEq)]
pub enum BadRequest {
    Coordinates(LonLat),
    DepartureDatetime,
}

impl std::error::Error for BadRequest {}

impl std::fmt::Display for BadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BadRequest::Coordinates(coordinate) => write!(
                f,
                "coordinate ({}, {}) is not a valid lon/lat pair",
                coordinate.lon, coordinate.lat
            ),
            BadRequest::DepartureDatetime => write!(
                f,
                "the requested departure has no usable local midnight"
            ),
        }
    }
}
