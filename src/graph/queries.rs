use crate::geometry::LonLat;
use crate::graph::store::{Attr, EntityId, GraphStore, Value};
use crate::time::SecondsSinceDayStart;
use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;

/// The entities walkable from `entity` in one step: its own successor set,
/// then every entity whose successor set contains it. Presenting the reverse
/// direction here is what makes road edges bidirectional and stop anchors
/// walkable both ways.
pub fn node_successors(store: &GraphStore, entity: EntityId) -> Vec<EntityId> {
    let forward = store.entity(entity).refs(Attr::NodeSuccessors);
    let entity_ref = Value::Ref(entity);
    let reverse = store.with_value(Attr::NodeSuccessors, &entity_ref);
    forward.chain(reverse).collect()
}

/// The stops reachable from `stop` as the next stop of some trip.
/// Directed: schedules are not symmetric.
pub fn stop_successors(store: &GraphStore, stop: EntityId) -> Vec<EntityId> {
    store.entity(stop).refs(Attr::StopSuccessors).collect()
}

/// The node a coordinate snaps to: the first entity of the location index at
/// or after `point`, ties resolved by index order.
pub fn nearest_node(store: &GraphStore, point: &LonLat) -> Option<EntityId> {
    store
        .range_avet(Attr::NodeLocation, &Value::Point(*point))
        .next()
        .map(|(_, entity)| entity)
}

/// The trips whose service calendar is active on `date`: the date lies
/// strictly inside the service window and the weekday is allowed.
pub fn day_trips(store: &GraphStore, date: NaiveDate) -> HashSet<EntityId> {
    let mut active_services = HashSet::new();
    for service in store.entities_with(Attr::ServiceId) {
        let view = store.entity(service);
        let (start, end, days) = match (
            view.date(Attr::ServiceStart),
            view.date(Attr::ServiceEnd),
            view.days(Attr::ServiceDays),
        ) {
            (Some(start), Some(end), Some(days)) => (start, end, days),
            _ => continue,
        };
        if start < date && date < end && days.contains(date.weekday()) {
            active_services.insert(service);
        }
    }

    let mut trips = HashSet::new();
    for trip in store.entities_with(Attr::TripService) {
        if let Some(service) = store.entity(trip).reference(Attr::TripService) {
            if active_services.contains(&service) {
                trips.insert(trip);
            }
        }
    }
    trips
}

/// The stop_time at which `trip` calls at `next_stop`, if it does.
pub fn continue_trip(store: &GraphStore, next_stop: EntityId, trip: EntityId) -> Option<EntityId> {
    store
        .with_value(Attr::StopTimeTrip, &Value::Ref(trip))
        .find(|stop_time| {
            store.entity(*stop_time).reference(Attr::StopTimeStop) == Some(next_stop)
        })
}

/// The earliest boarding at `src_stop` after `now` that rides an active trip
/// to `dst_stop`, as a `(boarding, alighting)` stop_time pair.
///
/// The alighting call must lie strictly downstream of the boarding call, so
/// a trip looping through `dst_stop` before `src_stop` can never produce a
/// ride of negative duration. Equal departure times resolve to the smallest
/// trip id.
pub fn find_trip(
    store: &GraphStore,
    src_stop: EntityId,
    dst_stop: EntityId,
    now: &SecondsSinceDayStart,
    active_trips: &HashSet<EntityId>,
) -> Option<(EntityId, EntityId)> {
    let mut best: Option<(SecondsSinceDayStart, String, EntityId, EntityId)> = None;

    for boarding in store.with_value(Attr::StopTimeStop, &Value::Ref(src_stop)) {
        let boarding_view = store.entity(boarding);
        let trip = match boarding_view.reference(Attr::StopTimeTrip) {
            Some(trip) if active_trips.contains(&trip) => trip,
            _ => continue,
        };
        let departure = match boarding_view.time(Attr::StopTimeDeparture) {
            Some(departure) if departure > *now => departure,
            _ => continue,
        };
        let alighting = match continue_trip(store, dst_stop, trip) {
            Some(alighting) => alighting,
            None => continue,
        };
        let boarding_sequence = boarding_view.int(Attr::StopTimeSequence);
        let alighting_sequence = store.entity(alighting).int(Attr::StopTimeSequence);
        match (boarding_sequence, alighting_sequence) {
            (Some(board), Some(alight)) if board < alight => {}
            _ => continue,
        }

        let trip_id = store
            .entity(trip)
            .text(Attr::TripId)
            .unwrap_or_default()
            .to_string();
        let better = match &best {
            None => true,
            Some((best_departure, best_trip_id, _, _)) => {
                departure < *best_departure
                    || (departure == *best_departure && trip_id < *best_trip_id)
            }
        };
        if better {
            best = Some((departure, trip_id, boarding, alighting));
        }
    }

    best.map(|(_, _, boarding, alighting)| (boarding, alighting))
}

/// The first way referencing both endpoints, in index order. This is the
/// street context of a walking edge; node to stop hops have none.
pub fn shared_way(store: &GraphStore, a: EntityId, b: EntityId) -> Option<EntityId> {
    store
        .with_value(Attr::WayNodes, &Value::Ref(a))
        .find(|way| store.entity(*way).refs(Attr::WayNodes).any(|node| node == b))
}
