use crate::graph::queries;
use crate::graph::store::{Attr, GraphStore, Value};
use crate::geometry::LonLat;
use crate::time::{DaysPattern, SecondsSinceDayStart};
use chrono::{NaiveDate, Weekday};
use std::collections::HashMap;
use tracing::{info, warn};

/// Accumulates raw network and schedule rows, then materializes the store.
///
/// All referential and structural checks happen in [`GraphBuilder::build`]:
/// a violated invariant aborts the build, serving never starts on a bad
/// graph. The offline preprocessor and the test fixtures both go through
/// this type.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<(i64, LonLat)>,
    ways: Vec<WayRow>,
    stops: Vec<StopRow>,
    agencies: Vec<(String, String)>,
    routes: Vec<(String, Option<String>)>,
    services: Vec<ServiceRow>,
    trips: Vec<TripRow>,
    stop_times: Vec<StopTimeRow>,
}

#[derive(Debug)]
struct WayRow {
    id: i64,
    name: Option<String>,
    nodes: Vec<i64>,
}

#[derive(Debug)]
struct StopRow {
    id: String,
    name: String,
    location: LonLat,
}

#[derive(Debug)]
struct ServiceRow {
    id: String,
    start: NaiveDate,
    end: NaiveDate,
    days: DaysPattern,
}

#[derive(Debug)]
struct TripRow {
    id: String,
    route: String,
    service: String,
}

#[derive(Debug)]
struct StopTimeRow {
    trip: String,
    stop: String,
    arrival: SecondsSinceDayStart,
    departure: SecondsSinceDayStart,
    sequence: i64,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(mut self, id: i64, location: (f64, f64)) -> Self {
        self.nodes.push((id, LonLat::new(location.0, location.1)));
        self
    }

    pub fn way(mut self, id: i64, name: Option<&str>, nodes: &[i64]) -> Self {
        self.ways.push(WayRow {
            id,
            name: name.map(str::to_string),
            nodes: nodes.to_vec(),
        });
        self
    }

    pub fn stop(mut self, id: &str, name: &str, location: (f64, f64)) -> Self {
        self.stops.push(StopRow {
            id: id.to_string(),
            name: name.to_string(),
            location: LonLat::new(location.0, location.1),
        });
        self
    }

    pub fn agency(mut self, id: &str, name: &str) -> Self {
        self.agencies.push((id.to_string(), name.to_string()));
        self
    }

    pub fn route(mut self, id: &str, name: Option<&str>) -> Self {
        self.routes.push((id.to_string(), name.map(str::to_string)));
        self
    }

    pub fn service(mut self, id: &str, start: NaiveDate, end: NaiveDate, days: &[Weekday]) -> Self {
        self.services.push(ServiceRow {
            id: id.to_string(),
            start,
            end,
            days: DaysPattern::from_weekdays(days),
        });
        self
    }

    pub fn trip(mut self, id: &str, route: &str, service: &str) -> Self {
        self.trips.push(TripRow {
            id: id.to_string(),
            route: route.to_string(),
            service: service.to_string(),
        });
        self
    }

    pub fn stop_time(
        mut self,
        trip: &str,
        stop: &str,
        arrival: SecondsSinceDayStart,
        departure: SecondsSinceDayStart,
        sequence: i64,
    ) -> Self {
        self.stop_times.push(StopTimeRow {
            trip: trip.to_string(),
            stop: stop.to_string(),
            arrival,
            departure,
            sequence,
        });
        self
    }

    pub fn build(self) -> Result<GraphStore, ModelError> {
        let mut store = GraphStore::new();

        let mut agencies = HashMap::new();
        for (id, name) in &self.agencies {
            if agencies.contains_key(id.as_str()) {
                return Err(ModelError::DuplicateAgency(id.clone()));
            }
            let entity = store.new_entity();
            store.insert(entity, Attr::AgencyId, Value::Text(id.clone()));
            store.insert(entity, Attr::AgencyName, Value::Text(name.clone()));
            agencies.insert(id.as_str(), entity);
        }

        let mut routes = HashMap::new();
        for (id, name) in &self.routes {
            if routes.contains_key(id.as_str()) {
                return Err(ModelError::DuplicateRoute(id.clone()));
            }
            let entity = store.new_entity();
            store.insert(entity, Attr::RouteId, Value::Text(id.clone()));
            if let Some(name) = name {
                store.insert(entity, Attr::RouteName, Value::Text(name.clone()));
            }
            routes.insert(id.as_str(), entity);
        }

        let mut nodes = HashMap::new();
        for (id, location) in &self.nodes {
            if nodes.contains_key(id) {
                return Err(ModelError::DuplicateNode(*id));
            }
            let entity = store.new_entity();
            store.insert(entity, Attr::NodeId, Value::Int(*id));
            store.insert(entity, Attr::NodeLocation, Value::Point(*location));
            nodes.insert(*id, entity);
        }

        let mut ways = HashMap::new();
        for way in &self.ways {
            if ways.contains_key(&way.id) {
                return Err(ModelError::DuplicateWay(way.id));
            }
            let entity = store.new_entity();
            store.insert(entity, Attr::WayId, Value::Int(way.id));
            if let Some(name) = &way.name {
                store.insert(entity, Attr::WayName, Value::Text(name.clone()));
            }
            for node in &way.nodes {
                let node_entity = *nodes.get(node).ok_or(ModelError::UnknownWayNode {
                    way: way.id,
                    node: *node,
                })?;
                store.insert(entity, Attr::WayNodes, Value::Ref(node_entity));
            }
            // Member order materializes as the walking edges of the network.
            for pair in way.nodes.windows(2) {
                let from = nodes[&pair[0]];
                let to = nodes[&pair[1]];
                store.insert(from, Attr::NodeSuccessors, Value::Ref(to));
            }
            ways.insert(way.id, entity);
        }

        let mut stops = HashMap::new();
        for stop in &self.stops {
            if stops.contains_key(stop.id.as_str()) {
                return Err(ModelError::DuplicateStop(stop.id.clone()));
            }
            let entity = store.new_entity();
            store.insert(entity, Attr::StopId, Value::Text(stop.id.clone()));
            store.insert(entity, Attr::StopName, Value::Text(stop.name.clone()));
            store.insert(entity, Attr::StopLocation, Value::Point(stop.location));
            stops.insert(stop.id.as_str(), entity);
        }

        let mut services = HashMap::new();
        for service in &self.services {
            if services.contains_key(service.id.as_str()) {
                return Err(ModelError::DuplicateService(service.id.clone()));
            }
            let entity = store.new_entity();
            store.insert(entity, Attr::ServiceId, Value::Text(service.id.clone()));
            store.insert(entity, Attr::ServiceStart, Value::Date(service.start));
            store.insert(entity, Attr::ServiceEnd, Value::Date(service.end));
            store.insert(entity, Attr::ServiceDays, Value::Days(service.days));
            services.insert(service.id.as_str(), entity);
        }

        let mut trips = HashMap::new();
        for trip in &self.trips {
            if trips.contains_key(trip.id.as_str()) {
                return Err(ModelError::DuplicateTrip(trip.id.clone()));
            }
            let route = *routes
                .get(trip.route.as_str())
                .ok_or_else(|| ModelError::UnknownRoute {
                    trip: trip.id.clone(),
                    route: trip.route.clone(),
                })?;
            let service =
                *services
                    .get(trip.service.as_str())
                    .ok_or_else(|| ModelError::UnknownService {
                        trip: trip.id.clone(),
                        service: trip.service.clone(),
                    })?;
            let entity = store.new_entity();
            store.insert(entity, Attr::TripId, Value::Text(trip.id.clone()));
            store.insert(entity, Attr::TripRoute, Value::Ref(route));
            store.insert(entity, Attr::TripService, Value::Ref(service));
            trips.insert(trip.id.as_str(), entity);
        }

        let mut sequences_by_trip: HashMap<&str, Vec<(i64, &str)>> = HashMap::new();
        for stop_time in &self.stop_times {
            let trip =
                *trips
                    .get(stop_time.trip.as_str())
                    .ok_or_else(|| ModelError::UnknownTrip {
                        trip: stop_time.trip.clone(),
                    })?;
            let stop =
                *stops
                    .get(stop_time.stop.as_str())
                    .ok_or_else(|| ModelError::UnknownStop {
                        trip: stop_time.trip.clone(),
                        stop: stop_time.stop.clone(),
                    })?;
            let sequences = sequences_by_trip.entry(stop_time.trip.as_str()).or_default();
            if sequences
                .iter()
                .any(|(sequence, _)| *sequence == stop_time.sequence)
            {
                return Err(ModelError::DuplicateSequence {
                    trip: stop_time.trip.clone(),
                    sequence: stop_time.sequence,
                });
            }
            sequences.push((stop_time.sequence, stop_time.stop.as_str()));
            if stop_time.departure < stop_time.arrival {
                warn!(
                    "stop_time of trip {} at {} departs before it arrives",
                    stop_time.trip, stop_time.stop
                );
            }
            let entity = store.new_entity();
            store.insert(entity, Attr::StopTimeTrip, Value::Ref(trip));
            store.insert(entity, Attr::StopTimeStop, Value::Ref(stop));
            store.insert(entity, Attr::StopTimeArrival, Value::Time(stop_time.arrival));
            store.insert(
                entity,
                Attr::StopTimeDeparture,
                Value::Time(stop_time.departure),
            );
            store.insert(
                entity,
                Attr::StopTimeSequence,
                Value::Int(stop_time.sequence),
            );
        }

        // stop.successors is the union over trips of the next-in-sequence
        // relation. This is the only place the relation is computed.
        for sequences in sequences_by_trip.values_mut() {
            sequences.sort_unstable_by_key(|(sequence, _)| *sequence);
            for pair in sequences.windows(2) {
                let from = stops[pair[0].1];
                let to = stops[pair[1].1];
                store.insert(from, Attr::StopSuccessors, Value::Ref(to));
            }
        }

        // Every stop must hang off the road network through one anchor node,
        // found with the same index-order snap that serves queries.
        for stop in &self.stops {
            let entity = stops[stop.id.as_str()];
            let anchor = queries::nearest_node(&store, &stop.location)
                .ok_or_else(|| ModelError::UnanchoredStop(stop.id.clone()))?;
            store.insert(anchor, Attr::NodeSuccessors, Value::Ref(entity));
        }

        info!(
            "graph built: {} nodes, {} ways, {} stops, {} trips, {} datoms",
            self.nodes.len(),
            self.ways.len(),
            self.stops.len(),
            self.trips.len(),
            store.nb_of_datoms()
        );

        Ok(store)
    }
}

/// Structural defects that abort preprocessing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    DuplicateNode(i64),
    DuplicateWay(i64),
    DuplicateStop(String),
    DuplicateAgency(String),
    DuplicateRoute(String),
    DuplicateService(String),
    DuplicateTrip(String),
    DuplicateSequence { trip: String, sequence: i64 },
    UnknownWayNode { way: i64, node: i64 },
    UnknownRoute { trip: String, route: String },
    UnknownService { trip: String, service: String },
    UnknownTrip { trip: String },
    UnknownStop { trip: String, stop: String },
    UnanchoredStop(String),
}

impl std::error::Error for ModelError {}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::DuplicateNode(id) => write!(f, "node {} is defined twice", id),
            ModelError::DuplicateWay(id) => write!(f, "way {} is defined twice", id),
            ModelError::DuplicateStop(id) => write!(f, "stop `{}` is defined twice", id),
            ModelError::DuplicateAgency(id) => write!(f, "agency `{}` is defined twice", id),
            ModelError::DuplicateRoute(id) => write!(f, "route `{}` is defined twice", id),
            ModelError::DuplicateService(id) => write!(f, "service `{}` is defined twice", id),
            ModelError::DuplicateTrip(id) => write!(f, "trip `{}` is defined twice", id),
            ModelError::DuplicateSequence { trip, sequence } => write!(
                f,
                "trip `{}` has two stop_times with sequence {}",
                trip, sequence
            ),
            ModelError::UnknownWayNode { way, node } => {
                write!(f, "way {} references unknown node {}", way, node)
            }
            ModelError::UnknownRoute { trip, route } => {
                write!(f, "trip `{}` references unknown route `{}`", trip, route)
            }
            ModelError::UnknownService { trip, service } => write!(
                f,
                "trip `{}` references unknown service `{}`",
                trip, service
            ),
            ModelError::UnknownTrip { trip } => {
                write!(f, "stop_time references unknown trip `{}`", trip)
            }
            ModelError::UnknownStop { trip, stop } => write!(
                f,
                "stop_time of trip `{}` references unknown stop `{}`",
                trip, stop
            ),
            ModelError::UnanchoredStop(id) => write!(
                f,
                "stop `{}` cannot be anchored to any node of the road network",
                id
            ),
        }
    }
}
