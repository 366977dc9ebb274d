use crate::geometry;
use crate::graph::{queries, Attr, EntityId, GraphStore};
use crate::time::{PositiveDuration, SecondsSinceDayStart};
use std::collections::HashSet;

/// Pedestrian speed over the road network, in meters per second.
pub const WALK_SPEED: f64 = 1.4;

/// What was done to reach the target of a transition. Carried into the
/// trace so the directions builder can reconstruct the step later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leg {
    /// A seed state of the traversal.
    Start,
    /// A walk, through `way` when both endpoints share one.
    Walk { way: Option<EntityId> },
    /// A vehicle ride between two calls of one trip. `wait` is the time
    /// spent at the stop before the vehicle departs; it is already counted
    /// in the transition duration.
    Ride {
        boarding: EntityId,
        alighting: EntityId,
        wait: PositiveDuration,
    },
}

/// One outgoing move from a `(entity, time)` state.
#[derive(Debug, Clone)]
pub struct Transition {
    pub target: EntityId,
    pub duration: PositiveDuration,
    pub leg: Leg,
}

/// What the traversal engine needs from a transition source. The engine
/// stays ignorant of modes; time dependence hides behind `at`, from which
/// every duration is computed fresh.
pub trait Transitions {
    type Value: crate::engine::dijkstra::TraceValue;

    fn transitions(&self, from: EntityId, at: &Self::Value) -> Vec<Transition>;
}

/// Walking over nodes, stops and the links between them.
#[derive(Debug, Clone)]
pub struct PedestrianRouter<'graph> {
    graph: &'graph GraphStore,
    walking_speed: f64,
}

impl<'graph> PedestrianRouter<'graph> {
    pub fn new(graph: &'graph GraphStore, walking_speed: f64) -> Self {
        Self {
            graph,
            walking_speed,
        }
    }

    fn walk_transitions(&self, from: EntityId) -> Vec<Transition> {
        let from_location = match self.graph.entity(from).location() {
            Some(location) => location,
            None => return Vec::new(),
        };
        queries::node_successors(self.graph, from)
            .into_iter()
            .filter_map(|target| {
                let to_location = self.graph.entity(target).location()?;
                let meters = geometry::distance(&from_location, &to_location);
                let seconds = (meters / self.walking_speed).round() as u32;
                Some(Transition {
                    target,
                    duration: PositiveDuration::from_seconds(seconds),
                    leg: Leg::Walk {
                        way: queries::shared_way(self.graph, from, target),
                    },
                })
            })
            .collect()
    }
}

impl Transitions for PedestrianRouter<'_> {
    type Value = SecondsSinceDayStart;

    fn transitions(&self, from: EntityId, _at: &SecondsSinceDayStart) -> Vec<Transition> {
        self.walk_transitions(from)
    }
}

/// Walking plus vehicle rides on the trips active that day.
#[derive(Debug, Clone)]
pub struct TransitRouter<'graph> {
    graph: &'graph GraphStore,
    walking: PedestrianRouter<'graph>,
    active_trips: HashSet<EntityId>,
}

impl<'graph> TransitRouter<'graph> {
    pub fn new(
        graph: &'graph GraphStore,
        walking_speed: f64,
        active_trips: HashSet<EntityId>,
    ) -> Self {
        Self {
            graph,
            walking: PedestrianRouter::new(graph, walking_speed),
            active_trips,
        }
    }

    fn ride_transitions(&self, stop: EntityId, now: &SecondsSinceDayStart) -> Vec<Transition> {
        let mut transitions = Vec::new();
        for neighbor in queries::stop_successors(self.graph, stop) {
            let (boarding, alighting) =
                match queries::find_trip(self.graph, stop, neighbor, now, &self.active_trips) {
                    Some(pair) => pair,
                    None => continue,
                };
            let boarding_view = self.graph.entity(boarding);
            let alighting_view = self.graph.entity(alighting);
            let (departure, arrival) = match (
                boarding_view.time(Attr::StopTimeDeparture),
                alighting_view.time(Attr::StopTimeArrival),
            ) {
                (Some(departure), Some(arrival)) => (departure, arrival),
                _ => continue,
            };
            // find_trip guarantees departure > now and a downstream
            // alighting, so both durations exist.
            let duration = match arrival.duration_since(now) {
                Some(duration) => duration,
                None => continue,
            };
            let wait = match departure.duration_since(now) {
                Some(wait) => wait,
                None => continue,
            };
            transitions.push(Transition {
                target: neighbor,
                duration,
                leg: Leg::Ride {
                    boarding,
                    alighting,
                    wait,
                },
            });
        }
        transitions
    }
}

/// The router of a query, dispatching on the kind of the current entity.
#[derive(Debug, Clone)]
pub enum Router<'graph> {
    Pedestrian(PedestrianRouter<'graph>),
    Transit(TransitRouter<'graph>),
}

impl Transitions for Router<'_> {
    type Value = SecondsSinceDayStart;

    fn transitions(&self, from: EntityId, at: &SecondsSinceDayStart) -> Vec<Transition> {
        match self {
            Router::Pedestrian(router) => router.walk_transitions(from),
            Router::Transit(router) => {
                if router.graph.entity(from).has(Attr::StopId) {
                    let mut transitions = router.ride_transitions(from, at);
                    transitions.extend(router.walking.walk_transitions(from));
                    transitions
                } else {
                    router.walking.walk_transitions(from)
                }
            }
        }
    }
}
