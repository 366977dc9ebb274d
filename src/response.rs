use crate::engine::{Leg, PathTrace};
use crate::geometry::{self, LonLat};
use crate::graph::{Attr, EntityId, GraphStore};
use crate::time::{PositiveDuration, SecondsSinceDayStart};
use serde::Serialize;
use uuid::Uuid;

type Path = [PathTrace<SecondsSinceDayStart>];

/// The response of a query, shaped like a Directions v5 route with its
/// waypoints folded in.
#[derive(Debug, Clone, Serialize)]
pub struct Directions {
    pub uuid: String,
    pub waypoints: Vec<Waypoint>,
    /// Arc length over the full path geometry, in meters.
    pub distance: f64,
    /// Seconds between the first and the last trace of the path.
    pub duration: u64,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Waypoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub location: [f64; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct Step {
    pub mode: Mode,
    pub distance: f64,
    pub geometry: Geometry,
    pub maneuver: Maneuver,
    /// Absolute epoch seconds at which the end of this step is reached.
    pub arrive: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Seconds spent waiting for the vehicle, on boarding steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip: Option<TripRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Walking,
    Transit,
}

#[derive(Debug, Clone, Serialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Maneuver {
    #[serde(rename = "type")]
    pub kind: ManeuverType,
    pub bearing_before: f64,
    pub bearing_after: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ManeuverType {
    #[serde(rename = "depart")]
    Depart,
    #[serde(rename = "arrive")]
    Arrive,
    #[serde(rename = "notification")]
    Notification,
    #[serde(rename = "continue")]
    Continue,
    #[serde(rename = "exit vehicle")]
    ExitVehicle,
    #[serde(rename = "turn")]
    Turn,
}

#[derive(Debug, Clone, Serialize)]
pub struct TripRef {
    pub id: String,
}

/// Turn modifiers by smallest applicable angle, ascending. The classifier
/// picks the entry with the largest key not exceeding the turn angle.
const TURN_MODIFIERS: [(f64, &str); 10] = [
    (-180.0, "straight"),
    (-120.0, "slight left"),
    (-60.0, "left"),
    (-20.0, "sharp left"),
    (0.0, "straight"),
    (20.0, "slight right"),
    (60.0, "right"),
    (120.0, "sharp right"),
    (160.0, "uturn"),
    (180.0, "straight"),
];

fn turn_modifier(angle: f64) -> &'static str {
    TURN_MODIFIERS
        .iter()
        .rev()
        .find(|(key, _)| *key <= angle)
        .map(|(_, modifier)| *modifier)
        .unwrap_or("straight")
}

/// The travel context of one trace.
///
/// `Start` is the context of a seed and matches no piece built from real
/// legs, so the first piece of a path is always the singleton seed trace.
/// A trace standing on a stop entity takes that stop as its context no
/// matter how the stop was reached; boarding and alighting stops therefore
/// both bound a piece, even on a single-hop ride. Wayless walks between
/// nodes inherit the context they were entered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Start,
    Way(EntityId),
    Stop(EntityId),
}

fn contexts(store: &GraphStore, path: &Path) -> Vec<Context> {
    let mut result = Vec::with_capacity(path.len());
    let mut carry = Context::Start;
    for trace in path {
        let context = match &trace.leg {
            Leg::Start => Context::Start,
            _ if store.entity(trace.entity).has(Attr::StopId) => Context::Stop(trace.entity),
            Leg::Walk { way: Some(way) } => Context::Way(*way),
            _ => carry,
        };
        result.push(context);
        carry = context;
    }
    result
}

/// A maximal run of traces sharing one context, as a half-open index range.
#[derive(Debug, Clone)]
struct Piece {
    context: Context,
    start: usize,
    end: usize,
}

fn pieces(contexts: &[Context]) -> Vec<Piece> {
    let mut result: Vec<Piece> = Vec::new();
    for (index, context) in contexts.iter().enumerate() {
        match result.last_mut() {
            Some(piece) if piece.context == *context => piece.end = index + 1,
            _ => result.push(Piece {
                context: *context,
                start: index,
                end: index + 1,
            }),
        }
    }
    result
}

fn first_ride(path: &Path) -> Option<(EntityId, PositiveDuration)> {
    path.iter().find_map(|trace| match &trace.leg {
        Leg::Ride { boarding, wait, .. } => Some((*boarding, *wait)),
        _ => None,
    })
}

fn trip_of_boarding(store: &GraphStore, boarding: EntityId) -> Option<TripRef> {
    let trip = store.entity(boarding).reference(Attr::StopTimeTrip)?;
    let id = store.entity(trip).text(Attr::TripId)?.to_string();
    Some(TripRef { id })
}

fn context_name(store: &GraphStore, context: Context) -> Option<String> {
    match context {
        Context::Way(way) => store.entity(way).text(Attr::WayName).map(str::to_string),
        Context::Stop(stop) => store.entity(stop).text(Attr::StopName).map(str::to_string),
        Context::Start => None,
    }
}

/// The name of a waypoint: the first named way along the given traces,
/// falling back to the first named stop.
fn waypoint_name<'path>(
    store: &GraphStore,
    traces: impl Iterator<Item = &'path PathTrace<SecondsSinceDayStart>> + Clone,
) -> Option<String> {
    let from_way = traces.clone().find_map(|trace| match &trace.leg {
        Leg::Walk { way: Some(way) } => store.entity(*way).text(Attr::WayName),
        _ => None,
    });
    if let Some(name) = from_way {
        return Some(name.to_string());
    }
    traces
        .filter_map(|trace| store.entity(trace.entity).text(Attr::StopName))
        .next()
        .map(str::to_string)
}

/// Assembles the full response from a settled forward path.
///
/// `midnight_epoch` is midnight of the service day in the query timezone,
/// as epoch seconds; step times are absolute from there.
pub fn build_directions(store: &GraphStore, path: &Path, midnight_epoch: i64) -> Directions {
    // unwraps on locations are safe: the builder gives every node and stop
    // a location before the graph ever reaches a traversal
    let locations: Vec<LonLat> = path
        .iter()
        .map(|trace| store.entity(trace.entity).location().unwrap())
        .collect();

    let uuid = Uuid::new_v4().to_string();

    if path.len() < 2 {
        // source and destination coincide; keep the two-waypoint shape
        let waypoint = Waypoint {
            name: waypoint_name(store, path.iter()),
            location: [locations[0].lon, locations[0].lat],
        };
        return Directions {
            uuid,
            waypoints: vec![waypoint.clone(), waypoint],
            distance: 0.0,
            duration: 0,
            steps: Vec::new(),
        };
    }

    let contexts = contexts(store, path);
    let pieces = pieces(&contexts);
    let nb_of_pieces = pieces.len();
    let last_index = path.len() - 1;

    let mut steps = Vec::with_capacity(nb_of_pieces);
    for (index, piece) in pieces.iter().enumerate() {
        // Sentinel pieces surround the partition: the singleton first trace
        // before it, the singleton last trace after it.
        let prev_first = if index == 0 { 0 } else { pieces[index - 1].start };
        let next_first = pieces.get(index + 1).map_or(last_index, |next| next.start);
        let prev_context = if index == 0 {
            None
        } else {
            Some(pieces[index - 1].context)
        };
        let next_context = pieces.get(index + 1).map(|next| next.context);

        let kind = if index == 0 {
            ManeuverType::Depart
        } else if index == nb_of_pieces - 1 {
            ManeuverType::Arrive
        } else if matches!(prev_context, Some(Context::Way(_)))
            && matches!(piece.context, Context::Stop(_))
        {
            ManeuverType::Notification
        } else if matches!(piece.context, Context::Stop(_))
            && matches!(next_context, Some(Context::Stop(_)))
        {
            ManeuverType::Continue
        } else if matches!(piece.context, Context::Stop(_))
            && matches!(next_context, Some(Context::Way(_)))
        {
            ManeuverType::ExitVehicle
        } else {
            ManeuverType::Turn
        };

        let bearing_before = geometry::bearing(&locations[prev_first], &locations[piece.start]);
        let bearing_after = geometry::bearing(&locations[piece.start], &locations[next_first]);
        let modifier = if kind == ManeuverType::Turn {
            Some(turn_modifier(geometry::turn_angle(
                bearing_before,
                bearing_after,
            )))
        } else {
            None
        };

        let mut coords = locations[piece.start..piece.end].to_vec();
        coords.push(locations[next_first]);
        let distance = geometry::arc_length(&coords);

        let mode = if matches!(piece.context, Context::Stop(_)) {
            Mode::Transit
        } else {
            Mode::Walking
        };

        let piece_traces = &path[piece.start..piece.end];
        // A boarding or alighting step may describe a ride sitting in the
        // following piece: a walked-onto boarding stop carries no ride leg
        // of its own. The next piece need not hold one either, so the
        // lookup stays guarded.
        let ride = match kind {
            ManeuverType::Notification | ManeuverType::ExitVehicle => first_ride(piece_traces)
                .or_else(|| {
                    pieces
                        .get(index + 1)
                        .and_then(|next| first_ride(&path[next.start..next.end]))
                }),
            _ => first_ride(piece_traces),
        };
        let wait = if kind == ManeuverType::Notification {
            ride.map(|(_, wait)| wait.total_seconds())
        } else {
            None
        };
        let trip = if mode == Mode::Transit {
            ride.and_then(|(boarding, _)| trip_of_boarding(store, boarding))
        } else {
            None
        };

        steps.push(Step {
            mode,
            distance,
            geometry: Geometry {
                kind: "LineString",
                coordinates: coords.iter().map(|c| [c.lon, c.lat]).collect(),
            },
            maneuver: Maneuver {
                kind,
                bearing_before,
                bearing_after,
                modifier,
            },
            arrive: midnight_epoch + path[piece.end - 1].value.seconds() as i64,
            name: context_name(store, piece.context),
            wait,
            trip,
        });
    }

    // the unwraps are safe, the path has at least two traces here
    let duration = path
        .last()
        .unwrap()
        .value
        .duration_since(&path.first().unwrap().value)
        .map(|duration| duration.total_seconds())
        .unwrap_or(0);

    let first_location = locations[0];
    let last_location = locations[last_index];
    let waypoints = vec![
        Waypoint {
            name: waypoint_name(store, path.iter()),
            location: [first_location.lon, first_location.lat],
        },
        Waypoint {
            name: waypoint_name(store, path.iter().rev()),
            location: [last_location.lon, last_location.lat],
        },
    ];

    Directions {
        uuid,
        waypoints,
        distance: geometry::arc_length(&locations),
        duration,
        steps,
    }
}
