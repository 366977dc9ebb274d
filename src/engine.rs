pub mod dijkstra;
pub mod router;

pub use dijkstra::{shortest_path, PathTrace, TraceId, TraceValue, Traversal};
pub use router::{
    Leg, PedestrianRouter, Router, Transition, TransitRouter, Transitions, WALK_SPEED,
};
