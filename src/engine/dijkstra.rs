use crate::engine::router::{Leg, Transitions};
use crate::graph::EntityId;
use crate::time::{PositiveDuration, SecondsSinceDayStart};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

/// What the traversal requires of the value carried by a trace.
///
/// `sum` must be monotone: `value.sum(d).cost() >= value.cost()` for every
/// duration `d`. For time-dependent routing the value is an absolute time of
/// day, so the heap key is directly an arrival time.
pub trait TraceValue: Clone {
    fn cost(&self) -> u64;
    fn sum(&self, duration: &PositiveDuration) -> Self;
}

impl TraceValue for SecondsSinceDayStart {
    fn cost(&self) -> u64 {
        self.seconds() as u64
    }

    fn sum(&self, duration: &PositiveDuration) -> Self {
        *self + *duration
    }
}

/// Handle of a trace inside a [`Traversal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId {
    id: usize,
}

#[derive(Debug, Clone)]
struct TraceData<Value> {
    entity: EntityId,
    value: Value,
    leg: Leg,
    predecessor: Option<TraceId>,
}

/// One element of a reconstructed path, owned, in forward order.
#[derive(Debug, Clone)]
pub struct PathTrace<Value> {
    pub entity: EntityId,
    pub value: Value,
    pub leg: Leg,
}

/// Lazy min-priority traversal.
///
/// Iterating yields settled traces in non-decreasing cost order, each entity
/// at most once. Traces form a tree rooted at the seeds: every trace keeps
/// its predecessor as an arena index, and the arena lives as long as the
/// traversal. Dropping the traversal releases the heap, the settled set and
/// every partial trace at once.
pub struct Traversal<'router, Router: Transitions> {
    router: &'router Router,
    traces: Vec<TraceData<Router::Value>>,
    heap: BinaryHeap<Reverse<(u64, usize)>>,
    settled: HashSet<EntityId>,
}

impl<'router, Router: Transitions> Traversal<'router, Router> {
    pub fn new(
        router: &'router Router,
        seeds: impl IntoIterator<Item = (EntityId, Router::Value)>,
    ) -> Self {
        let mut traversal = Self {
            router,
            traces: Vec::new(),
            heap: BinaryHeap::new(),
            settled: HashSet::new(),
        };
        for (entity, value) in seeds {
            traversal.push(TraceData {
                entity,
                value,
                leg: Leg::Start,
                predecessor: None,
            });
        }
        traversal
    }

    fn push(&mut self, trace: TraceData<Router::Value>) {
        let id = self.traces.len();
        self.heap.push(Reverse((trace.value.cost(), id)));
        self.traces.push(trace);
    }

    pub fn entity(&self, trace: TraceId) -> EntityId {
        self.traces[trace.id].entity
    }

    pub fn value(&self, trace: TraceId) -> &Router::Value {
        &self.traces[trace.id].value
    }

    /// The path from a seed to `trace`, reconstructed into an owned forward
    /// list by walking predecessor links.
    pub fn path(&self, trace: TraceId) -> Vec<PathTrace<Router::Value>> {
        let mut path = Vec::new();
        let mut current = Some(trace);
        while let Some(id) = current {
            let data = &self.traces[id.id];
            path.push(PathTrace {
                entity: data.entity,
                value: data.value.clone(),
                leg: data.leg.clone(),
            });
            current = data.predecessor;
        }
        path.reverse();
        path
    }
}

impl<Router: Transitions> Iterator for Traversal<'_, Router> {
    type Item = TraceId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(Reverse((_, id))) = self.heap.pop() {
            let (entity, value) = {
                let trace = &self.traces[id];
                (trace.entity, trace.value.clone())
            };
            // Stale entries for already settled entities die here; there is
            // no decrease-key.
            if !self.settled.insert(entity) {
                continue;
            }
            for transition in self.router.transitions(entity, &value) {
                if self.settled.contains(&transition.target) {
                    continue;
                }
                self.push(TraceData {
                    entity: transition.target,
                    value: value.sum(&transition.duration),
                    leg: transition.leg,
                    predecessor: Some(TraceId { id }),
                });
            }
            return Some(TraceId { id });
        }
        None
    }
}

/// Consumes settled traces until `target` settles and returns the forward
/// path to it, or `None` when the traversal exhausts first.
///
/// When a seed is `target` itself, the path is that single trace; the
/// caller owns the degenerate response.
pub fn shortest_path<Router: Transitions>(
    router: &Router,
    seeds: impl IntoIterator<Item = (EntityId, Router::Value)>,
    target: EntityId,
) -> Option<Vec<PathTrace<Router::Value>>> {
    let mut traversal = Traversal::new(router, seeds);
    while let Some(trace) = traversal.next() {
        if traversal.entity(trace) == target {
            return Some(traversal.path(trace));
        }
    }
    None
}
