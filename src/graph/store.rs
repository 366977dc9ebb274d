use crate::geometry::LonLat;
use crate::time::{DaysPattern, SecondsSinceDayStart};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::{Read, Write};

/// Opaque identifier of an entity of the store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EntityId(u64);

impl EntityId {
    pub(crate) const MIN: EntityId = EntityId(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The attributes an entity may carry. The variant prefix is the entity kind.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Attr {
    NodeId,
    NodeLocation,
    NodeSuccessors,
    WayId,
    WayName,
    WayNodes,
    StopId,
    StopLocation,
    StopName,
    StopSuccessors,
    TripId,
    TripRoute,
    TripService,
    ServiceId,
    ServiceStart,
    ServiceEnd,
    ServiceDays,
    StopTimeTrip,
    StopTimeStop,
    StopTimeArrival,
    StopTimeDeparture,
    StopTimeSequence,
    RouteId,
    RouteName,
    AgencyId,
    AgencyName,
}

/// Typed value slot of a datom.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Text(String),
    Ref(EntityId),
    Point(LonLat),
    Date(NaiveDate),
    Time(SecondsSinceDayStart),
    Days(DaysPattern),
}

// Int is the smallest variant in the derived order, so this bounds every
// per-attribute or per-entity range scan from below.
const MIN_VALUE: Value = Value::Int(i64::MIN);

/// Entity/attribute/value store with the two orderings every fast query is
/// built on: AVET for value scans and reverse reference lookups, AEVT for
/// per-entity attribute access.
///
/// The store is write-once. A preprocessor (or the fixture builder) fills it,
/// then every query path borrows it immutably; it is `Sync` and shared
/// between workers without locks.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GraphStore {
    next_entity: u64,
    avet: BTreeSet<(Attr, Value, EntityId)>,
    aevt: BTreeSet<(Attr, EntityId, Value)>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn new_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }

    pub(crate) fn insert(&mut self, entity: EntityId, attr: Attr, value: Value) {
        self.avet.insert((attr, value.clone(), entity));
        self.aevt.insert((attr, entity, value));
    }

    pub fn nb_of_datoms(&self) -> usize {
        self.avet.len()
    }

    /// O(1) view of an entity; attribute access goes through the AEVT index.
    pub fn entity(&self, id: EntityId) -> EntityView<'_> {
        EntityView { store: self, id }
    }

    /// The single entity carrying `value` under a unique attribute.
    pub fn by_unique(&self, attr: Attr, value: &Value) -> Option<EntityId> {
        self.range_avet(attr, value)
            .next()
            .filter(|(found, _)| *found == value)
            .map(|(_, entity)| entity)
    }

    /// Ascending scan of the AVET index within `attr`, starting at the first
    /// datom whose value is >= `from`.
    pub fn range_avet<'a>(
        &'a self,
        attr: Attr,
        from: &Value,
    ) -> impl Iterator<Item = (&'a Value, EntityId)> + 'a {
        let lower = (attr, from.clone(), EntityId::MIN);
        self.avet
            .range(lower..)
            .take_while(move |(a, _, _)| *a == attr)
            .map(|(_, value, entity)| (value, *entity))
    }

    /// As [`GraphStore::range_avet`], bounded above by `to` (inclusive).
    pub fn range_avet_between<'a>(
        &'a self,
        attr: Attr,
        from: &Value,
        to: &'a Value,
    ) -> impl Iterator<Item = (&'a Value, EntityId)> + 'a {
        self.range_avet(attr, from)
            .take_while(move |(value, _)| *value <= to)
    }

    /// The entities whose datom under `attr` equals `value` exactly.
    /// This is the reverse lookup of reference attributes.
    pub fn with_value<'a>(
        &'a self,
        attr: Attr,
        value: &'a Value,
    ) -> impl Iterator<Item = EntityId> + 'a {
        self.range_avet(attr, value)
            .take_while(move |(found, _)| *found == value)
            .map(|(_, entity)| entity)
    }

    /// Every entity carrying `attr`, ascending, each reported once.
    pub fn entities_with(&self, attr: Attr) -> impl Iterator<Item = EntityId> + '_ {
        let lower = (attr, EntityId::MIN, MIN_VALUE);
        let mut previous = None;
        self.aevt
            .range(lower..)
            .take_while(move |(a, _, _)| *a == attr)
            .filter_map(move |(_, entity, _)| {
                if previous == Some(*entity) {
                    None
                } else {
                    previous = Some(*entity);
                    Some(*entity)
                }
            })
    }

    /// Serializes the snapshot. The format supports the range primitive on
    /// reload as-is, since both indexes are part of the snapshot.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), serde_json::Error> {
        serde_json::to_writer(writer, self)
    }

    pub fn read_from<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }
}

/// Borrowing view of one entity.
#[derive(Debug, Clone, Copy)]
pub struct EntityView<'a> {
    store: &'a GraphStore,
    id: EntityId,
}

impl<'a> EntityView<'a> {
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn values(&self, attr: Attr) -> impl Iterator<Item = &'a Value> + 'a {
        let lower = (attr, self.id, MIN_VALUE);
        let id = self.id;
        self.store
            .aevt
            .range(lower..)
            .take_while(move |(a, e, _)| *a == attr && *e == id)
            .map(|(_, _, value)| value)
    }

    pub fn first(&self, attr: Attr) -> Option<&'a Value> {
        self.values(attr).next()
    }

    pub fn has(&self, attr: Attr) -> bool {
        self.first(attr).is_some()
    }

    pub fn int(&self, attr: Attr) -> Option<i64> {
        match self.first(attr)? {
            Value::Int(int) => Some(*int),
            _ => None,
        }
    }

    pub fn text(&self, attr: Attr) -> Option<&'a str> {
        match self.first(attr)? {
            Value::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn reference(&self, attr: Attr) -> Option<EntityId> {
        match self.first(attr)? {
            Value::Ref(entity) => Some(*entity),
            _ => None,
        }
    }

    pub fn refs(&self, attr: Attr) -> impl Iterator<Item = EntityId> + 'a {
        self.values(attr).filter_map(|value| match value {
            Value::Ref(entity) => Some(*entity),
            _ => None,
        })
    }

    pub fn point(&self, attr: Attr) -> Option<LonLat> {
        match self.first(attr)? {
            Value::Point(point) => Some(*point),
            _ => None,
        }
    }

    pub fn date(&self, attr: Attr) -> Option<NaiveDate> {
        match self.first(attr)? {
            Value::Date(date) => Some(*date),
            _ => None,
        }
    }

    pub fn time(&self, attr: Attr) -> Option<SecondsSinceDayStart> {
        match self.first(attr)? {
            Value::Time(time) => Some(*time),
            _ => None,
        }
    }

    pub fn days(&self, attr: Attr) -> Option<DaysPattern> {
        match self.first(attr)? {
            Value::Days(days) => Some(*days),
            _ => None,
        }
    }

    /// The location of a node or a stop, whichever attribute is present.
    pub fn location(&self) -> Option<LonLat> {
        self.point(Attr::NodeLocation)
            .or_else(|| self.point(Attr::StopLocation))
    }
}
