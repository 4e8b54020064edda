//! Append-only storage for stops and bus routes.
//!
//! Stops and routes are never moved or removed once inserted. Everything
//! else refers to them by `StopId` (an index into the store) or by a
//! shared `Arc<str>` name, so no component holds its own copy of a name.

use crate::geo::Coordinates;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Stable identifier of a stop, assigned in insertion order starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StopId(pub u32);

impl StopId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for StopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named geographic point.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: StopId,
    pub name: Arc<str>,
    pub coordinates: Coordinates,
}

/// How a bus traverses its stop list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// Loop: the stop list is ridden once, front to back.
    Circle,

    /// There-and-back: the stop list is ridden forward, then backward.
    Return,
}

impl std::fmt::Display for RouteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Circle => "circle",
            Self::Return => "return",
        };
        write!(f, "{}", s)
    }
}

/// A named bus route over at least two stops.
#[derive(Debug, Clone, PartialEq)]
pub struct BusRoute {
    pub name: Arc<str>,
    pub kind: RouteKind,
    pub stops: Vec<StopId>,
}

static NO_BUSES: BTreeSet<Arc<str>> = BTreeSet::new();

/// Owner of all stops and bus routes.
#[derive(Debug, Default)]
pub struct EntityStore {
    stops: Vec<Stop>,
    stop_index: HashMap<Arc<str>, StopId>,

    buses: Vec<BusRoute>,
    bus_index: HashMap<Arc<str>, usize>,

    /// Buses serving each stop, kept sorted by name.
    buses_by_stop: HashMap<StopId, BTreeSet<Arc<str>>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a stop unless one with the same name exists.
    ///
    /// The first insertion wins: re-adding a name returns the existing id
    /// and ignores the new coordinates.
    pub fn add_stop(&mut self, name: &str, coordinates: Coordinates) -> StopId {
        if let Some(&id) = self.stop_index.get(name) {
            return id;
        }

        let id = StopId(self.stops.len() as u32);
        let name: Arc<str> = Arc::from(name);
        self.stops.push(Stop {
            id,
            name: name.clone(),
            coordinates,
        });
        self.stop_index.insert(name, id);

        id
    }

    pub fn find_stop(&self, name: &str) -> Option<&Stop> {
        let id = self.stop_index.get(name)?;
        self.stops.get(id.index())
    }

    pub fn stop(&self, id: StopId) -> Option<&Stop> {
        self.stops.get(id.index())
    }

    pub fn stop_id(&self, name: &str) -> Option<StopId> {
        self.stop_index.get(name).copied()
    }

    pub fn stop_name(&self, id: StopId) -> Option<&str> {
        self.stops.get(id.index()).map(|stop| stop.name.as_ref())
    }

    /// Stores a route and indexes it under each of its stops.
    ///
    /// Returns false, storing nothing, if a bus with this name already
    /// exists, if the route has fewer than two stops, or if a stop id does
    /// not belong to this store.
    pub(crate) fn add_bus(&mut self, name: &str, kind: RouteKind, stops: Vec<StopId>) -> bool {
        if self.bus_index.contains_key(name) || stops.len() < 2 {
            return false;
        }
        if stops.iter().any(|id| id.index() >= self.stops.len()) {
            return false;
        }

        let name: Arc<str> = Arc::from(name);
        for stop in &stops {
            self.buses_by_stop
                .entry(*stop)
                .or_default()
                .insert(name.clone());
        }

        self.bus_index.insert(name.clone(), self.buses.len());
        self.buses.push(BusRoute { name, kind, stops });

        true
    }

    pub fn find_bus(&self, name: &str) -> Option<&BusRoute> {
        let index = self.bus_index.get(name)?;
        self.buses.get(*index)
    }

    /// Names of the buses serving a stop, in lexical order.
    ///
    /// Unknown stops and stops without buses both yield an empty set.
    pub fn buses_for_stop(&self, name: &str) -> &BTreeSet<Arc<str>> {
        self.stop_id(name)
            .and_then(|id| self.buses_by_stop.get(&id))
            .unwrap_or(&NO_BUSES)
    }

    /// Iterates over stops in id order.
    pub fn stops(&self) -> impl Iterator<Item = &Stop> {
        self.stops.iter()
    }

    /// Iterates over bus routes in insertion order.
    pub fn buses(&self) -> impl Iterator<Item = &BusRoute> {
        self.buses.iter()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn bus_count(&self) -> usize {
        self.buses.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_stops(names: &[&str]) -> EntityStore {
        let mut store = EntityStore::new();
        for (i, name) in names.iter().enumerate() {
            store.add_stop(name, Coordinates::new(0.0, i as f64 * 0.001));
        }
        store
    }

    #[test]
    fn test_add_stop_is_idempotent() {
        let mut store = EntityStore::new();
        let first = store.add_stop("Tolstopaltsevo", Coordinates::new(55.611087, 37.20829));
        let second = store.add_stop("Tolstopaltsevo", Coordinates::new(1.0, 2.0));

        assert_eq!(first, second);
        assert_eq!(store.stop_count(), 1);

        let stop = store.find_stop("Tolstopaltsevo").unwrap();
        assert_eq!(stop.coordinates, Coordinates::new(55.611087, 37.20829));
    }

    #[test]
    fn test_ids_are_monotonic() {
        let store = store_with_stops(&["A", "B", "C"]);

        assert_eq!(store.stop_id("A"), Some(StopId(0)));
        assert_eq!(store.stop_id("C"), Some(StopId(2)));
        assert_eq!(store.stop_name(StopId(1)), Some("B"));
        assert_eq!(store.stop_id("nowhere"), None);
        assert_eq!(store.stop_name(StopId(42)), None);
    }

    #[test]
    fn test_add_bus_indexes_stops() {
        let mut store = store_with_stops(&["A", "B", "C"]);
        let (a, b, c) = (StopId(0), StopId(1), StopId(2));

        assert!(store.add_bus("750", RouteKind::Return, vec![a, b]));
        assert!(store.add_bus("256", RouteKind::Circle, vec![b, c, b]));

        let names: Vec<&str> = store.buses_for_stop("B").iter().map(|n| &**n).collect();
        assert_eq!(names, vec!["256", "750"]);
        assert_eq!(store.buses_for_stop("A").len(), 1);
    }

    #[test]
    fn test_duplicate_bus_is_rejected() {
        let mut store = store_with_stops(&["A", "B", "C"]);

        assert!(store.add_bus("1", RouteKind::Circle, vec![StopId(0), StopId(1)]));
        assert!(!store.add_bus("1", RouteKind::Return, vec![StopId(1), StopId(2)]));

        let bus = store.find_bus("1").unwrap();
        assert_eq!(bus.kind, RouteKind::Circle);
        assert!(store.buses_for_stop("C").is_empty());
    }

    #[test]
    fn test_malformed_routes_are_not_stored() {
        let mut store = store_with_stops(&["A", "B"]);

        assert!(!store.add_bus("empty", RouteKind::Return, vec![]));
        assert!(!store.add_bus("single", RouteKind::Return, vec![StopId(0)]));
        assert!(!store.add_bus("ghost", RouteKind::Circle, vec![StopId(0), StopId(7)]));

        assert_eq!(store.bus_count(), 0);
        assert!(store.buses_for_stop("A").is_empty());
        assert!(store.add_bus("ok", RouteKind::Return, vec![StopId(0), StopId(1)]));
    }

    #[test]
    fn test_unknown_lookups() {
        let store = store_with_stops(&["A"]);

        assert!(store.find_stop("Z").is_none());
        assert!(store.find_bus("Z").is_none());
        assert!(store.buses_for_stop("Z").is_empty());
        assert!(store.buses_for_stop("A").is_empty());
    }
}
