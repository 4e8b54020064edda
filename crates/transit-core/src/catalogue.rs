//! The transit catalogue.
//!
//! `TransitCatalogue` combines the entity store with the distance table
//! and exposes everything by name, which is how ingestion and queries
//! refer to stops and buses.

use crate::distance::DistanceTable;
use crate::entity::{BusRoute, EntityStore, RouteKind, Stop, StopId};
use crate::error::{CatalogueError, Result};
use crate::geo::Coordinates;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Stops, bus routes and the road distances between stops.
#[derive(Debug, Default)]
pub struct TransitCatalogue {
    pub(crate) entities: EntityStore,
    pub(crate) distances: DistanceTable,
}

impl TransitCatalogue {
    /// Creates an empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stop, or returns the id of the existing stop with this name.
    pub fn add_stop(&mut self, name: &str, coordinates: Coordinates) -> StopId {
        self.entities.add_stop(name, coordinates)
    }

    pub fn find_stop(&self, name: &str) -> Option<&Stop> {
        self.entities.find_stop(name)
    }

    pub fn stop(&self, id: StopId) -> Option<&Stop> {
        self.entities.stop(id)
    }

    pub fn stop_id(&self, name: &str) -> Option<StopId> {
        self.entities.stop_id(name)
    }

    pub fn stop_name(&self, id: StopId) -> Option<&str> {
        self.entities.stop_name(id)
    }

    /// Adds a bus route over the named stops.
    ///
    /// Returns `Ok(false)` if the bus already exists. Routes with fewer
    /// than two stops, or naming a stop the catalogue does not know, are
    /// rejected and never stored.
    pub fn add_bus(&mut self, name: &str, kind: RouteKind, stops: &[&str]) -> Result<bool> {
        if stops.len() < 2 {
            warn!("Rejecting bus {}: only {} stop(s)", name, stops.len());
            return Err(CatalogueError::TooFewStops {
                bus: name.to_string(),
                count: stops.len(),
            });
        }

        let ids = stops
            .iter()
            .map(|stop| {
                self.entities
                    .stop_id(stop)
                    .ok_or_else(|| CatalogueError::UnknownStop(stop.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let added = self.add_bus_by_ids(name, kind, ids);
        if !added {
            debug!("Bus {} already present, keeping the first definition", name);
        }
        Ok(added)
    }

    /// Adds a bus route over already resolved stop ids.
    pub(crate) fn add_bus_by_ids(&mut self, name: &str, kind: RouteKind, stops: Vec<StopId>) -> bool {
        self.entities.add_bus(name, kind, stops)
    }

    pub fn find_bus(&self, name: &str) -> Option<&BusRoute> {
        self.entities.find_bus(name)
    }

    /// Names of the buses serving a stop, sorted. Empty for unknown stops.
    pub fn buses_for_stop(&self, name: &str) -> &BTreeSet<Arc<str>> {
        self.entities.buses_for_stop(name)
    }

    /// Sets the road distance `from -> to` in meters.
    ///
    /// Returns false if either stop is unknown. The reverse direction is
    /// seeded with the same value unless it already has one.
    pub fn set_distance(&mut self, from: &str, to: &str, meters: u32) -> bool {
        match (self.entities.stop_id(from), self.entities.stop_id(to)) {
            (Some(from), Some(to)) => {
                self.distances.set(from, to, meters);
                true
            }
            _ => false,
        }
    }

    /// Road distance `from -> to`, if both stops and the pair are known.
    pub fn distance(&self, from: &str, to: &str) -> Option<u32> {
        let from = self.entities.stop_id(from)?;
        let to = self.entities.stop_id(to)?;
        self.distances.get(from, to)
    }

    pub fn distance_between(&self, from: StopId, to: StopId) -> Option<u32> {
        self.distances.get(from, to)
    }

    pub fn distances(&self) -> &DistanceTable {
        &self.distances
    }

    /// Iterates over stops in id order.
    pub fn stops(&self) -> impl Iterator<Item = &Stop> {
        self.entities.stops()
    }

    /// Iterates over bus routes in insertion order.
    pub fn buses(&self) -> impl Iterator<Item = &BusRoute> {
        self.entities.buses()
    }

    pub fn stop_count(&self) -> usize {
        self.entities.stop_count()
    }

    pub fn bus_count(&self) -> usize {
        self.entities.bus_count()
    }
}
