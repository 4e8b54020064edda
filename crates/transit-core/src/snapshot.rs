//! Owned, serializable copies of the catalogue.
//!
//! A snapshot lists stops in id order and buses in insertion order, so
//! restoring it through the normal insertion path reproduces the same ids.

use crate::catalogue::TransitCatalogue;
use crate::entity::{RouteKind, StopId};
use crate::error::{CatalogueError, Result};
use crate::geo::Coordinates;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopEntry {
    pub id: u32,
    pub name: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceEntry {
    pub from: u32,
    pub to: u32,
    pub meters: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusEntry {
    pub name: String,
    pub kind: RouteKind,
    pub stops: Vec<u32>,
}

/// Everything needed to rebuild a `TransitCatalogue`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogueSnapshot {
    pub stops: Vec<StopEntry>,
    pub distances: Vec<DistanceEntry>,
    pub buses: Vec<BusEntry>,
}

impl TransitCatalogue {
    /// Copies the catalogue into a snapshot. The catalogue is left untouched.
    pub fn snapshot(&self) -> CatalogueSnapshot {
        let stops = self
            .stops()
            .map(|stop| StopEntry {
                id: stop.id.0,
                name: stop.name.to_string(),
                coordinates: stop.coordinates,
            })
            .collect();

        let distances = self
            .distances
            .entries()
            .into_iter()
            .map(|(from, to, meters)| DistanceEntry {
                from: from.0,
                to: to.0,
                meters,
            })
            .collect();

        let buses = self
            .buses()
            .map(|bus| BusEntry {
                name: bus.name.to_string(),
                kind: bus.kind,
                stops: bus.stops.iter().map(|id| id.0).collect(),
            })
            .collect();

        CatalogueSnapshot {
            stops,
            distances,
            buses,
        }
    }

    /// Rebuilds a catalogue from a snapshot.
    ///
    /// Fails if the snapshot is inconsistent: ids out of order, duplicate
    /// names, or references to stops it does not contain.
    pub fn from_snapshot(snapshot: &CatalogueSnapshot) -> Result<Self> {
        let mut catalogue = TransitCatalogue::new();

        for entry in &snapshot.stops {
            let id = catalogue.add_stop(&entry.name, entry.coordinates);
            if id != StopId(entry.id) {
                return Err(CatalogueError::CorruptSnapshot(format!(
                    "stop {} restored as {} instead of #{}",
                    entry.name, id, entry.id
                )));
            }
        }

        let known = |id: u32| -> Result<StopId> {
            let id = StopId(id);
            if id.index() < snapshot.stops.len() {
                Ok(id)
            } else {
                Err(CatalogueError::CorruptSnapshot(format!(
                    "reference to missing stop {}",
                    id
                )))
            }
        };

        for entry in &snapshot.distances {
            let (from, to) = (known(entry.from)?, known(entry.to)?);
            catalogue.distances.insert_exact(from, to, entry.meters);
        }

        for entry in &snapshot.buses {
            if entry.stops.len() < 2 {
                return Err(CatalogueError::CorruptSnapshot(format!(
                    "bus {} has {} stop(s)",
                    entry.name,
                    entry.stops.len()
                )));
            }
            let stops = entry
                .stops
                .iter()
                .map(|&id| known(id))
                .collect::<Result<Vec<_>>>()?;
            if !catalogue.add_bus_by_ids(&entry.name, entry.kind, stops) {
                return Err(CatalogueError::CorruptSnapshot(format!(
                    "duplicate bus {}",
                    entry.name
                )));
            }
        }

        debug!(
            "Restored catalogue: {} stops, {} distances, {} buses",
            catalogue.stop_count(),
            catalogue.distances.len(),
            catalogue.bus_count()
        );

        Ok(catalogue)
    }
}
