//! Raw stop and bus records, and the batch ingestion that loads them.

use crate::catalogue::TransitCatalogue;
use crate::entity::RouteKind;
use crate::geo::Coordinates;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// A stop as supplied by the input document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StopRecord {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,

    /// Road distances in meters from this stop to others.
    #[serde(default)]
    pub road_distances: BTreeMap<String, u32>,
}

/// A bus as supplied by the input document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BusRecord {
    pub name: String,
    pub stops: Vec<String>,
    pub is_roundtrip: bool,
}

impl BusRecord {
    pub fn kind(&self) -> RouteKind {
        if self.is_roundtrip {
            RouteKind::Circle
        } else {
            RouteKind::Return
        }
    }
}

/// Outcome of a batch ingestion.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub stops_added: usize,
    pub distances_set: usize,
    pub buses_added: usize,
    /// Rejected records as `(record name, reason)`.
    pub errors: Vec<(String, String)>,
}

impl TransitCatalogue {
    /// Loads stops, then distances, then buses.
    ///
    /// Distances and buses may name stops that appear later in `stops`.
    /// Records that cannot be applied are logged, listed in the report and
    /// skipped.
    pub fn ingest(&mut self, stops: &[StopRecord], buses: &[BusRecord]) -> IngestReport {
        let mut report = IngestReport::default();

        let before = self.stop_count();
        for stop in stops {
            self.add_stop(&stop.name, Coordinates::new(stop.latitude, stop.longitude));
        }
        report.stops_added = self.stop_count() - before;

        for stop in stops {
            for (other, &meters) in &stop.road_distances {
                if self.set_distance(&stop.name, other, meters) {
                    report.distances_set += 1;
                } else {
                    warn!("Skipping distance {} -> {}: unknown stop", stop.name, other);
                    report
                        .errors
                        .push((stop.name.clone(), format!("unknown stop in distance: {}", other)));
                }
            }
        }

        for bus in buses {
            let stop_names: Vec<&str> = bus.stops.iter().map(String::as_str).collect();
            match self.add_bus(&bus.name, bus.kind(), &stop_names) {
                Ok(true) => report.buses_added += 1,
                Ok(false) => {
                    warn!("Skipping duplicate bus {}", bus.name);
                    report
                        .errors
                        .push((bus.name.clone(), "duplicate bus".to_string()));
                }
                Err(e) => {
                    warn!("Skipping bus {}: {}", bus.name, e);
                    report.errors.push((bus.name.clone(), e.to_string()));
                }
            }
        }

        info!(
            "Ingested {} stops, {} distances, {} buses ({} rejected)",
            report.stops_added,
            report.distances_set,
            report.buses_added,
            report.errors.len()
        );

        report
    }
}
