//! Per-bus route statistics.

use crate::catalogue::TransitCatalogue;
use crate::entity::{RouteKind, StopId};
use crate::geo::compute_distance;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

/// Length, stop counts and curvature of one bus route.
#[derive(Debug, Clone, PartialEq)]
pub struct BusInfo {
    pub name: Arc<str>,
    pub kind: RouteKind,

    /// Stops visited along the whole trip. A there-and-back route over
    /// `n` stops visits `2n - 1`.
    pub stop_count: usize,

    /// Distinct stops on the route.
    pub unique_stop_count: usize,

    /// Road length in meters.
    pub route_length: u64,

    /// Great-circle length in meters.
    pub geo_length: f64,

    /// Consecutive stop pairs with no known road distance. They add
    /// nothing to `route_length`.
    pub missing_distances: usize,
}

impl BusInfo {
    /// Road length over geographic length.
    ///
    /// `None` when the route has no geographic length, since the ratio
    /// is undefined there.
    pub fn curvature(&self) -> Option<f64> {
        if self.geo_length > 0.0 && self.geo_length.is_finite() {
            Some(self.route_length as f64 / self.geo_length)
        } else {
            None
        }
    }
}

impl TransitCatalogue {
    /// Computes statistics for a bus, or `None` if the bus is unknown.
    pub fn bus_info(&self, name: &str) -> Option<BusInfo> {
        let route = self.find_bus(name)?;

        let unique_stop_count = route.stops.iter().collect::<HashSet<&StopId>>().len();

        let mut geo_length = 0.0;
        let mut route_length = 0u64;
        let mut missing_distances = 0;

        let mut add_road = |from: StopId, to: StopId| match self.distance_between(from, to) {
            Some(meters) => route_length += u64::from(meters),
            None => missing_distances += 1,
        };

        for pair in route.stops.windows(2) {
            let (from, to) = (pair[0], pair[1]);

            if let (Some(a), Some(b)) = (self.stop(from), self.stop(to)) {
                geo_length += compute_distance(a.coordinates, b.coordinates);
            }

            add_road(from, to);
            if route.kind == RouteKind::Return {
                // the way back may differ from the way there
                add_road(to, from);
            }
        }

        let mut stop_count = route.stops.len();
        if route.kind == RouteKind::Return {
            stop_count = stop_count * 2 - 1;
            geo_length *= 2.0;
        }

        if missing_distances > 0 {
            warn!(
                "Bus {}: {} stop pair(s) without road distance",
                route.name, missing_distances
            );
        }

        Some(BusInfo {
            name: route.name.clone(),
            kind: route.kind,
            stop_count,
            unique_stop_count,
            route_length,
            geo_length,
            missing_distances,
        })
    }
}
