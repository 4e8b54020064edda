//! Lowering of bus routes into the routing graph.
//!
//! Each route becomes one or two directed walks over its stops:
//! - a loop route is walked once, front to back
//! - a there-and-back route is walked forward, then backward, with the
//!   backward walk using the reverse-direction road distances
//!
//! For every stop of a walk where a passenger can board, the builder adds
//! a wait edge from the stop's platform to a boarding vertex, and a ride
//! edge from that boarding vertex to the platform of every later stop of
//! the walk, weighted by the accumulated travel time.

use crate::graph::{RoutingGraph, VertexId};
use crate::link::LinkKey;
use crate::settings::RoutingSettings;
use crate::vertex::VertexKey;
use std::sync::Arc;
use tracing::{debug, warn};
use transit_core::geo::compute_distance;
use transit_core::{BusRoute, RouteKind, StopId, TransitCatalogue};

/// One stop of a directed walk: its position in the trip and the stop.
type WalkStop = (usize, StopId);

/// Builds a `RoutingGraph` from a catalogue.
///
/// The builder borrows the catalogue only while building; the finished
/// graph is self-contained.
pub struct RoutingGraphBuilder<'a> {
    catalogue: &'a TransitCatalogue,
    settings: RoutingSettings,
    graph: RoutingGraph,
}

impl<'a> RoutingGraphBuilder<'a> {
    pub fn new(catalogue: &'a TransitCatalogue, settings: RoutingSettings) -> Self {
        Self {
            catalogue,
            settings,
            graph: RoutingGraph::new(),
        }
    }

    /// Lowers every stop and bus and returns the graph.
    ///
    /// Platform vertices are registered first, in stop id order, so the
    /// platform of stop `#n` is vertex `n`.
    pub fn build(mut self) -> RoutingGraph {
        let catalogue = self.catalogue;

        for stop in catalogue.stops() {
            self.graph.register_vertex(VertexKey::platform(stop.name.clone()));
        }

        for bus in catalogue.buses() {
            match bus.kind {
                RouteKind::Circle => self.lower_circle(bus),
                RouteKind::Return => self.lower_return(bus),
            }
        }

        debug!(
            "Routing graph: {} vertices, {} edges",
            self.graph.vertex_count(),
            self.graph.edge_count()
        );

        self.graph
    }

    fn lower_circle(&mut self, bus: &BusRoute) {
        let walk: Vec<WalkStop> = bus.stops.iter().copied().enumerate().collect();
        self.lower_walk(&bus.name, &walk);
    }

    fn lower_return(&mut self, bus: &BusRoute) {
        let forward: Vec<WalkStop> = bus.stops.iter().copied().enumerate().collect();
        self.lower_walk(&bus.name, &forward);

        // positions continue past the turnaround: n-1, n, ..., 2n-2
        let turnaround = bus.stops.len().saturating_sub(1);
        let backward: Vec<WalkStop> = bus
            .stops
            .iter()
            .rev()
            .copied()
            .enumerate()
            .map(|(offset, stop)| (turnaround + offset, stop))
            .collect();
        self.lower_walk(&bus.name, &backward);
    }

    /// Adds wait and ride edges for one directed walk.
    ///
    /// Passengers can board anywhere but at the last stop of the walk.
    fn lower_walk(&mut self, bus: &Arc<str>, walk: &[WalkStop]) {
        let segments: Vec<f64> = walk
            .windows(2)
            .map(|pair| self.segment_time(bus, pair[0].1, pair[1].1))
            .collect();

        for (i, &(position, stop)) in walk.iter().enumerate().take(walk.len().saturating_sub(1)) {
            let stop_name = self.stop_name(stop);
            let platform = self.platform(stop);
            let boarding = self.graph.register_vertex(VertexKey::boarding(
                position,
                stop_name,
                bus.clone(),
            ));

            self.connect(
                LinkKey::new(bus.clone(), platform, boarding, 0),
                self.settings.wait_time(),
            );

            let mut minutes = 0.0;
            for (j, &(_, target)) in walk.iter().enumerate().skip(i + 1) {
                minutes += segments[j - 1];
                let to = self.platform(target);
                self.connect(LinkKey::new(bus.clone(), boarding, to, j - i), minutes);
            }
        }
    }

    /// Adds an edge for `link` unless the link already has one.
    fn connect(&mut self, link: LinkKey, minutes: f64) {
        if self.graph.find_link(&link).is_some() {
            return;
        }

        let edge = self.graph.add_edge(link.from, link.to, minutes);
        self.graph.store_link(link, edge);
    }

    /// Minutes to ride between two consecutive stops.
    ///
    /// Falls back to the great-circle distance when no road distance is
    /// known for the pair.
    fn segment_time(&self, bus: &str, from: StopId, to: StopId) -> f64 {
        let meters = match self.catalogue.distance_between(from, to) {
            Some(meters) => f64::from(meters),
            None => {
                let (a, b) = match (self.catalogue.stop(from), self.catalogue.stop(to)) {
                    (Some(a), Some(b)) => (a, b),
                    _ => panic!("bus {} references stops missing from the catalogue", bus),
                };
                warn!(
                    "Bus {}: no road distance {} -> {}, using great-circle distance",
                    bus, a.name, b.name
                );
                compute_distance(a.coordinates, b.coordinates)
            }
        };

        self.settings.travel_time(meters)
    }

    fn stop_name(&self, stop: StopId) -> Arc<str> {
        match self.catalogue.stop(stop) {
            Some(stop) => stop.name.clone(),
            None => panic!("bus references stop {} missing from the catalogue", stop),
        }
    }

    fn platform(&self, stop: StopId) -> VertexId {
        let name = self.stop_name(stop);
        match self.graph.platform(&name) {
            Some(id) => id,
            None => panic!("stop {} has no platform vertex", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transit_core::Coordinates;

    fn settings() -> RoutingSettings {
        RoutingSettings::new(5, 3.6).unwrap()
    }

    fn line_network() -> TransitCatalogue {
        let mut catalogue = TransitCatalogue::new();
        catalogue.add_stop("A", Coordinates::new(0.0, 0.0));
        catalogue.add_stop("B", Coordinates::new(0.0, 0.001));
        catalogue.add_stop("C", Coordinates::new(0.0, 0.002));
        catalogue.set_distance("A", "B", 100);
        catalogue.set_distance("B", "C", 100);
        catalogue
    }

    #[test]
    fn test_every_stop_gets_a_platform() {
        let mut catalogue = line_network();
        catalogue.add_stop("Lonely", Coordinates::new(1.0, 1.0));

        let graph = RoutingGraphBuilder::new(&catalogue, settings()).build();

        assert_eq!(graph.vertex_count(), 4);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.platform("Lonely").map(|v| v.index()), Some(3));
        assert_eq!(graph.platform("A").map(|v| v.index()), Some(0));
    }

    #[test]
    fn test_circle_route_edges() {
        let mut catalogue = line_network();
        catalogue
            .add_bus("1", RouteKind::Circle, &["A", "B", "C"])
            .unwrap();

        let graph = RoutingGraphBuilder::new(&catalogue, settings()).build();

        // boarding at A and B; no boarding at the final stop
        assert_eq!(graph.vertex_count(), 5);
        // 2 wait edges + rides A->B, A->C, B->C
        assert_eq!(graph.edge_count(), 5);

        let bus: Arc<str> = Arc::from("1");
        let boarding_a = graph
            .vertex_id(&VertexKey::boarding(0, Arc::from("A"), bus.clone()))
            .unwrap();
        let c = graph.platform("C").unwrap();

        let ride = graph
            .find_link(&LinkKey::new(bus.clone(), boarding_a, c, 2))
            .unwrap();
        let (_, _, minutes) = graph.edge(ride).unwrap();
        assert!((minutes - 200.0 / 60.0).abs() < 1e-9);

        let wait = graph
            .find_link(&LinkKey::new(bus, graph.platform("A").unwrap(), boarding_a, 0))
            .unwrap();
        assert_eq!(graph.edge(wait).unwrap().2, 5.0);
    }

    #[test]
    fn test_return_route_uses_reverse_distances() {
        let mut catalogue = line_network();
        catalogue.set_distance("C", "B", 300);
        catalogue
            .add_bus("2", RouteKind::Return, &["A", "B", "C"])
            .unwrap();

        let graph = RoutingGraphBuilder::new(&catalogue, settings()).build();

        // platforms + forward boarding at 0,1 + backward boarding at 2,3
        assert_eq!(graph.vertex_count(), 7);
        // each walk: 2 waits + 3 rides
        assert_eq!(graph.edge_count(), 10);

        let bus: Arc<str> = Arc::from("2");
        let turnaround = graph
            .vertex_id(&VertexKey::boarding(2, Arc::from("C"), bus.clone()))
            .unwrap();
        let a = graph.platform("A").unwrap();
        let ride = graph
            .find_link(&LinkKey::new(bus.clone(), turnaround, a, 2))
            .unwrap();

        // C->B 300 m, B->A 100 m
        assert!((graph.edge(ride).unwrap().2 - 400.0 / 60.0).abs() < 1e-9);

        let back_at_b = VertexKey::boarding(3, Arc::from("B"), bus);
        assert!(graph.vertex_id(&back_at_b).is_some());
    }

    #[test]
    fn test_missing_distance_falls_back_to_geography() {
        let mut catalogue = line_network();
        catalogue.add_stop("D", Coordinates::new(0.0, 0.003));
        catalogue
            .add_bus("3", RouteKind::Circle, &["C", "D"])
            .unwrap();

        let graph = RoutingGraphBuilder::new(&catalogue, settings()).build();

        let bus: Arc<str> = Arc::from("3");
        let boarding = graph
            .vertex_id(&VertexKey::boarding(0, Arc::from("C"), bus.clone()))
            .unwrap();
        let d = graph.platform("D").unwrap();
        let ride = graph.find_link(&LinkKey::new(bus, boarding, d, 1)).unwrap();

        let minutes = graph.edge(ride).unwrap().2;
        assert!((minutes - 111.195 / 60.0).abs() < 0.01);
    }
}
