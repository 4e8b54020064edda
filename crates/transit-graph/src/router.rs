//! Fastest itineraries between stops.

use crate::builder::RoutingGraphBuilder;
use crate::graph::{EdgeId, RoutingGraph};
use crate::index::RoutingIndex;
use crate::settings::RoutingSettings;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use transit_core::TransitCatalogue;

/// One step of an itinerary.
#[derive(Debug, Clone, PartialEq)]
pub enum ItineraryItem {
    /// Wait at a stop for a bus.
    Wait { stop: Arc<str>, time: f64 },

    /// Ride a bus over `span` consecutive stops.
    Ride { bus: Arc<str>, span: usize, time: f64 },
}

/// The fastest way from one stop to another.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    /// Total time in minutes.
    pub total_time: f64,
    /// Graph edges of the path, in travel order.
    pub edges: Vec<EdgeId>,
    pub items: Vec<ItineraryItem>,
}

/// The routing graph together with its shortest-path index.
#[derive(Debug)]
pub struct TransitRouter {
    pub(crate) settings: RoutingSettings,
    pub(crate) graph: RoutingGraph,
    pub(crate) index: RoutingIndex,
}

impl TransitRouter {
    /// Builds the routing graph for `catalogue` and precomputes all routes.
    pub fn build(catalogue: &TransitCatalogue, settings: RoutingSettings) -> Self {
        let start = Instant::now();

        let graph = RoutingGraphBuilder::new(catalogue, settings).build();
        let index = RoutingIndex::build(&graph);

        info!(
            "Routing ready: {} vertices, {} edges in {}ms",
            graph.vertex_count(),
            graph.edge_count(),
            start.elapsed().as_millis()
        );

        Self {
            settings,
            graph,
            index,
        }
    }

    /// Fastest itinerary between two stops, or `None` if there is no route.
    ///
    /// # Panics
    ///
    /// Panics if either stop has no platform vertex. Every stop of the
    /// catalogue the router was built from has one, so callers must check
    /// stop names against that catalogue first.
    pub fn build_route(&self, from: &str, to: &str) -> Option<Itinerary> {
        let source = self.platform_or_panic(from);
        let target = self.platform_or_panic(to);

        let route = self.index.route(&self.graph, source, target)?;

        let items = route
            .edges
            .iter()
            .map(|&edge| self.describe(edge))
            .collect();

        Some(Itinerary {
            total_time: route.weight,
            edges: route.edges,
            items,
        })
    }

    pub fn settings(&self) -> &RoutingSettings {
        &self.settings
    }

    pub fn graph(&self) -> &RoutingGraph {
        &self.graph
    }

    pub fn index(&self) -> &RoutingIndex {
        &self.index
    }

    fn platform_or_panic(&self, stop: &str) -> crate::graph::VertexId {
        match self.graph.platform(stop) {
            Some(id) => id,
            None => panic!("no platform vertex for stop {:?}", stop),
        }
    }

    fn describe(&self, edge: EdgeId) -> ItineraryItem {
        let (link, time) = match (self.graph.link(edge), self.graph.edge(edge)) {
            (Some(link), Some((_, _, time))) => (link, time),
            _ => panic!("edge {} on a route has no link descriptor", edge.index()),
        };

        if link.is_wait() {
            let stop = match self.graph.vertex(link.from) {
                Some(vertex) => vertex.stop.clone(),
                None => panic!("link of edge {} starts at a missing vertex", edge.index()),
            };
            ItineraryItem::Wait { stop, time }
        } else {
            ItineraryItem::Ride {
                bus: link.bus.clone(),
                span: link.span,
                time,
            }
        }
    }
}
