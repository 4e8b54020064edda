//! Precomputed shortest paths over the routing graph.
//!
//! The index runs Dijkstra once from every vertex and keeps, for each
//! `(source, target)` pair, the best total weight and the last edge of the
//! best path. Paths are rebuilt by walking those edges backwards.

use crate::graph::{EdgeId, RoutingGraph, VertexId};
use petgraph::visit::EdgeRef;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::debug;

/// Best known way to reach a target from a source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteEntry {
    /// Total weight of the path in minutes.
    pub weight: f64,
    /// Last edge of the path; `None` only when source and target coincide.
    pub prev_edge: Option<EdgeId>,
}

/// A shortest path between two vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteInfo {
    pub weight: f64,
    pub edges: Vec<EdgeId>,
}

#[derive(Clone, Copy)]
struct ToVisit {
    cost: f64,
    vertex: VertexId,
}

// Reversed so that BinaryHeap pops the cheapest vertex first
impl Ord for ToVisit {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for ToVisit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ToVisit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ToVisit {}

/// All-pairs shortest path table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingIndex {
    routes: Vec<Vec<Option<RouteEntry>>>,
}

impl RoutingIndex {
    /// Computes the table for every vertex of `graph`.
    pub fn build(graph: &RoutingGraph) -> Self {
        let routes = graph
            .vertex_ids()
            .map(|source| shortest_from(graph, source))
            .collect();

        debug!("Routing index built for {} sources", graph.vertex_count());

        Self { routes }
    }

    /// Wraps an already computed table. The caller vouches for it matching
    /// the graph it will be queried with.
    pub(crate) fn from_table(routes: Vec<Vec<Option<RouteEntry>>>) -> Self {
        Self { routes }
    }

    pub(crate) fn table(&self) -> &[Vec<Option<RouteEntry>>] {
        &self.routes
    }

    pub fn entry(&self, from: VertexId, to: VertexId) -> Option<&RouteEntry> {
        self.routes.get(from.index())?.get(to.index())?.as_ref()
    }

    /// The shortest path `from -> to`, or `None` if `to` is unreachable.
    ///
    /// # Panics
    ///
    /// Panics if the table references an edge that `graph` does not have,
    /// or if its last-edge chain loops, which means the index and the graph
    /// are out of sync.
    pub fn route(&self, graph: &RoutingGraph, from: VertexId, to: VertexId) -> Option<RouteInfo> {
        let entry = self.entry(from, to)?;

        let mut edges = Vec::new();
        let mut prev = entry.prev_edge;
        while let Some(edge) = prev {
            // a simple path never has more edges than the graph has vertices
            if edges.len() >= self.routes.len() {
                panic!(
                    "routing index and graph are out of sync: route {} -> {} does not terminate",
                    from.index(),
                    to.index()
                );
            }
            edges.push(edge);
            let (source, _, _) = match graph.edge(edge) {
                Some(endpoints) => endpoints,
                None => panic!(
                    "routing index and graph are out of sync: missing edge {}",
                    edge.index()
                ),
            };
            prev = self.entry(from, source).and_then(|e| e.prev_edge);
        }
        edges.reverse();

        Some(RouteInfo {
            weight: entry.weight,
            edges,
        })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Dijkstra from one source over non-negative weights.
fn shortest_from(graph: &RoutingGraph, source: VertexId) -> Vec<Option<RouteEntry>> {
    let mut best: Vec<Option<RouteEntry>> = vec![None; graph.vertex_count()];
    let mut visitq = BinaryHeap::new();

    best[source.index()] = Some(RouteEntry {
        weight: 0.0,
        prev_edge: None,
    });
    visitq.push(ToVisit {
        cost: 0.0,
        vertex: source,
    });

    while let Some(ToVisit { cost, vertex }) = visitq.pop() {
        // stale queue entry, a cheaper path was already settled
        if matches!(best[vertex.index()], Some(entry) if cost > entry.weight) {
            continue;
        }

        for edge in graph.graph.edges(vertex) {
            let target = edge.target();
            let weight = cost + *edge.weight();

            let improves = match best[target.index()] {
                Some(entry) => weight < entry.weight,
                None => true,
            };
            if improves {
                best[target.index()] = Some(RouteEntry {
                    weight,
                    prev_edge: Some(edge.id()),
                });
                visitq.push(ToVisit {
                    cost: weight,
                    vertex: target,
                });
            }
        }
    }

    best
}
