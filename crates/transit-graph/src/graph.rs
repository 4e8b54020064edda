//! Core routing graph structure.
//!
//! `RoutingGraph` wraps a petgraph `DiGraph` whose edge weights are travel
//! times in minutes, and adds the indexes needed to find vertices by key
//! and edges by link descriptor.

use crate::link::LinkKey;
use crate::vertex::VertexKey;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use std::sync::Arc;

/// Unique identifier for a vertex, assigned in registration order.
pub type VertexId = NodeIndex;

/// Unique identifier for an edge, assigned in insertion order.
pub type EdgeId = EdgeIndex;

/// Directed travel-time graph over stop instances.
///
/// Once built it owns everything it needs for queries; it does not keep
/// the catalogue alive.
#[derive(Debug, Default)]
pub struct RoutingGraph {
    /// The underlying petgraph graph.
    pub(crate) graph: DiGraph<VertexKey, f64>,

    /// Maps vertex keys to vertex ids.
    vertex_index: HashMap<VertexKey, VertexId>,

    /// Maps stop names to their platform vertex.
    platform_index: HashMap<Arc<str>, VertexId>,

    /// Link descriptors in both directions.
    link_index: HashMap<LinkKey, EdgeId>,
    edge_links: HashMap<EdgeId, LinkKey>,
}

impl RoutingGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `key`, adding a vertex the first time it is seen.
    pub fn register_vertex(&mut self, key: VertexKey) -> VertexId {
        if let Some(&id) = self.vertex_index.get(&key) {
            return id;
        }

        let id = self.graph.add_node(key.clone());
        if key.is_platform() {
            self.platform_index.insert(key.stop.clone(), id);
        }
        self.vertex_index.insert(key, id);

        id
    }

    pub fn vertex_id(&self, key: &VertexKey) -> Option<VertexId> {
        self.vertex_index.get(key).copied()
    }

    /// The platform vertex of a stop.
    pub fn platform(&self, stop: &str) -> Option<VertexId> {
        self.platform_index.get(stop).copied()
    }

    pub fn vertex(&self, id: VertexId) -> Option<&VertexKey> {
        self.graph.node_weight(id)
    }

    /// Adds an edge. Parallel edges are allowed.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId, minutes: f64) -> EdgeId {
        self.graph.add_edge(from, to, minutes)
    }

    /// Finds the edge already registered for a link, if any.
    pub fn find_link(&self, link: &LinkKey) -> Option<EdgeId> {
        self.link_index.get(link).copied()
    }

    /// Tags `edge` with `link`.
    ///
    /// If the link is already registered the original edge id is returned
    /// and nothing changes.
    pub fn store_link(&mut self, link: LinkKey, edge: EdgeId) -> EdgeId {
        if let Some(&existing) = self.link_index.get(&link) {
            return existing;
        }

        self.link_index.insert(link.clone(), edge);
        self.edge_links.insert(edge, link);

        edge
    }

    /// The link descriptor of an edge.
    pub fn link(&self, edge: EdgeId) -> Option<&LinkKey> {
        self.edge_links.get(&edge)
    }

    /// Returns `(from, to, minutes)` for an edge.
    pub fn edge(&self, edge: EdgeId) -> Option<(VertexId, VertexId, f64)> {
        let (from, to) = self.graph.edge_endpoints(edge)?;
        let weight = self.graph.edge_weight(edge)?;
        Some((from, to, *weight))
    }

    /// Ids of the edges leaving a vertex, in adjacency order.
    pub fn outgoing(&self, vertex: VertexId) -> Vec<EdgeId> {
        self.graph.edges(vertex).map(|edge| edge.id()).collect()
    }

    /// Returns the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns the number of tagged edges.
    pub fn link_count(&self) -> usize {
        self.edge_links.len()
    }

    /// Iterates over vertex ids in registration order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.graph.node_indices()
    }

    /// Iterates over edge ids in insertion order.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.graph.edge_indices()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Arc<str> {
        Arc::from(s)
    }

    #[test]
    fn test_vertex_registration_is_deduplicated() {
        let mut graph = RoutingGraph::new();

        let a = graph.register_vertex(VertexKey::platform(name("A")));
        let a_on_bus = graph.register_vertex(VertexKey::boarding(0, name("A"), name("14")));
        let again = graph.register_vertex(VertexKey::platform(name("A")));

        assert_eq!(a, again);
        assert_ne!(a, a_on_bus);
        assert_eq!(a.index(), 0);
        assert_eq!(a_on_bus.index(), 1);
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.platform("A"), Some(a));
        assert_eq!(graph.platform("B"), None);
    }

    #[test]
    fn test_parallel_edges_are_kept() {
        let mut graph = RoutingGraph::new();
        let a = graph.register_vertex(VertexKey::platform(name("A")));
        let b = graph.register_vertex(VertexKey::platform(name("B")));

        let first = graph.add_edge(a, b, 1.0);
        let second = graph.add_edge(a, b, 2.0);

        assert_ne!(first, second);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edge(second), Some((a, b, 2.0)));
        // petgraph lists the newest outgoing edge first
        assert_eq!(graph.outgoing(a), vec![second, first]);
    }

    #[test]
    fn test_store_link_first_write_wins() {
        let mut graph = RoutingGraph::new();
        let a = graph.register_vertex(VertexKey::platform(name("A")));
        let b = graph.register_vertex(VertexKey::boarding(0, name("A"), name("1")));

        let link = LinkKey::new(name("1"), a, b, 0);
        assert_eq!(graph.find_link(&link), None);

        let edge = graph.add_edge(a, b, 6.0);
        assert_eq!(graph.store_link(link.clone(), edge), edge);

        let other = graph.add_edge(a, b, 6.0);
        assert_eq!(graph.store_link(link.clone(), other), edge);
        assert_eq!(graph.find_link(&link), Some(edge));
        assert_eq!(graph.link(edge), Some(&link));
        assert_eq!(graph.link(other), None);
        assert_eq!(graph.link_count(), 1);
    }
}
