//! Snapshot and restore of a built router.
//!
//! A `RouterSnapshot` records the graph exactly as it was built: vertices
//! and edges in id order, the link descriptor of every tagged edge, the
//! outgoing edge order of every vertex and the full routing table.
//! Restoring replays vertices and edges in that order, which reproduces
//! the same ids and adjacency, then adopts the stored table as is. No
//! shortest paths are recomputed.

use crate::graph::{EdgeId, RoutingGraph, VertexId};
use crate::index::{RouteEntry, RoutingIndex};
use crate::link::LinkKey;
use crate::router::TransitRouter;
use crate::settings::{RoutingSettings, SettingsError};
use crate::vertex::VertexKey;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use transit_core::{CatalogueError, CatalogueSnapshot, StopId, TransitCatalogue};

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Corrupt routing state: {0}")]
    Corrupt(String),
    #[error("Catalogue error: {0}")]
    Catalogue(#[from] CatalogueError),
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("Stop {0} is not in the catalogue")]
    UnknownStop(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexEntry {
    pub position: usize,
    /// Catalogue id of the stop.
    pub stop: u32,
    pub bus: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeEntry {
    pub from: u32,
    pub to: u32,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub edge: u32,
    pub bus: String,
    pub from: u32,
    pub to: u32,
    pub span: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub weight: f64,
    pub prev_edge: Option<u32>,
}

/// Everything needed to rebuild a `TransitRouter` without recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterSnapshot {
    pub settings: RoutingSettings,
    pub vertex_count: usize,
    pub edge_count: usize,
    pub vertices: Vec<VertexEntry>,
    pub edges: Vec<EdgeEntry>,
    pub links: Vec<LinkEntry>,
    /// Outgoing edge ids of each vertex, in adjacency order.
    pub adjacency: Vec<Vec<u32>>,
    /// `routes[source][target]`
    pub routes: Vec<Vec<Option<IndexEntry>>>,
}

fn corrupt(message: impl Into<String>) -> PersistError {
    PersistError::Corrupt(message.into())
}

fn raw(index: usize) -> u32 {
    index as u32
}

impl TransitRouter {
    /// Copies the router into a snapshot.
    ///
    /// Stop names are stored as catalogue ids, so `catalogue` must be the
    /// one the router was built from.
    pub fn snapshot(&self, catalogue: &TransitCatalogue) -> Result<RouterSnapshot, PersistError> {
        let graph = &self.graph;

        let mut vertices = Vec::with_capacity(graph.vertex_count());
        for id in graph.vertex_ids() {
            let key = graph
                .vertex(id)
                .ok_or_else(|| corrupt(format!("vertex {} has no key", id.index())))?;
            let stop = catalogue
                .stop_id(&key.stop)
                .ok_or_else(|| PersistError::UnknownStop(key.stop.to_string()))?;
            vertices.push(VertexEntry {
                position: key.position,
                stop: stop.0,
                bus: key.bus.as_ref().map(|bus| bus.to_string()),
            });
        }

        let mut edges = Vec::with_capacity(graph.edge_count());
        let mut links = Vec::with_capacity(graph.link_count());
        for id in graph.edge_ids() {
            let (from, to, weight) = graph
                .edge(id)
                .ok_or_else(|| corrupt(format!("edge {} has no endpoints", id.index())))?;
            edges.push(EdgeEntry {
                from: raw(from.index()),
                to: raw(to.index()),
                weight,
            });

            if let Some(link) = graph.link(id) {
                links.push(LinkEntry {
                    edge: raw(id.index()),
                    bus: link.bus.to_string(),
                    from: raw(link.from.index()),
                    to: raw(link.to.index()),
                    span: link.span,
                });
            }
        }

        let adjacency = graph
            .vertex_ids()
            .map(|v| graph.outgoing(v).iter().map(|e| raw(e.index())).collect())
            .collect();

        let routes = self
            .index
            .table()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|entry| {
                        entry.map(|entry| IndexEntry {
                            weight: entry.weight,
                            prev_edge: entry.prev_edge.map(|e| raw(e.index())),
                        })
                    })
                    .collect()
            })
            .collect();

        Ok(RouterSnapshot {
            settings: self.settings,
            vertex_count: graph.vertex_count(),
            edge_count: graph.edge_count(),
            vertices,
            edges,
            links,
            adjacency,
            routes,
        })
    }

    /// Rebuilds a router from a snapshot taken against `catalogue`.
    ///
    /// Every id in the snapshot is checked before use; a snapshot that
    /// does not describe a consistent graph yields `PersistError::Corrupt`.
    pub fn restore(
        snapshot: &RouterSnapshot,
        catalogue: &TransitCatalogue,
    ) -> Result<Self, PersistError> {
        snapshot.settings.validate()?;

        if snapshot.vertices.len() != snapshot.vertex_count {
            return Err(corrupt(format!(
                "vertex count {} does not match {} vertex entries",
                snapshot.vertex_count,
                snapshot.vertices.len()
            )));
        }
        if snapshot.edges.len() != snapshot.edge_count {
            return Err(corrupt(format!(
                "edge count {} does not match {} edge entries",
                snapshot.edge_count,
                snapshot.edges.len()
            )));
        }

        let mut graph = RoutingGraph::new();
        restore_vertices(&mut graph, snapshot, catalogue)?;
        restore_edges(&mut graph, snapshot)?;
        restore_links(&mut graph, snapshot, catalogue)?;
        check_adjacency(&graph, snapshot)?;
        let index = restore_index(snapshot)?;

        debug!(
            "Restored routing graph: {} vertices, {} edges, {} links",
            graph.vertex_count(),
            graph.edge_count(),
            graph.link_count()
        );

        Ok(Self {
            settings: snapshot.settings,
            graph,
            index,
        })
    }
}

fn restore_vertices(
    graph: &mut RoutingGraph,
    snapshot: &RouterSnapshot,
    catalogue: &TransitCatalogue,
) -> Result<(), PersistError> {
    for (i, entry) in snapshot.vertices.iter().enumerate() {
        let stop = catalogue.stop(StopId(entry.stop)).ok_or_else(|| {
            corrupt(format!("vertex {} references unknown stop #{}", i, entry.stop))
        })?;

        let key = match &entry.bus {
            Some(bus) => {
                VertexKey::boarding(entry.position, stop.name.clone(), bus_name(catalogue, bus)?)
            }
            None if entry.position == 0 => VertexKey::platform(stop.name.clone()),
            None => {
                return Err(corrupt(format!(
                    "platform vertex {} has position {}",
                    i, entry.position
                )))
            }
        };

        let id = graph.register_vertex(key);
        if id.index() != i {
            return Err(corrupt(format!("vertex {} duplicates vertex {}", i, id.index())));
        }
    }

    Ok(())
}

fn restore_edges(graph: &mut RoutingGraph, snapshot: &RouterSnapshot) -> Result<(), PersistError> {
    for (i, entry) in snapshot.edges.iter().enumerate() {
        let from = vertex(snapshot, entry.from)?;
        let to = vertex(snapshot, entry.to)?;
        if !entry.weight.is_finite() || entry.weight < 0.0 {
            return Err(corrupt(format!("edge {} has weight {}", i, entry.weight)));
        }

        let id = graph.add_edge(from, to, entry.weight);
        if id.index() != i {
            return Err(corrupt(format!("edge {} restored as {}", i, id.index())));
        }
    }

    Ok(())
}

fn restore_links(
    graph: &mut RoutingGraph,
    snapshot: &RouterSnapshot,
    catalogue: &TransitCatalogue,
) -> Result<(), PersistError> {
    for entry in &snapshot.links {
        let id = edge(snapshot, entry.edge)?;
        let link = LinkKey::new(
            bus_name(catalogue, &entry.bus)?,
            vertex(snapshot, entry.from)?,
            vertex(snapshot, entry.to)?,
            entry.span,
        );

        if let Some((from, to, _)) = graph.edge(id) {
            if (from, to) != (link.from, link.to) {
                return Err(corrupt(format!(
                    "link of edge {} does not match its endpoints",
                    entry.edge
                )));
            }
        }

        if graph.store_link(link, id) != id {
            return Err(corrupt(format!("edge {} repeats an earlier link", entry.edge)));
        }
    }

    Ok(())
}

fn check_adjacency(graph: &RoutingGraph, snapshot: &RouterSnapshot) -> Result<(), PersistError> {
    if snapshot.adjacency.len() != graph.vertex_count() {
        return Err(corrupt(format!(
            "adjacency lists {} vertices, graph has {}",
            snapshot.adjacency.len(),
            graph.vertex_count()
        )));
    }

    for (v, expected) in graph.vertex_ids().zip(&snapshot.adjacency) {
        let actual: Vec<u32> = graph.outgoing(v).iter().map(|e| raw(e.index())).collect();
        if &actual != expected {
            return Err(corrupt(format!(
                "adjacency of vertex {} is {:?}, expected {:?}",
                v.index(),
                actual,
                expected
            )));
        }
    }

    Ok(())
}

fn restore_index(snapshot: &RouterSnapshot) -> Result<RoutingIndex, PersistError> {
    if snapshot.routes.len() != snapshot.vertex_count {
        return Err(corrupt(format!(
            "routing table has {} rows for {} vertices",
            snapshot.routes.len(),
            snapshot.vertex_count
        )));
    }

    let mut table = Vec::with_capacity(snapshot.routes.len());
    for (source, row) in snapshot.routes.iter().enumerate() {
        if row.len() != snapshot.vertex_count {
            return Err(corrupt(format!(
                "routing table row {} has {} entries",
                source,
                row.len()
            )));
        }

        let mut restored = Vec::with_capacity(row.len());
        for (target, entry) in row.iter().enumerate() {
            let entry = match entry {
                Some(entry) => {
                    if !entry.weight.is_finite() {
                        return Err(corrupt(format!("route weight {} from {}", entry.weight, source)));
                    }
                    let prev_edge = match entry.prev_edge {
                        Some(e) if target != source => {
                            let id = edge(snapshot, e)?;
                            // the last edge of a path must end at its target
                            let into = snapshot.edges[id.index()].to;
                            if into as usize != target {
                                return Err(corrupt(format!(
                                    "route {} -> {} ends with edge {} into vertex {}",
                                    source, target, e, into
                                )));
                            }
                            Some(id)
                        }
                        None if target == source => None,
                        _ => {
                            return Err(corrupt(format!(
                                "route {} -> {} has a malformed last edge",
                                source, target
                            )))
                        }
                    };
                    Some(RouteEntry {
                        weight: entry.weight,
                        prev_edge,
                    })
                }
                None => None,
            };
            restored.push(entry);
        }
        table.push(restored);
    }

    Ok(RoutingIndex::from_table(table))
}

fn vertex(snapshot: &RouterSnapshot, id: u32) -> Result<VertexId, PersistError> {
    if (id as usize) < snapshot.vertex_count {
        Ok(VertexId::new(id as usize))
    } else {
        Err(corrupt(format!("vertex id {} out of range", id)))
    }
}

fn edge(snapshot: &RouterSnapshot, id: u32) -> Result<EdgeId, PersistError> {
    if (id as usize) < snapshot.edge_count {
        Ok(EdgeId::new(id as usize))
    } else {
        Err(corrupt(format!("edge id {} out of range", id)))
    }
}

/// The catalogue's own copy of a bus name.
fn bus_name(catalogue: &TransitCatalogue, name: &str) -> Result<Arc<str>, PersistError> {
    catalogue
        .find_bus(name)
        .map(|bus| bus.name.clone())
        .ok_or_else(|| corrupt(format!("unknown bus {}", name)))
}

/// The full persisted state: catalogue plus router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitState {
    pub catalogue: CatalogueSnapshot,
    pub router: RouterSnapshot,
}

impl TransitState {
    pub fn capture(
        catalogue: &TransitCatalogue,
        router: &TransitRouter,
    ) -> Result<Self, PersistError> {
        Ok(Self {
            catalogue: catalogue.snapshot(),
            router: router.snapshot(catalogue)?,
        })
    }

    /// Rebuilds the catalogue first, then the router on top of it.
    pub fn restore(&self) -> Result<(TransitCatalogue, TransitRouter), PersistError> {
        let catalogue = TransitCatalogue::from_snapshot(&self.catalogue)?;
        let router = TransitRouter::restore(&self.router, &catalogue)?;
        Ok((catalogue, router))
    }
}
