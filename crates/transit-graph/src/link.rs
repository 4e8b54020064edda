//! Link descriptors for routing graph edges.
//!
//! Every edge the builder adds is tagged with the bus and hop span it
//! stands for, so a path of edge ids can be turned back into "wait here,
//! ride bus B for N stops".

use crate::graph::VertexId;
use std::sync::Arc;

/// The logical hop an edge represents.
///
/// A span of 0 marks a boarding (wait) edge; a positive span is a ride
/// over that many consecutive stops.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkKey {
    pub bus: Arc<str>,
    pub from: VertexId,
    pub to: VertexId,
    pub span: usize,
}

impl LinkKey {
    pub fn new(bus: Arc<str>, from: VertexId, to: VertexId, span: usize) -> Self {
        Self {
            bus,
            from,
            to,
            span,
        }
    }

    pub fn is_wait(&self) -> bool {
        self.span == 0
    }
}
