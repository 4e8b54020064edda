//! Vertex keys of the routing graph.

use std::sync::Arc;

/// Identifies a vertex of the routing graph.
///
/// A platform vertex stands for "waiting at a stop" and has position 0 and
/// no bus. A boarding vertex stands for "on bus `bus` at `stop`, which is
/// the `position`-th stop of its trip".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexKey {
    pub position: usize,
    pub stop: Arc<str>,
    pub bus: Option<Arc<str>>,
}

impl VertexKey {
    pub fn platform(stop: Arc<str>) -> Self {
        Self {
            position: 0,
            stop,
            bus: None,
        }
    }

    pub fn boarding(position: usize, stop: Arc<str>, bus: Arc<str>) -> Self {
        Self {
            position,
            stop,
            bus: Some(bus),
        }
    }

    pub fn is_platform(&self) -> bool {
        self.bus.is_none()
    }
}

impl std::fmt::Display for VertexKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.bus {
            Some(bus) => write!(f, "{}@{}[{}]", self.stop, bus, self.position),
            None => write!(f, "{}", self.stop),
        }
    }
}
