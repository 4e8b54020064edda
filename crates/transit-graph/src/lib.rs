//! Transit Graph - Fastest itineraries over the bus network
//!
//! This crate lowers a `TransitCatalogue` into a directed graph whose edge
//! weights are travel times in minutes, precomputes shortest paths from
//! every vertex, and persists the result so it can be reloaded without
//! recomputation.
//!
//! # Architecture
//!
//! The graph uses petgraph internally with additional indexes for:
//! - Vertex keys (stop, bus, position) to vertex ids
//! - Link descriptors (bus, from, to, span) to edge ids
//!
//! Every stop gets one platform vertex, where itineraries start and end.
//! Boarding a bus is an edge from a platform to a boarding vertex; riding
//! it is an edge from the boarding vertex to a later stop's platform.
//!
//! # Example
//!
//! ```
//! use transit_core::{Coordinates, RouteKind, TransitCatalogue};
//! use transit_graph::{RoutingSettings, TransitRouter};
//!
//! let mut catalogue = TransitCatalogue::new();
//! catalogue.add_stop("A", Coordinates::new(0.0, 0.0));
//! catalogue.add_stop("B", Coordinates::new(0.0, 0.001));
//! catalogue.set_distance("A", "B", 600);
//! catalogue.add_bus("1", RouteKind::Return, &["A", "B"]).unwrap();
//!
//! let settings = RoutingSettings::new(2, 36.0).unwrap();
//! let router = TransitRouter::build(&catalogue, settings);
//! let itinerary = router.build_route("A", "B").unwrap();
//! assert!((itinerary.total_time - 3.0).abs() < 1e-9);
//! ```

mod builder;
mod graph;
mod index;
mod link;
mod persist;
mod router;
mod settings;
mod store;
mod vertex;

pub use builder::RoutingGraphBuilder;
pub use graph::{EdgeId, RoutingGraph, VertexId};
pub use index::{RouteEntry, RouteInfo, RoutingIndex};
pub use link::LinkKey;
pub use persist::{
    EdgeEntry, IndexEntry, LinkEntry, PersistError, RouterSnapshot, TransitState, VertexEntry,
};
pub use router::{Itinerary, ItineraryItem, TransitRouter};
pub use settings::{RoutingSettings, SettingsError};
pub use store::{StoreError, TransitStore};
pub use vertex::VertexKey;
