//! Transit Core - Stop and bus route catalogue
//!
//! This crate owns every stop and bus route of a transit network and
//! answers the statistics questions that only need the catalogue itself.
//!
//! # Architecture
//!
//! The catalogue is built once and queried many times:
//! - `EntityStore` keeps stops and routes append-only, with stable ids
//!   and name indexes
//! - `DistanceTable` keeps directed road distances between stops
//! - `TransitCatalogue` ties both together behind a name-based API
//!
//! # Example
//!
//! ```
//! use transit_core::{Coordinates, RouteKind, TransitCatalogue};
//!
//! let mut catalogue = TransitCatalogue::new();
//! catalogue.add_stop("A", Coordinates::new(0.0, 0.0));
//! catalogue.add_stop("B", Coordinates::new(0.0, 0.001));
//! catalogue.set_distance("A", "B", 100);
//! catalogue.add_bus("1", RouteKind::Circle, &["A", "B", "A"]).unwrap();
//!
//! let info = catalogue.bus_info("1").unwrap();
//! assert_eq!(info.route_length, 200);
//! ```

mod catalogue;
mod distance;
mod entity;
pub mod error;
pub mod geo;
mod records;
mod snapshot;
mod stats;

pub use catalogue::TransitCatalogue;
pub use distance::DistanceTable;
pub use entity::{BusRoute, EntityStore, RouteKind, Stop, StopId};
pub use error::{CatalogueError, Result};
pub use geo::Coordinates;
pub use records::{BusRecord, IngestReport, StopRecord};
pub use snapshot::{BusEntry, CatalogueSnapshot, DistanceEntry, StopEntry};
pub use stats::BusInfo;
