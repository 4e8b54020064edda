//! JSON documents read and written by the CLI.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use transit_core::{BusRecord, StopRecord, TransitCatalogue};
use transit_graph::{ItineraryItem, RoutingSettings, TransitRouter};

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to read {0}: {1}")]
    Read(String, #[source] io::Error),
    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SerializationSettings {
    /// Directory of the on-disk state store.
    pub file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum BaseRequest {
    Stop(StopRecord),
    Bus(BusRecord),
}

/// Input of `make-base`. Unknown sections are ignored.
///
/// Base requests stay raw JSON here so that one malformed record does not
/// reject the whole document; `records` decodes them one by one.
#[derive(Debug, Deserialize)]
pub struct BaseDocument {
    #[serde(default)]
    pub base_requests: Vec<Value>,
    pub routing_settings: RoutingSettings,
    pub serialization_settings: SerializationSettings,
}

/// Decoded base requests, in document order.
#[derive(Debug, Default)]
pub struct BaseRecords {
    pub stops: Vec<StopRecord>,
    pub buses: Vec<BusRecord>,
    /// Records that could not be decoded, as `(record name, reason)`.
    pub rejected: Vec<(String, String)>,
}

impl BaseDocument {
    /// Splits base requests into stop and bus records, skipping the ones
    /// that do not decode.
    pub fn records(&self) -> BaseRecords {
        let mut records = BaseRecords::default();

        for (i, raw) in self.base_requests.iter().enumerate() {
            match BaseRequest::deserialize(raw) {
                Ok(BaseRequest::Stop(stop)) => records.stops.push(stop),
                Ok(BaseRequest::Bus(bus)) => records.buses.push(bus),
                Err(e) => {
                    let name = match raw.get("name").and_then(Value::as_str) {
                        Some(name) => name.to_string(),
                        None => format!("base_requests[{}]", i),
                    };
                    warn!("Skipping malformed record {}: {}", name, e);
                    records.rejected.push((name, e.to_string()));
                }
            }
        }

        records
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum StatRequest {
    Bus { id: i64, name: String },
    Stop { id: i64, name: String },
    Route { id: i64, from: String, to: String },
}

impl StatRequest {
    pub fn id(&self) -> i64 {
        match self {
            Self::Bus { id, .. } | Self::Stop { id, .. } | Self::Route { id, .. } => *id,
        }
    }
}

/// Input of `process-requests`.
#[derive(Debug, Deserialize)]
pub struct RequestDocument {
    pub serialization_settings: SerializationSettings,
    #[serde(default)]
    pub stat_requests: Vec<StatRequest>,
}

/// Reads a JSON document from `input`, or from stdin if there is none.
pub fn read_document<T: DeserializeOwned>(input: Option<&Path>) -> Result<T, DocumentError> {
    let text = match input {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| DocumentError::Read(path.display().to_string(), e))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| DocumentError::Read("stdin".to_string(), e))?;
            text
        }
    };

    Ok(serde_json::from_str(&text)?)
}

fn not_found(id: i64) -> Value {
    json!({
        "request_id": id,
        "error_message": "not found"
    })
}

/// Answers one request.
pub fn answer(catalogue: &TransitCatalogue, router: &TransitRouter, request: &StatRequest) -> Value {
    match request {
        StatRequest::Bus { id, name } => answer_bus(catalogue, *id, name),
        StatRequest::Stop { id, name } => answer_stop(catalogue, *id, name),
        StatRequest::Route { id, from, to } => answer_route(catalogue, router, *id, from, to),
    }
}

fn answer_bus(catalogue: &TransitCatalogue, id: i64, name: &str) -> Value {
    let Some(info) = catalogue.bus_info(name) else {
        return not_found(id);
    };
    let Some(curvature) = info.curvature() else {
        warn!("Bus {} has no geographic length, curvature is undefined", name);
        return not_found(id);
    };

    json!({
        "request_id": id,
        "curvature": curvature,
        "route_length": info.route_length,
        "stop_count": info.stop_count,
        "unique_stop_count": info.unique_stop_count
    })
}

fn answer_stop(catalogue: &TransitCatalogue, id: i64, name: &str) -> Value {
    if catalogue.find_stop(name).is_none() {
        return not_found(id);
    }

    let buses: Vec<&str> = catalogue.buses_for_stop(name).iter().map(|b| &**b).collect();
    json!({
        "request_id": id,
        "buses": buses
    })
}

fn answer_route(
    catalogue: &TransitCatalogue,
    router: &TransitRouter,
    id: i64,
    from: &str,
    to: &str,
) -> Value {
    // the router treats unknown stops as fatal
    if catalogue.find_stop(from).is_none() || catalogue.find_stop(to).is_none() {
        return not_found(id);
    }

    let Some(itinerary) = router.build_route(from, to) else {
        return not_found(id);
    };

    let items: Vec<Value> = itinerary
        .items
        .iter()
        .map(|item| match item {
            ItineraryItem::Wait { stop, time } => json!({
                "type": "Wait",
                "stop_name": &**stop,
                "time": time
            }),
            ItineraryItem::Ride { bus, span, time } => json!({
                "type": "Bus",
                "bus": &**bus,
                "span_count": span,
                "time": time
            }),
        })
        .collect();

    json!({
        "request_id": id,
        "total_time": itinerary.total_time,
        "items": items
    })
}
