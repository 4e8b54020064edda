//! CLI command implementations.

use crate::documents::{answer, read_document, BaseDocument, RequestDocument};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use transit_core::TransitCatalogue;
use transit_graph::{TransitRouter, TransitStore};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Build the catalogue and routing state and store them.
pub fn make_base(input: Option<&Path>) -> Result<()> {
    let document: BaseDocument = read_document(input)?;
    document.routing_settings.validate()?;

    let records = document.records();
    let mut catalogue = TransitCatalogue::new();
    let mut report = catalogue.ingest(&records.stops, &records.buses);
    report.errors.extend(records.rejected);

    println!(
        "{} Loaded {} stops, {} distances, {} buses",
        "✓".green(),
        report.stops_added.to_string().cyan(),
        report.distances_set.to_string().cyan(),
        report.buses_added.to_string().cyan()
    );

    // Show any rejected records
    if !report.errors.is_empty() {
        println!("\n{} rejected records:", "⚠".yellow());
        for (name, error) in report.errors.iter().take(5) {
            println!("  {} - {}", name.red(), error);
        }
        if report.errors.len() > 5 {
            println!("  ... and {} more", report.errors.len() - 5);
        }
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message("Precomputing routes...");

    let router = TransitRouter::build(&catalogue, document.routing_settings);

    spinner.set_message("Saving...");
    let path = &document.serialization_settings.file;
    let store = TransitStore::open(path)?;
    store.save(&catalogue, &router)?;

    spinner.finish_and_clear();

    println!(
        "{} Saved {} vertices, {} edges to {}",
        "✓".green(),
        router.graph().vertex_count().to_string().cyan(),
        router.graph().edge_count().to_string().cyan(),
        path.display()
    );

    Ok(())
}

/// Answer stat requests against the stored state.
pub fn process_requests(input: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let document: RequestDocument = read_document(input)?;
    let answers = run_requests(&document)?;

    let text = serde_json::to_string_pretty(&answers)?;
    match output {
        Some(path) => {
            fs::write(path, text)?;
            info!("Wrote {} answers to {}", document.stat_requests.len(), path.display());
        }
        None => println!("{}", text),
    }

    Ok(())
}

fn run_requests(document: &RequestDocument) -> Result<Value> {
    let path = &document.serialization_settings.file;
    let store = TransitStore::open(path)?;
    let (catalogue, router) = store
        .load()?
        .ok_or_else(|| format!("no routing state stored at {}", path.display()))?;

    info!(
        "Loaded {} stops and {} buses from {}",
        catalogue.stop_count(),
        catalogue.bus_count(),
        path.display()
    );

    let answers = document
        .stat_requests
        .iter()
        .map(|request| {
            debug!("Answering request {}", request.id());
            answer(&catalogue, &router, request)
        })
        .collect();

    Ok(Value::Array(answers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn write_base(dir: &Path) -> std::path::PathBuf {
        let db = dir.join("transport.db");
        let base = json!({
            "serialization_settings": { "file": db },
            "routing_settings": { "bus_wait_time": 6, "bus_velocity": 40 },
            "base_requests": [
                { "type": "Stop", "name": "Tolstopaltsevo", "latitude": 55.611087, "longitude": 37.20829,
                  "road_distances": { "Marushkino": 3900 } },
                { "type": "Stop", "name": "Marushkino", "latitude": 55.595884, "longitude": 37.209755,
                  "road_distances": { "Rasskazovka": 9900 } },
                { "type": "Stop", "name": "Rasskazovka", "latitude": 55.632761, "longitude": 37.333324 },
                { "type": "Bus", "name": "750", "is_roundtrip": false,
                  "stops": ["Tolstopaltsevo", "Marushkino", "Rasskazovka"] },
                { "type": "Bus", "name": "broken", "is_roundtrip": true, "stops": ["Tolstopaltsevo"] },
                { "type": "Stop", "name": "Unfinished", "latitude": 55.6 }
            ]
        });

        let path = dir.join("base.json");
        fs::write(&path, base.to_string()).unwrap();
        path
    }

    fn write_requests(dir: &Path) -> std::path::PathBuf {
        let requests = json!({
            "serialization_settings": { "file": dir.join("transport.db") },
            "stat_requests": [
                { "id": 1, "type": "Bus", "name": "750" },
                { "id": 2, "type": "Bus", "name": "751" },
                { "id": 3, "type": "Stop", "name": "Marushkino" },
                { "id": 5, "type": "Stop", "name": "Unfinished" },
                { "id": 4, "type": "Route", "from": "Rasskazovka", "to": "Tolstopaltsevo" }
            ]
        });

        let path = dir.join("requests.json");
        fs::write(&path, requests.to_string()).unwrap();
        path
    }

    #[test]
    fn test_make_base_then_process_requests() {
        let dir = tempdir().unwrap();
        let base = write_base(dir.path());
        let requests = write_requests(dir.path());
        let output = dir.path().join("answers.json");

        make_base(Some(base.as_path())).unwrap();
        process_requests(Some(requests.as_path()), Some(output.as_path())).unwrap();

        let answers: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        let answers = answers.as_array().unwrap();
        assert_eq!(answers.len(), 5);

        assert_eq!(answers[0]["request_id"], 1);
        assert_eq!(answers[0]["route_length"], 2 * (3900 + 9900));
        assert_eq!(answers[0]["stop_count"], 5);
        assert_eq!(answers[0]["unique_stop_count"], 3);

        assert_eq!(answers[1]["error_message"], "not found");
        assert_eq!(answers[2]["buses"], json!(["750"]));

        // the malformed stop was skipped, everything else loaded
        assert_eq!(answers[3]["error_message"], "not found");

        // 40 km/h is 2000/3 m/min
        let total = answers[4]["total_time"].as_f64().unwrap();
        let expected = 6.0 + (9900.0 + 3900.0) / (2000.0 / 3.0);
        assert!((total - expected).abs() < 1e-9);
        assert_eq!(answers[4]["items"][1]["span_count"], 2);
    }

    #[test]
    fn test_process_requests_without_base_fails() {
        let dir = tempdir().unwrap();
        let requests = write_requests(dir.path());

        let err = process_requests(Some(requests.as_path()), None).unwrap_err();
        assert!(err.to_string().contains("no routing state"));
    }

    #[test]
    fn test_make_base_rejects_bad_velocity() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("base.json");
        let base = json!({
            "serialization_settings": { "file": dir.path().join("transport.db") },
            "routing_settings": { "bus_wait_time": 6, "bus_velocity": 0 },
            "base_requests": []
        });
        fs::write(&path, base.to_string()).unwrap();

        assert!(make_base(Some(path.as_path())).is_err());
    }
}
