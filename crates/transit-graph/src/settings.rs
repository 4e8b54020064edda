//! Routing configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const METERS_PER_KM: f64 = 1000.0;
const MINUTES_PER_HOUR: f64 = 60.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("bus velocity must be a positive number of km/h, got {0}")]
    InvalidVelocity(f64),
}

/// Parameters of the travel-time model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutingSettings {
    /// Minutes spent waiting each time a bus is boarded.
    pub bus_wait_time: u32,

    /// Bus speed in km/h.
    pub bus_velocity: f64,
}

impl RoutingSettings {
    pub fn new(bus_wait_time: u32, bus_velocity: f64) -> Result<Self, SettingsError> {
        let settings = Self {
            bus_wait_time,
            bus_velocity,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Checks values that may have come straight from an input document.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.bus_velocity.is_finite() && self.bus_velocity > 0.0 {
            Ok(())
        } else {
            Err(SettingsError::InvalidVelocity(self.bus_velocity))
        }
    }

    /// Minutes needed to ride `meters` at `bus_velocity`.
    pub fn travel_time(&self, meters: f64) -> f64 {
        meters / (self.bus_velocity * METERS_PER_KM / MINUTES_PER_HOUR)
    }

    pub fn wait_time(&self) -> f64 {
        f64::from(self.bus_wait_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_travel_time() {
        // 3.6 km/h is one meter per second
        let settings = RoutingSettings::new(5, 3.6).unwrap();
        assert!((settings.travel_time(60.0) - 1.0).abs() < 1e-12);
        assert!((settings.travel_time(200.0) - 200.0 / 60.0).abs() < 1e-12);
        assert_eq!(settings.wait_time(), 5.0);
    }

    #[test]
    fn test_rejects_bad_velocity() {
        assert_eq!(
            RoutingSettings::new(6, 0.0),
            Err(SettingsError::InvalidVelocity(0.0))
        );
        assert!(RoutingSettings::new(6, -40.0).is_err());
        assert!(RoutingSettings::new(6, f64::NAN).is_err());
    }
}
