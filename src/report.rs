//! Renders constructed sensors into the run log.

use serde::Serialize;
use tracing::debug;

use crate::sensor::{DepartureSensor, PublicTransportSensor};

/// Flat view of a sensor's configuration for JSON output.
#[derive(Debug, Serialize)]
pub struct SensorSummary<'a> {
    pub name: &'a str,
    pub route: &'a str,
    pub stop_id: &'a str,
    pub direction_id: &'a str,
    pub service_type: &'a str,
    pub icon: &'a str,
    pub state: Option<String>,
}

impl<'a> SensorSummary<'a> {
    pub fn from_sensor(sensor: &'a PublicTransportSensor) -> Self {
        Self {
            name: sensor.name(),
            route: sensor.route(),
            stop_id: sensor.stop_id(),
            direction_id: sensor.direction_id(),
            service_type: sensor.service_type(),
            icon: sensor.icon(),
            state: sensor.state(),
        }
    }
}

/// Logs a sensor using Rust's debug pretty-print format.
pub fn print_pretty(sensor: &PublicTransportSensor) {
    debug!("{:#?}", sensor);
}

/// Logs all sensors as a pretty-printed JSON array.
pub fn print_json(sensors: &[PublicTransportSensor]) -> serde_json::Result<()> {
    debug!("{}", sensors_to_json(sensors)?);
    Ok(())
}

pub fn sensors_to_json(sensors: &[PublicTransportSensor]) -> serde_json::Result<String> {
    let summaries: Vec<SensorSummary<'_>> =
        sensors.iter().map(SensorSummary::from_sensor).collect();
    serde_json::to_string_pretty(&summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::PublicTransportData;
    use std::sync::Arc;

    fn sensors() -> Vec<PublicTransportSensor> {
        let data: Arc<PublicTransportData> = Arc::new(PublicTransportData::new(
            "http://x/gtfs-rt",
            None,
            None,
            Some("secret".to_string()),
            None,
        ));
        vec![
            PublicTransportSensor::new(data.clone(), "1", "A", "0", "mdi:bus", "Service", "First"),
            PublicTransportSensor::new(data, "2", "B", "1", "mdi:tram", "Tram", "Second"),
        ]
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&sensors()[0]);
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&sensors()).unwrap();
    }

    #[test]
    fn test_json_keeps_sensor_order() {
        let json = sensors_to_json(&sensors()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let names: Vec<_> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
        assert_eq!(value[1]["service_type"], "Tram");
        assert!(value[0]["state"].is_null());
    }

    #[test]
    fn test_pretty_output_hides_api_key() {
        let rendered = format!("{:#?}", sensors()[0]);
        assert!(!rendered.contains("secret"));
    }
}
