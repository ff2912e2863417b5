//! Load, validate and construct: the body of a harness run.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{ConfigError, PlatformConfig, load_document};
use crate::feed::{FeedSource, PublicTransportData};
use crate::schema::SchemaError;
use crate::sensor::PublicTransportSensor;

/// The fetcher and the sensors bound to it.
#[derive(Debug)]
pub struct Platform {
    pub data: Arc<PublicTransportData>,
    pub sensors: Vec<PublicTransportSensor>,
}

#[derive(Debug)]
pub enum Outcome {
    /// The document failed validation; nothing was constructed.
    Invalid(SchemaError),
    Ready(Platform),
}

impl Outcome {
    pub fn sensors(&self) -> &[PublicTransportSensor] {
        match self {
            Outcome::Invalid(_) => &[],
            Outcome::Ready(platform) => &platform.sensors,
        }
    }
}

/// Runs the harness against the YAML file at `path`.
///
/// A document that fails validation is logged at `INFO` and reported as
/// [`Outcome::Invalid`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not well-formed YAML.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn run(path: &Path) -> Result<Outcome, ConfigError> {
    let document = load_document(path)?;

    let config = match PlatformConfig::from_document(document) {
        Ok(config) => config,
        Err(e) => {
            info!("Input file configuration invalid: {}", e);
            return Ok(Outcome::Invalid(e));
        }
    };
    info!("Input file configuration is valid.");

    Ok(Outcome::Ready(build(config)))
}

/// Constructs the shared fetcher and one sensor per departure, in order.
pub fn build(config: PlatformConfig) -> Platform {
    let data = Arc::new(PublicTransportData::new(
        config.trip_update_url,
        config.vehicle_position_url,
        config.route_delimiter,
        config.api_key,
        config.x_api_key,
    ));
    debug!(
        trip_update_url = data.trip_update_url(),
        vehicle_position_url = ?data.vehicle_position_url(),
        auth = ?data.auth(),
        "Feed configured"
    );

    let sensors = config
        .departures
        .into_iter()
        .map(|departure| {
            info!(
                name = %departure.name,
                route = %departure.route,
                stop_id = %departure.stop_id,
                "Adding sensor"
            );
            PublicTransportSensor::new(
                data.clone(),
                departure.stop_id,
                departure.route,
                departure.direction_id,
                departure.icon,
                departure.service_type,
                departure.name,
            )
        })
        .collect();

    Platform { data, sensors }
}
