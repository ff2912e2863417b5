//! The GTFS-RT data fetcher shared by every departure sensor.
//!
//! [`FeedSource`] is the contract sensors read through. [`PublicTransportData`]
//! holds the feed endpoints, the credentials to reach them and the cache of
//! upcoming services that the feed decoder fills.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Read access to a GTFS-RT feed's upcoming services.
pub trait FeedSource: Send + Sync + fmt::Debug {
    fn trip_update_url(&self) -> &str;

    fn vehicle_position_url(&self) -> Option<&str>;

    /// Maps a route id as it appears in the feed onto the configured route id.
    fn route_key<'a>(&self, route_id: &'a str) -> &'a str;

    /// Upcoming services for a (route, direction, stop), earliest first.
    fn next_services(&self, route: &str, direction: &str, stop: &str) -> &[StopDetails];
}

/// How requests to the feed authenticate.
#[derive(Clone, PartialEq, Eq)]
pub enum FeedAuth {
    /// No authentication required.
    None,
    /// Key sent verbatim in the named HTTP header.
    Header { header_name: String, key: String },
}

impl FeedAuth {
    /// `api_key` goes in `Authorization`, else `x_api_key` goes in `x-api-key`.
    pub fn from_keys(api_key: Option<&str>, x_api_key: Option<&str>) -> Self {
        match (api_key, x_api_key) {
            (Some(key), _) => FeedAuth::Header {
                header_name: "Authorization".to_string(),
                key: key.to_string(),
            },
            (None, Some(key)) => FeedAuth::Header {
                header_name: "x-api-key".to_string(),
                key: key.to_string(),
            },
            (None, None) => FeedAuth::None,
        }
    }

    /// Returns `true` if any authentication credentials are needed.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, FeedAuth::None)
    }

    /// The `(name, value)` header to attach to feed requests, if any.
    pub fn header(&self) -> Option<(&str, &str)> {
        match self {
            FeedAuth::None => None,
            FeedAuth::Header { header_name, key } => Some((header_name, key)),
        }
    }
}

// Keys stay out of logs.
impl fmt::Debug for FeedAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedAuth::None => f.write_str("None"),
            FeedAuth::Header { header_name, .. } => f
                .debug_struct("Header")
                .field("header_name", header_name)
                .field("key", &"<redacted>")
                .finish(),
        }
    }
}

/// Last reported location of the vehicle running a service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VehicleLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// One upcoming service at a stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopDetails {
    pub arrival_time: DateTime<Utc>,
    pub position: Option<VehicleLocation>,
}

impl StopDetails {
    pub fn new(arrival_time: DateTime<Utc>) -> Self {
        Self {
            arrival_time,
            position: None,
        }
    }

    pub fn with_position(mut self, latitude: f64, longitude: f64) -> Self {
        self.position = Some(VehicleLocation {
            latitude,
            longitude,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ServiceKey {
    route: String,
    direction: String,
    stop: String,
}

impl ServiceKey {
    fn new(route: &str, direction: &str, stop: &str) -> Self {
        Self {
            route: route.to_string(),
            direction: direction.to_string(),
            stop: stop.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct PublicTransportData {
    trip_update_url: String,
    vehicle_position_url: Option<String>,
    route_delimiter: Option<String>,
    auth: FeedAuth,
    services: HashMap<ServiceKey, Vec<StopDetails>>,
}

impl PublicTransportData {
    pub fn new(
        trip_update_url: impl Into<String>,
        vehicle_position_url: Option<String>,
        route_delimiter: Option<String>,
        api_key: Option<String>,
        x_api_key: Option<String>,
    ) -> Self {
        Self {
            trip_update_url: trip_update_url.into(),
            vehicle_position_url,
            route_delimiter,
            auth: FeedAuth::from_keys(api_key.as_deref(), x_api_key.as_deref()),
            services: HashMap::new(),
        }
    }

    pub fn auth(&self) -> &FeedAuth {
        &self.auth
    }

    pub fn route_delimiter(&self) -> Option<&str> {
        self.route_delimiter.as_deref()
    }

    /// Replaces the cached services for a feed route id, direction and stop.
    ///
    /// The feed decoder that polls the trip update and vehicle position URLs
    /// lives outside this crate and fills the cache through this method; until
    /// it runs, every sensor state is `None`.
    ///
    /// The route id is passed through [`FeedSource::route_key`] first and the
    /// services are stored in arrival order.
    pub fn set_services(
        &mut self,
        route_id: &str,
        direction: &str,
        stop: &str,
        mut services: Vec<StopDetails>,
    ) {
        services.sort_by_key(|s| s.arrival_time);
        let route = self.route_key(route_id);
        self.services
            .insert(ServiceKey::new(route, direction, stop), services);
    }
}

impl FeedSource for PublicTransportData {
    fn trip_update_url(&self) -> &str {
        &self.trip_update_url
    }

    fn vehicle_position_url(&self) -> Option<&str> {
        self.vehicle_position_url.as_deref()
    }

    fn route_key<'a>(&self, route_id: &'a str) -> &'a str {
        match self.route_delimiter.as_deref() {
            Some(delimiter) if !delimiter.is_empty() => match route_id.split_once(delimiter) {
                Some(("", _)) | None => route_id,
                Some((head, _)) => head,
            },
            _ => route_id,
        }
    }

    fn next_services(&self, route: &str, direction: &str, stop: &str) -> &[StopDetails] {
        self.services
            .get(&ServiceKey::new(route, direction, stop))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
