//! Next-departure sensors reading from a shared [`FeedSource`].

use std::fmt;
use std::sync::Arc;

use crate::feed::{FeedSource, StopDetails};

pub const ATTR_STOP_ID: &str = "Stop ID";
pub const ATTR_ROUTE: &str = "Route";
pub const ATTR_DIRECTION_ID: &str = "Direction ID";
pub const ATTR_DUE_AT: &str = "Due at";
pub const ATTR_NEXT_UP: &str = "Next Service";
pub const ATTR_ICON: &str = "Icon";
pub const ATTR_LATITUDE: &str = "Latitude";
pub const ATTR_LONGITUDE: &str = "Longitude";

pub const TIME_STR_FORMAT: &str = "%H:%M";

/// A sensor as Home Assistant sees it: a name, an icon, a state and
/// attributes.
pub trait DepartureSensor: fmt::Debug {
    fn name(&self) -> &str;

    fn icon(&self) -> &str;

    /// Current state, `None` while nothing is known.
    fn state(&self) -> Option<String>;

    /// State attributes in display order.
    fn attributes(&self) -> Vec<(String, String)>;
}

#[derive(Debug, Clone)]
pub struct PublicTransportSensor {
    data: Arc<dyn FeedSource>,
    stop_id: String,
    route: String,
    direction_id: String,
    icon: String,
    service_type: String,
    name: String,
}

impl PublicTransportSensor {
    pub fn new(
        data: Arc<dyn FeedSource>,
        stop_id: impl Into<String>,
        route: impl Into<String>,
        direction_id: impl Into<String>,
        icon: impl Into<String>,
        service_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            data,
            stop_id: stop_id.into(),
            route: route.into(),
            direction_id: direction_id.into(),
            icon: icon.into(),
            service_type: service_type.into(),
            name: name.into(),
        }
    }

    pub fn data(&self) -> &Arc<dyn FeedSource> {
        &self.data
    }

    pub fn stop_id(&self) -> &str {
        &self.stop_id
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn direction_id(&self) -> &str {
        &self.direction_id
    }

    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    fn services(&self) -> &[StopDetails] {
        self.data
            .next_services(&self.route, &self.direction_id, &self.stop_id)
    }
}

impl DepartureSensor for PublicTransportSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn icon(&self) -> &str {
        &self.icon
    }

    fn state(&self) -> Option<String> {
        self.services()
            .first()
            .map(|next| next.arrival_time.format(TIME_STR_FORMAT).to_string())
    }

    fn attributes(&self) -> Vec<(String, String)> {
        let mut attrs = vec![
            (ATTR_STOP_ID.to_string(), self.stop_id.clone()),
            (ATTR_ROUTE.to_string(), self.route.clone()),
            (ATTR_DIRECTION_ID.to_string(), self.direction_id.clone()),
            (ATTR_ICON.to_string(), self.icon.clone()),
        ];

        let services = self.services();
        if let Some(next) = services.first() {
            attrs.push((
                ATTR_DUE_AT.to_string(),
                next.arrival_time.format(TIME_STR_FORMAT).to_string(),
            ));
            if let Some(following) = services.get(1) {
                attrs.push((
                    ATTR_NEXT_UP.to_string(),
                    following.arrival_time.format(TIME_STR_FORMAT).to_string(),
                ));
            }
            if let Some(position) = next.position {
                attrs.push((ATTR_LATITUDE.to_string(), position.latitude.to_string()));
                attrs.push((ATTR_LONGITUDE.to_string(), position.longitude.to_string()));
            }
        }

        attrs
    }
}
