//! Sensor platform configuration: YAML loading, the platform schema and the
//! typed configuration built from a validated document.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::schema::{Field, Schema, SchemaError};

pub const CONF_API_KEY: &str = "api_key";
pub const CONF_X_API_KEY: &str = "x_api_key";
pub const CONF_STOP_ID: &str = "stopid";
pub const CONF_ROUTE: &str = "route";
pub const CONF_DIRECTION_ID: &str = "directionid";
pub const CONF_DEPARTURES: &str = "departures";
pub const CONF_TRIP_UPDATE_URL: &str = "trip_update_url";
pub const CONF_VEHICLE_POSITION_URL: &str = "vehicle_position_url";
pub const CONF_ROUTE_DELIMITER: &str = "route_delimiter";
pub const CONF_ICON: &str = "icon";
pub const CONF_SERVICE_TYPE: &str = "service_type";
pub const CONF_NAME: &str = "name";

pub const DEFAULT_SERVICE: &str = "Service";
pub const DEFAULT_ICON: &str = "mdi:bus";
pub const DEFAULT_DIRECTION: &str = "0";

/// Shape every platform configuration document must have.
pub static PLATFORM_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::Map(vec![
        Field::required(CONF_TRIP_UPDATE_URL, Schema::Str),
        Field::optional(CONF_API_KEY, Schema::Str),
        Field::optional(CONF_X_API_KEY, Schema::Str),
        Field::optional(CONF_VEHICLE_POSITION_URL, Schema::Str),
        Field::optional(CONF_ROUTE_DELIMITER, Schema::Str),
        Field::required(
            CONF_DEPARTURES,
            Schema::list(Schema::Map(vec![
                Field::required(CONF_NAME, Schema::Str),
                Field::required(CONF_STOP_ID, Schema::Str),
                Field::required(CONF_ROUTE, Schema::Str),
                Field::optional(CONF_DIRECTION_ID, Schema::Str),
                Field::optional(CONF_SERVICE_TYPE, Schema::Str),
                Field::optional(CONF_ICON, Schema::Str),
            ])),
        ),
    ])
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub trip_update_url: String,
    pub api_key: Option<String>,
    pub x_api_key: Option<String>,
    pub vehicle_position_url: Option<String>,
    pub route_delimiter: Option<String>,
    pub departures: Vec<DepartureConfig>,
}

/// One configured (route, stop, direction) to report on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartureConfig {
    pub name: String,
    #[serde(rename = "stopid")]
    pub stop_id: String,
    pub route: String,
    #[serde(rename = "directionid", default = "DepartureConfig::default_direction")]
    pub direction_id: String,
    #[serde(default = "DepartureConfig::default_service_type")]
    pub service_type: String,
    #[serde(default = "DepartureConfig::default_icon")]
    pub icon: String,
}

impl DepartureConfig {
    fn default_direction() -> String {
        DEFAULT_DIRECTION.to_string()
    }
    fn default_service_type() -> String {
        DEFAULT_SERVICE.to_string()
    }
    fn default_icon() -> String {
        DEFAULT_ICON.to_string()
    }
}

impl PlatformConfig {
    /// Validates `document` against [`PLATFORM_SCHEMA`] and builds the typed
    /// configuration, filling in defaults for absent optional departure keys.
    pub fn from_document(document: Value) -> Result<Self, SchemaError> {
        PLATFORM_SCHEMA.validate(&document)?;
        serde_yaml::from_value(document).map_err(|e| SchemaError::new(e.to_string()))
    }
}

/// Reads and parses the YAML file at `path` into an untyped document.
///
/// An empty file yields [`Value::Null`], which later fails validation.
/// Application-specific tags such as `!python/object` are refused here, so
/// they surface as load errors rather than as validation failures.
pub fn load_document(path: &Path) -> Result<Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let document: Value = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    match find_unsafe_tag(&document) {
        Some(tag) => Err(ConfigError::UnsafeTag {
            path: path.to_path_buf(),
            tag,
        }),
        None => Ok(document),
    }
}

/// Returns the first tag outside the YAML core (`!!`) namespace.
fn find_unsafe_tag(value: &Value) -> Option<String> {
    match value {
        Value::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            if tag.starts_with("!!") {
                find_unsafe_tag(&tagged.value)
            } else {
                Some(tag)
            }
        }
        Value::Sequence(items) => items.iter().find_map(find_unsafe_tag),
        Value::Mapping(mapping) => mapping
            .iter()
            .find_map(|(k, v)| find_unsafe_tag(k).or_else(|| find_unsafe_tag(v))),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Refusing to load config file {}: unsupported tag {tag}", path.display())]
    UnsafeTag { path: PathBuf, tag: String },
}
