mod file;

pub use file::DecodeErrorPolicy;

use std::time::Duration;

use crate::error::ConfigError;
use crate::models::RouteTableId;

/// Values given on the command line, these win over the config file
#[derive(Debug, Default)]
pub struct Overrides {
    pub route_table_id: Option<RouteTableId>,
    pub endpoint: Option<String>,
}

/// Load an optional TOML config file and apply CLI overrides
pub fn load(path: Option<&str>, overrides: Overrides) -> Result<SyncConfig, ConfigError> {
    let spec = match path {
        Some(path) => file::SyncConfigSpec::from_file(path)?,
        None => file::SyncConfigSpec::default(),
    };
    SyncConfig::from_spec(spec, overrides)
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub route_table_id: RouteTableId,
    pub endpoint: String,
    pub request_timeout: Duration,
    pub families: Vec<String>,
    pub on_decode_error: DecodeErrorPolicy,
    pub max_line_length: usize,
}

impl SyncConfig {
    fn from_spec(spec: file::SyncConfigSpec, overrides: Overrides) -> Result<Self, ConfigError> {
        let route_table_id = overrides
            .route_table_id
            .or(spec.route_table_id)
            .ok_or(ConfigError::MissingRouteTable)?;
        if spec.families.is_empty() {
            return Err(ConfigError::Invalid {
                field: "families",
                reason: "at least one family is required".to_string(),
            });
        }
        if spec.request_timeout == 0 {
            return Err(ConfigError::Invalid {
                field: "request_timeout",
                reason: "must be at least 1 second".to_string(),
            });
        }
        if spec.max_line_length == 0 {
            return Err(ConfigError::Invalid {
                field: "max_line_length",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(Self {
            route_table_id,
            endpoint: overrides.endpoint.unwrap_or(spec.endpoint),
            request_timeout: Duration::from_secs(spec.request_timeout),
            families: spec.families,
            on_decode_error: spec.on_decode_error,
            max_line_length: spec.max_line_length,
        })
    }
}
