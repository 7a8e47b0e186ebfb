use std::fmt;
use std::fs;

use serde::{self, Deserialize, Deserializer};

use crate::error::ConfigError;
use crate::event::DEFAULT_FAMILY;
use crate::models::RouteTableId;

struct Defaults {}

impl Defaults {
    fn endpoint() -> String {
        "http://127.0.0.1:8080".to_string()
    }

    fn request_timeout() -> u64 {
        10
    }

    fn families() -> Vec<String> {
        vec![DEFAULT_FAMILY.to_string()]
    }

    fn on_decode_error() -> DecodeErrorPolicy {
        DecodeErrorPolicy::Skip
    }

    fn max_line_length() -> usize {
        1024 * 1024
    }
}

/// Config (toml) representation of the sync process
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct SyncConfigSpec {
    // Route table to keep in sync (can be given on the CLI instead)
    pub(super) route_table_id: Option<RouteTableId>,
    // Route table service JSON-RPC endpoint
    #[serde(default = "Defaults::endpoint")]
    pub(super) endpoint: String,
    // Seconds to wait for each route table service request
    #[serde(default = "Defaults::request_timeout")]
    pub(super) request_timeout: u64,
    // ExaBGP families to take routes from
    #[serde(default = "Defaults::families")]
    pub(super) families: Vec<String>,
    // What to do with lines that can't be decoded
    #[serde(default = "Defaults::on_decode_error")]
    pub(super) on_decode_error: DecodeErrorPolicy,
    #[serde(default = "Defaults::max_line_length")]
    pub(super) max_line_length: usize,
}

impl Default for SyncConfigSpec {
    fn default() -> Self {
        Self {
            route_table_id: None,
            endpoint: Defaults::endpoint(),
            request_timeout: Defaults::request_timeout(),
            families: Defaults::families(),
            on_decode_error: Defaults::on_decode_error(),
            max_line_length: Defaults::max_line_length(),
        }
    }
}

impl SyncConfigSpec {
    pub(super) fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub(super) fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: SyncConfigSpec = toml::from_str(contents)?;
        Ok(config)
    }
}

/// How the input loop treats lines it can't decode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecodeErrorPolicy {
    /// Log and keep reading
    Skip,
    /// Stop with an error
    Fail,
}

impl fmt::Display for DecodeErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use DecodeErrorPolicy::*;
        let display = match self {
            Skip => "skip",
            Fail => "fail",
        };
        write!(f, "{}", display)
    }
}

impl<'de> Deserialize<'de> for DecodeErrorPolicy {
    fn deserialize<D>(deserializer: D) -> Result<DecodeErrorPolicy, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "skip" => Ok(DecodeErrorPolicy::Skip),
            "fail" => Ok(DecodeErrorPolicy::Fail),
            _ => Err(serde::de::Error::custom(format!(
                "Unsupported on_decode_error: '{}'",
                s
            ))),
        }
    }
}
