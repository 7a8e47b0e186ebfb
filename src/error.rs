use std::io;

use thiserror::Error;

use crate::models::{Prefix, RouteTableId};

/// A line from the speaker that couldn't be turned into an Event
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing field `{0}`")]
    MissingField(&'static str),

    #[error("Unexpected value at `{path}`: {reason}")]
    Malformed { path: String, reason: String },

    #[error("Line exceeds {0} bytes")]
    LineTooLong(usize),
}

/// Any failure talking to the route store. Always fatal for the engine.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Listing routes in table {table} failed: {reason}")]
    List { table: RouteTableId, reason: String },

    #[error("Writing route {destination} in table {table} failed: {reason}")]
    Put {
        table: RouteTableId,
        destination: Prefix,
        reason: String,
    },

    #[error("Deleting route {destination} in table {table} failed: {reason}")]
    Delete {
        table: RouteTableId,
        destination: String,
        reason: String,
    },

    #[error("Route store client error: {0}")]
    Client(String),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Engine is terminated, no further updates are accepted")]
    Terminated,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Couldn't read config {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("No route table ID provided (use the CLI argument or `route_table_id` in config)")]
    MissingRouteTable,

    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Reasons the input loop stopped early
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Couldn't decode line {line}: {source}")]
    Decode { line: u64, source: DecodeError },

    #[error("Reading input failed: {0}")]
    Io(#[from] io::Error),
}
