pub mod cli;
mod codec;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod event;
pub mod models;
pub mod rib;
pub mod store;

pub use config::SyncConfig;
pub use driver::{Driver, Outcome};
pub use engine::{Engine, EngineState, Reconciliation};
pub use store::{MemoryRouteStore, RouteStore, RpcRouteStore};
