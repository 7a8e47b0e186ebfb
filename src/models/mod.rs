mod gateways;
mod route;

pub use gateways::GatewaySet;
pub use route::{Gateway, Prefix, Route, RouteIdentifier, RouteTableId, StoreRoute};
