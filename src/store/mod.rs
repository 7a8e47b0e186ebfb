mod memory;
mod rpc;

pub use memory::{MemoryRouteStore, StoreCall, StoreOp};
pub use rpc::RpcRouteStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{GatewaySet, Prefix, RouteTableId, StoreRoute};

/// Capability the engine needs from whatever persists routes
///
/// Every call is scoped to a route table; implementations must not touch
/// routes outside of it.
#[async_trait]
pub trait RouteStore: Send + Sync {
    async fn list_routes(&self, table: RouteTableId) -> Result<Vec<StoreRoute>, StoreError>;

    /// Create the route, or replace the gateways of an existing one
    async fn put_route(
        &self,
        table: RouteTableId,
        destination: &Prefix,
        gateways: &GatewaySet,
    ) -> Result<(), StoreError>;

    /// Delete by destination as the store keys it (`StoreRoute::stored_as`)
    async fn delete_route(&self, table: RouteTableId, destination: &str) -> Result<(), StoreError>;
}
