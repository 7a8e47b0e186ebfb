use std::time::Duration;

use async_trait::async_trait;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::{core::RpcResult, proc_macros::rpc};
use log::trace;
use serde_json::Value;

use super::RouteStore;
use crate::error::StoreError;
use crate::models::{GatewaySet, Prefix, Route, RouteIdentifier, RouteTableId, StoreRoute};

/// JSON-RPC methods exposed by the route table service
#[rpc(client)]
pub trait RouteTableApi {
    #[method(name = "list_routes")]
    async fn list_routes(&self, route_table_id: RouteTableId) -> RpcResult<Vec<Route>>;
    #[method(name = "put_route")]
    async fn put_route(&self, route: Route) -> RpcResult<Value>;
    #[method(name = "delete_route")]
    async fn delete_route(&self, route: RouteIdentifier) -> RpcResult<Value>;
}

/// Route store backed by a remote route table service over HTTP JSON-RPC
pub struct RpcRouteStore {
    endpoint: String,
    client: HttpClient,
}

impl RpcRouteStore {
    pub fn new(endpoint: &str, request_timeout: Duration) -> Result<Self, StoreError> {
        let client = HttpClientBuilder::default()
            .request_timeout(request_timeout)
            .build(endpoint)
            .map_err(|err| StoreError::Client(format!("{}: {}", endpoint, err)))?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RouteStore for RpcRouteStore {
    async fn list_routes(&self, table: RouteTableId) -> Result<Vec<StoreRoute>, StoreError> {
        trace!("list_routes table={} [{}]", table, self.endpoint);
        let routes = RouteTableApiClient::list_routes(&self.client, table)
            .await
            .map_err(|err| StoreError::List {
                table,
                reason: err.to_string(),
            })?;
        Ok(routes
            .into_iter()
            // Services may ignore the table filter, don't trust routes from other tables
            .filter(|r| r.route_table_id == table)
            .map(StoreRoute::from)
            .collect())
    }

    async fn put_route(
        &self,
        table: RouteTableId,
        destination: &Prefix,
        gateways: &GatewaySet,
    ) -> Result<(), StoreError> {
        trace!("put_route table={} {} -> {}", table, destination, gateways);
        let route = Route::new(table, destination, gateways);
        RouteTableApiClient::put_route(&self.client, route)
            .await
            .map_err(|err| StoreError::Put {
                table,
                destination: destination.clone(),
                reason: err.to_string(),
            })?;
        Ok(())
    }

    async fn delete_route(&self, table: RouteTableId, destination: &str) -> Result<(), StoreError> {
        trace!("delete_route table={} {}", table, destination);
        let id = RouteIdentifier::new(table, destination);
        RouteTableApiClient::delete_route(&self.client, id)
            .await
            .map_err(|err| StoreError::Delete {
                table,
                destination: destination.to_string(),
                reason: err.to_string(),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_endpoint() {
        let store = RpcRouteStore::new("not a url", Duration::from_secs(1));
        assert!(matches!(store, Err(StoreError::Client(_))));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_store_error() {
        // Nothing listens on the discard port
        let store = RpcRouteStore::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        assert_eq!(store.endpoint(), "http://127.0.0.1:9");
        let err = store.list_routes(10).await.unwrap_err();
        assert!(matches!(err, StoreError::List { table: 10, .. }));
    }
}
