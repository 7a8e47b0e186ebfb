use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use log::trace;
use tokio::sync::{Mutex, RwLock};

use super::RouteStore;
use crate::error::StoreError;
use crate::models::{GatewaySet, Prefix, RouteTableId, StoreRoute};

/// Routes keyed by destination exactly as written
type Table = BTreeMap<String, GatewaySet>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Put,
    Delete,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use StoreOp::*;
        let display = match self {
            List => "list",
            Put => "put",
            Delete => "delete",
        };
        write!(f, "{}", display)
    }
}

/// Record of a call made against a MemoryRouteStore
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreCall {
    List(RouteTableId),
    Put(RouteTableId, Prefix, GatewaySet),
    Delete(RouteTableId, String),
}

impl StoreCall {
    pub fn op(&self) -> StoreOp {
        match self {
            StoreCall::List(_) => StoreOp::List,
            StoreCall::Put(..) => StoreOp::Put,
            StoreCall::Delete(..) => StoreOp::Delete,
        }
    }
}

/// In-process route store
///
/// Backs `--dry-run` and tests. Keeps a journal of every call and can be
/// told to fail the next call of a given kind.
#[derive(Clone, Default)]
pub struct MemoryRouteStore {
    tables: Arc<RwLock<HashMap<RouteTableId, Table>>>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    fail_next: Arc<Mutex<Option<StoreOp>>>,
}

impl MemoryRouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed routes without recording calls, keyed by `stored_as`
    pub async fn insert(&self, table: RouteTableId, route: StoreRoute) {
        let mut tables = self.tables.write().await;
        tables
            .entry(table)
            .or_insert_with(BTreeMap::new)
            .insert(route.stored_as, route.gateways);
    }

    /// Current routes of a table, sorted by stored destination
    pub async fn routes(&self, table: RouteTableId) -> Vec<StoreRoute> {
        let tables = self.tables.read().await;
        tables
            .get(&table)
            .map(|routes| {
                routes
                    .iter()
                    .map(|(dest, gws)| StoreRoute::stored(dest, gws.clone()))
                    .collect()
            })
            .unwrap_or_else(Vec::new)
    }

    pub async fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().await.clone()
    }

    pub async fn clear_calls(&self) {
        self.calls.lock().await.clear();
    }

    pub async fn fail_next(&self, op: StoreOp) {
        *self.fail_next.lock().await = Some(op);
    }

    async fn record(&self, call: StoreCall) -> Result<(), String> {
        let op = call.op();
        trace!("MemoryRouteStore {:?}", call);
        self.calls.lock().await.push(call);
        let mut fail_next = self.fail_next.lock().await;
        if *fail_next == Some(op) {
            *fail_next = None;
            return Err(format!("Injected {} failure", op));
        }
        Ok(())
    }
}

#[async_trait]
impl RouteStore for MemoryRouteStore {
    async fn list_routes(&self, table: RouteTableId) -> Result<Vec<StoreRoute>, StoreError> {
        self.record(StoreCall::List(table))
            .await
            .map_err(|reason| StoreError::List { table, reason })?;
        Ok(self.routes(table).await)
    }

    async fn put_route(
        &self,
        table: RouteTableId,
        destination: &Prefix,
        gateways: &GatewaySet,
    ) -> Result<(), StoreError> {
        let call = StoreCall::Put(table, destination.clone(), gateways.clone());
        self.record(call).await.map_err(|reason| StoreError::Put {
            table,
            destination: destination.clone(),
            reason,
        })?;
        let mut tables = self.tables.write().await;
        tables
            .entry(table)
            .or_insert_with(BTreeMap::new)
            .insert(destination.to_string(), gateways.clone());
        Ok(())
    }

    async fn delete_route(&self, table: RouteTableId, destination: &str) -> Result<(), StoreError> {
        let call = StoreCall::Delete(table, destination.to_string());
        self.record(call).await.map_err(|reason| StoreError::Delete {
            table,
            destination: destination.to_string(),
            reason,
        })?;
        let mut tables = self.tables.write().await;
        if let Some(routes) = tables.get_mut(&table) {
            routes.remove(destination);
        }
        Ok(())
    }
}
