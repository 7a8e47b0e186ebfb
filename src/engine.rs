use std::fmt;

use log::{debug, info, warn};

use crate::error::EngineError;
use crate::event::{Change, Update};
use crate::models::{Prefix, RouteTableId};
use crate::rib::DesiredState;
use crate::store::RouteStore;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EngineState {
    Running,
    Terminated,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let word = match self {
            EngineState::Running => "Running",
            EngineState::Terminated => "Terminated",
        };
        write!(f, "{}", word)
    }
}

/// Store operations issued for a single update
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Stale destinations removed from the store
    pub deleted: Vec<Prefix>,
    /// Routes written (every desired prefix, changed or not)
    pub written: usize,
}

/// Keeps a route table in the store in line with the routes the speaker
/// currently announces.
///
/// Store errors are returned as-is; nothing is retried or rolled back, the
/// caller is expected to stop.
pub struct Engine<S> {
    table: RouteTableId,
    store: S,
    desired: DesiredState,
    state: EngineState,
}

impl<S> Engine<S>
where
    S: RouteStore,
{
    pub fn new(table: RouteTableId, store: S) -> Self {
        Self {
            table,
            store,
            desired: DesiredState::new(),
            state: EngineState::Running,
        }
    }

    pub fn table(&self) -> RouteTableId {
        self.table
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn desired(&self) -> &DesiredState {
        &self.desired
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fold an UPDATE into the desired state, then push the whole desired
    /// state to the store and prune whatever the store has beyond it.
    pub async fn apply_update(&mut self, update: &Update) -> Result<Reconciliation, EngineError> {
        self.ensure_running()?;

        for change in update.changes() {
            info!("{}", change);
            match change {
                Change::Withdraw { prefix } => {
                    if self.desired.withdraw(prefix).is_none() {
                        debug!("Withdrawn prefix {} wasn't known", prefix);
                    }
                }
                Change::Announce { prefix, gateway } => {
                    self.desired.announce(prefix.clone(), gateway.clone());
                }
            }
        }
        info!("= {}", self.desired);

        let mut result = Reconciliation::default();
        let current = self.store.list_routes(self.table).await?;
        for route in current {
            if !self.desired.contains(&route.destination) {
                debug!("Removing stale route {}", route);
                self.store
                    .delete_route(self.table, &route.stored_as)
                    .await?;
                result.deleted.push(route.destination);
            }
        }
        for (prefix, gateways) in self.desired.iter() {
            self.store.put_route(self.table, prefix, gateways).await?;
            result.written += 1;
        }
        debug!(
            "Reconciled table {}: {} written, {} deleted",
            self.table,
            result.written,
            result.deleted.len()
        );
        Ok(result)
    }

    /// Delete every route in the table, regardless of desired state.
    /// The engine accepts no further calls afterwards.
    pub async fn apply_shutdown(&mut self) -> Result<usize, EngineError> {
        self.ensure_running()?;
        self.state = EngineState::Terminated;

        info!("Removing all routes from table {}", self.table);
        let routes = self.store.list_routes(self.table).await?;
        let mut removed = 0;
        for route in routes {
            self.store
                .delete_route(self.table, &route.stored_as)
                .await?;
            info!("Removed {}", route.stored_as);
            removed += 1;
        }
        Ok(removed)
    }

    fn ensure_running(&self) -> Result<(), EngineError> {
        if self.state == EngineState::Terminated {
            warn!("Engine for table {} is {}", self.table, self.state);
            return Err(EngineError::Terminated);
        }
        Ok(())
    }
}
