//! # routesync CLI
//!
//! Run as an ExaBGP API process to keep a route table in sync with the
//! routes ExaBGP receives:
//!
//! ```text
//! process routesync {
//!     run /usr/local/bin/routesync run 10;
//!     encoder json;
//! }
//! ```
//!
//! The same binary can inspect or flush a route table:
//!
//! ```sh
//! $ routesync show 10
//!  Destination   | Gateways
//! ---------------+----------------------------
//!  10.0.0.0/24   | 172.16.20.2, 172.16.20.3
//!  10.0.1.0/24   | 172.16.20.2
//!
//! $ routesync flush 10
//! Removed 2 routes from table 10
//! ```
#[cfg(feature = "cli")]
mod table;

use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use log::{debug, info, warn};
use signal_hook::consts::SIGTERM;

use crate::config::{self, Overrides, SyncConfig};
use crate::driver::{Driver, Outcome};
use crate::engine::Engine;
use crate::error::{ConfigError, SyncError};
use crate::models::RouteTableId;
use crate::store::{MemoryRouteStore, RouteStore, RpcRouteStore};

#[derive(Parser, Debug)]
#[clap(name = "routesync", rename_all = "kebab-case")]
/// Sync BGP route updates from ExaBGP into a route table service
pub struct Args {
    #[clap(subcommand)]
    pub cmd: Command,
    /// Show debug logs (additive for trace logs)
    #[clap(short, parse(from_occurrences), global = true)]
    pub verbose: u8,
}

#[derive(Parser, Debug)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Read ExaBGP JSON messages from stdin and sync the route table
    Run(RunOptions),
    /// Show routes currently in the route table
    #[cfg(feature = "cli")]
    #[clap(alias = "s")]
    Show(TableOptions),
    /// Remove all routes from the route table
    Flush(TableOptions),
}

#[derive(Parser, Debug)]
#[clap(rename_all = "kebab-case")]
pub struct TableOptions {
    /// Route table ID. If not provided, will fall back to config file value
    #[clap()]
    pub route_table_id: Option<RouteTableId>,
    /// Path to routesync config.toml
    #[clap(short, long)]
    pub config: Option<String>,
    /// Route table service endpoint (E.g. http://127.0.0.1:8080)
    #[clap(long, env = "ROUTESYNC_ENDPOINT")]
    pub endpoint: Option<String>,
}

impl TableOptions {
    pub fn load_config(&self) -> Result<SyncConfig, ConfigError> {
        let overrides = Overrides {
            route_table_id: self.route_table_id,
            endpoint: self.endpoint.clone(),
        };
        config::load(self.config.as_deref(), overrides)
    }
}

#[derive(Parser, Debug)]
#[clap(rename_all = "kebab-case")]
pub struct RunOptions {
    #[clap(flatten)]
    pub table: TableOptions,
    /// Keep routes in memory instead of calling the route table service
    #[clap(long)]
    pub dry_run: bool,
}

async fn sync<S>(config: &SyncConfig, store: S) -> Result<Outcome, SyncError>
where
    S: RouteStore,
{
    let engine = Engine::new(config.route_table_id, store);
    let mut driver = Driver::new(engine, config);
    driver.run(tokio::io::stdin()).await
}

/// Run the sync loop on stdin until ExaBGP shuts down
pub async fn run(options: &RunOptions) -> Result<Outcome, Box<dyn Error>> {
    let config = options.table.load_config()?;
    debug!("{:?}", config);

    // ExaBGP sends a shutdown notification before it exits, keep running
    // until then so the route table can be flushed
    let terminate = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGTERM, Arc::clone(&terminate))?;

    let outcome = if options.dry_run {
        info!(
            "Syncing routes into table {} (dry run)",
            config.route_table_id
        );
        sync(&config, MemoryRouteStore::new()).await?
    } else {
        let store = RpcRouteStore::new(&config.endpoint, config.request_timeout)?;
        info!(
            "Syncing routes into table {} via {}",
            config.route_table_id,
            store.endpoint()
        );
        sync(&config, store).await?
    };

    if terminate.load(Ordering::Relaxed) {
        warn!("Ignored SIGTERM while waiting for shutdown notification");
    }
    match outcome {
        Outcome::Shutdown { removed } => info!("Shutdown complete, removed {} routes", removed),
        Outcome::EndOfInput => info!("Input closed, leaving routes in place"),
    }
    Ok(outcome)
}

async fn run_cmd(cmd: &Command) -> Result<(), Box<dyn Error>> {
    match cmd {
        #[cfg(feature = "cli")]
        Command::Show(options) => {
            let config = options.load_config()?;
            let store = RpcRouteStore::new(&config.endpoint, config.request_timeout)?;
            let mut routes = store.list_routes(config.route_table_id).await?;
            routes.sort_by(|a, b| a.destination.cmp(&b.destination));
            let mut table = table::OutputTable::new();
            for route in &routes {
                table.add_row(route);
            }
            table.print();
        }
        Command::Flush(options) => {
            let config = options.load_config()?;
            let store = RpcRouteStore::new(&config.endpoint, config.request_timeout)?;
            let mut engine = Engine::new(config.route_table_id, store);
            let removed = engine.apply_shutdown().await?;
            println!(
                "Removed {} routes from table {}",
                removed, config.route_table_id
            );
        }
        Command::Run(options) => {
            run(options).await?;
        }
    }
    Ok(())
}

/// Run a CLI command, printing any error
pub async fn execute(args: &Args) -> Result<(), Box<dyn Error>> {
    let result = run_cmd(&args.cmd).await;
    if let Err(err) = &result {
        report(err.as_ref());
    }
    result
}

#[cfg(feature = "cli")]
fn report(err: &dyn Error) {
    use colored::Colorize;
    eprintln!("{}", err.to_string().red());
}

#[cfg(not(feature = "cli"))]
fn report(err: &dyn Error) {
    eprintln!("{}", err);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let args = Args::try_parse_from(&["routesync", "-vv", "run", "10", "--dry-run"]).unwrap();
        assert_eq!(args.verbose, 2);
        match args.cmd {
            Command::Run(options) => {
                assert!(options.dry_run);
                assert_eq!(options.table.route_table_id, Some(10));
                let config = options.table.load_config().unwrap();
                assert_eq!(config.route_table_id, 10);
            }
            other => panic!("Expected run, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_flush_with_config() {
        let args = Args::try_parse_from(&[
            "routesync",
            "flush",
            "--config",
            "./demos/routesync.toml",
            "--endpoint",
            "http://192.0.2.1:8080",
        ])
        .unwrap();
        match args.cmd {
            Command::Flush(options) => {
                let config = options.load_config().unwrap();
                assert_eq!(config.route_table_id, 10);
                assert_eq!(config.endpoint, "http://192.0.2.1:8080");
            }
            other => panic!("Expected flush, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_route_table() {
        assert!(Args::try_parse_from(&["routesync", "run", "ten"]).is_err());
    }
}
