use std::process;

use clap::Parser;
use env_logger::Builder;
use log::{info, LevelFilter};

use routesync::cli::{self, Args};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    let (routesync_level, other_level) = match args.verbose {
        0 => (LevelFilter::Info, LevelFilter::Warn),
        1 => (LevelFilter::Debug, LevelFilter::Warn),
        2 => (LevelFilter::Trace, LevelFilter::Warn),
        _ => (LevelFilter::Trace, LevelFilter::Trace),
    };
    // stdout belongs to ExaBGP's process API, keep logs on stderr
    Builder::new()
        .filter(Some("routesync"), routesync_level)
        .filter(None, other_level)
        .init();
    info!("Logging at levels {}/{}", routesync_level, other_level);

    if cli::execute(&args).await.is_err() {
        process::exit(1);
    }
}
