//! Planning-poker room server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin yoriai-server
//! cargo run --bin yoriai-server -- --host 0.0.0.0 --port 3000 --debug
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use tokio_util::sync::CancellationToken;
use yoriai_server::{
    domain::{DEFAULT_DELIVERY_TIMEOUT, RoomRegistry},
    infrastructure::{
        InMemoryRoomRegistry, RegistryConfig,
        registry::{DEFAULT_ROOM_TTL, DEFAULT_SWEEP_INTERVAL, spawn_sweeper},
    },
    ui::{Server, state::AppState},
};
use yoriai_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "yoriai-server")]
#[command(about = "Planning poker server with live room sync", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Seconds a room stays available after creation
    #[arg(long, default_value_t = DEFAULT_ROOM_TTL.as_secs())]
    room_ttl_secs: u64,

    /// Seconds between sweeps for expired rooms
    #[arg(
        long,
        default_value_t = DEFAULT_SWEEP_INTERVAL.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    sweep_interval_secs: u64,

    /// Log at debug level unless RUST_LOG is set
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    let level = if args.debug { "debug" } else { "info" };
    setup_logger("yoriai_server", env!("CARGO_BIN_NAME"), level);

    // Initialize dependencies in order:
    // 1. Registry
    // 2. Sweeper
    // 3. AppState (UseCases)
    // 4. Server

    // 1. Create Registry (in-memory)
    let registry = Arc::new(InMemoryRoomRegistry::new(
        Arc::new(SystemClock),
        RegistryConfig {
            room_ttl: Duration::from_secs(args.room_ttl_secs),
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
        },
    ));
    let registry: Arc<dyn RoomRegistry> = registry;

    // 2. Sweep expired rooms in the background
    let stop_sweeper = CancellationToken::new();
    let sweeper = spawn_sweeper(
        registry.clone(),
        Duration::from_secs(args.sweep_interval_secs),
        stop_sweeper.clone(),
    );

    // 3. Create UseCases
    let state = Arc::new(AppState::new(registry));

    // 4. Create and run the server
    let result = Server::new(state).run(args.host, args.port).await;

    stop_sweeper.cancel();
    let _ = sweeper.await;

    if let Err(e) = result {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
