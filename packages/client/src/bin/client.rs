//! Listener client for the fanout broadcast server.
//!
//! Connects to the server and prints every broadcast it receives.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin fanout-client
//! cargo run --bin fanout-client -- --url ws://192.168.0.10:8765/ws
//! ```

use clap::Parser;

use fanout_client::{ReconnectPolicy, run_client};
use fanout_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "fanout-client")]
#[command(about = "Prints every message broadcast by a fanout server", long_about = None)]
struct Args {
    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8765/ws")]
    url: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = run_client(args.url, ReconnectPolicy::default()).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
