//! WebSocket broadcast server.
//!
//! Accepts WebSocket connections and sends every line typed on stdin to all of
//! them as a text frame.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin fanout-server
//! cargo run --bin fanout-server -- --host 127.0.0.1 --port 9000
//! printf 'hello\nworld\n' | cargo run --bin fanout-server -- --input pipe
//! ```

use std::sync::Arc;

use clap::Parser;
use fanout_server::{
    config::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_PROMPT, InputMode, ServerConfig},
    infrastructure::registry::InMemoryConnectionRegistry,
    ui::Server,
    usecase::{BroadcastMessageUseCase, ConnectUseCase, DisconnectUseCase, GetConnectionsUseCase},
};
use fanout_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "fanout-server")]
#[command(about = "WebSocket server that broadcasts terminal input to every client", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Where operator lines are read from
    #[arg(long, value_enum, default_value_t = InputMode::Auto)]
    input: InputMode,

    /// Prompt shown by the interactive line editor
    #[arg(long, default_value = DEFAULT_PROMPT)]
    prompt: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            input_mode: args.input,
            prompt: args.prompt,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let config = ServerConfig::from(Args::parse());

    // Initialize dependencies in order:
    // 1. Registry
    // 2. UseCases
    // 3. Server

    // 1. Create Registry (in-memory set of open connections)
    let registry = Arc::new(InMemoryConnectionRegistry::new());

    // 2. Create UseCases
    let connect_usecase = Arc::new(ConnectUseCase::new(registry.clone(), Arc::new(SystemClock)));
    let disconnect_usecase = Arc::new(DisconnectUseCase::new(registry.clone()));
    let broadcast_usecase = Arc::new(BroadcastMessageUseCase::new(registry.clone()));
    let get_connections_usecase = Arc::new(GetConnectionsUseCase::new(registry.clone()));

    // 3. Create and run the server
    let server = Server::new(
        connect_usecase,
        disconnect_usecase,
        broadcast_usecase,
        get_connections_usecase,
    );
    if let Err(e) = server.run(config).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
