//! EmberKV - An In-Memory Key-Value Store with Append-Only-Log Durability
//!
//! This is the main entry point for the EmberKV server. It opens the
//! append-only log, replays it into the store, and only then starts
//! accepting connections.

use std::sync::Arc;

use emberkv::commands::CommandHandler;
use emberkv::connection::{handle_connection, ConnectionStats};
use emberkv::storage::{start_sweeper, Store};
use emberkv::AofLog;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Server configuration
struct Config {
    /// Host to bind to
    host: String,
    /// Port to listen on
    port: u16,
    /// Append-only log file path
    aof_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: emberkv::DEFAULT_HOST.to_string(),
            port: emberkv::DEFAULT_PORT,
            aof_path: emberkv::DEFAULT_AOF_PATH.to_string(),
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> Self {
        let mut config = Config::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    if i + 1 < args.len() {
                        config.host = args[i + 1].clone();
                        i += 2;
                    } else {
                        eprintln!("Error: --host requires a value");
                        std::process::exit(1);
                    }
                }
                "--port" | "-p" => {
                    if i + 1 < args.len() {
                        config.port = args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid port number");
                            std::process::exit(1);
                        });
                        i += 2;
                    } else {
                        eprintln!("Error: --port requires a value");
                        std::process::exit(1);
                    }
                }
                "--aof" | "-a" => {
                    if i + 1 < args.len() {
                        config.aof_path = args[i + 1].clone();
                        i += 2;
                    } else {
                        eprintln!("Error: --aof requires a value");
                        std::process::exit(1);
                    }
                }
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("EmberKV version {}", emberkv::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        config
    }

    /// Returns the bind address as a string
    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn print_help() {
    println!(
        r#"
EmberKV - An In-Memory Key-Value Store with Append-Only-Log Durability

USAGE:
    emberkv [OPTIONS]

OPTIONS:
    -h, --host <HOST>    Host to bind to (default: 127.0.0.1)
    -p, --port <PORT>    Port to listen on (default: 6380)
    -a, --aof <PATH>     Append-only log file (default: emberkv.aof)
    -v, --version        Print version information
        --help           Print this help message

EXAMPLES:
    emberkv                          # Start on 127.0.0.1:6380
    emberkv --port 6381              # Start on port 6381
    emberkv --aof /var/lib/ember.aof # Use a different log file

CONNECTING:
    Use redis-cli or any RESP client:
    $ redis-cli -p 6380
    127.0.0.1:6380> SET name Ariz
    OK
    127.0.0.1:6380> GET name
    "Ariz"
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_args();

    // Set up logging
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    info!("EmberKV v{} starting", emberkv::VERSION);

    // Open the durability log; without it the server must not start
    let log = AofLog::open(&config.aof_path)?;
    info!(path = %config.aof_path, "Append-only log opened");

    // Replay runs inside Store::open, before the listener binds
    let store = Arc::new(Store::open(log)?);

    // Start the background expiry sweeper
    let sweeper = start_sweeper(Arc::clone(&store));

    // Create connection statistics
    let stats = Arc::new(ConnectionStats::new());

    // Bind the TCP listener
    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("Listening on {}", config.bind_address());

    // Set up graceful shutdown
    let shutdown = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Shutdown signal received, stopping server...");
    };

    // Main accept loop
    tokio::select! {
        _ = accept_loop(listener, Arc::clone(&store), stats) => {}
        _ = shutdown => {}
    }

    // Join the sweeper first so no sweep can still be appending, then give
    // the log its final flush
    sweeper.shutdown().await;
    store.close()?;

    info!("Server shutdown complete");
    Ok(())
}

/// Main loop that accepts incoming connections
async fn accept_loop(listener: TcpListener, store: Arc<Store>, stats: Arc<ConnectionStats>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                // Create a command handler for this connection
                let handler = CommandHandler::new(Arc::clone(&store));
                let stats = Arc::clone(&stats);

                // Spawn a task to handle this connection
                tokio::spawn(async move {
                    handle_connection(stream, addr, handler, stats).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
