//! padlock lock server binary.

use std::{net::IpAddr, process::ExitCode};

use clap::Parser;
use padlock_core::Shutdown;
use padlock_proto::{DEFAULT_PORT, MAX_LINE_LENGTH};
use padlock_server::{Server, ServerConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Advisory lock server speaking the padlock line protocol.
#[derive(Debug, Parser)]
#[command(name = "padlock-server", version, about)]
struct Args {
    /// TCP port to listen on
    #[arg(default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Longest accepted command line in bytes
    #[arg(long, default_value_t = MAX_LINE_LENGTH)]
    max_line_length: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    let config =
        ServerConfig { bind: args.bind, port: args.port, max_line_length: args.max_line_length };

    let server = match Server::bind(&config).await {
        Ok(server) => server,
        Err(error) => {
            error!(%error, "lock server failed to start");
            return ExitCode::FAILURE;
        },
    };

    match server.local_addr() {
        Ok(addr) => info!(%addr, "lock server listening"),
        Err(error) => info!(%error, "lock server listening on unknown address"),
    }

    let (trigger, shutdown) = Shutdown::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupt received, shutting down");
                trigger.trigger();
            },
            Err(error) => error!(%error, "failed to listen for interrupt"),
        }
    });

    server.run(shutdown).await;
    info!("lock server stopped");
    ExitCode::SUCCESS
}
