//! padlock command-line client.
//!
//! Locks a resource, reads or writes its backing file, then releases the
//! lock and quits. Progress goes to the log on stderr; a READ value goes to
//! stdout.

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
    time::Duration,
};

use clap::{Parser, Subcommand};
use padlock_client::{
    LockClient,
    store::{read_value, resource_path, write_value},
};
use padlock_proto::{DEFAULT_PORT, ResourceName};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Run a read or write on a file while holding its lock.
///
/// `padlock-client <RESOURCE> READ [HOST PORT]`
/// `padlock-client <RESOURCE> WRITE <VALUE> <DELAY_SECS> [HOST PORT]`
#[derive(Debug, Parser)]
#[command(name = "padlock-client", version, about)]
struct Cli {
    /// Resource to lock
    resource: ResourceName,

    /// Directory holding the `<resource>.txt` files
    #[arg(long, global = true, default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    operation: Operation,
}

#[derive(Debug, Subcommand)]
enum Operation {
    /// Print the first line of the resource's file
    #[command(name = "READ", alias = "read")]
    Read {
        #[command(flatten)]
        server: ServerAddr,
    },

    /// Replace the resource's file contents after a delay
    #[command(name = "WRITE", alias = "write")]
    Write {
        /// Value to store
        value: String,
        /// Seconds to hold the lock before writing
        delay_secs: u64,
        #[command(flatten)]
        server: ServerAddr,
    },
}

/// Lock server address, given after the operation's own arguments.
#[derive(Debug, clap::Args)]
struct ServerAddr {
    /// Lock server host
    #[arg(default_value = "127.0.0.1")]
    host: String,

    /// Lock server port
    #[arg(default_value_t = DEFAULT_PORT)]
    port: u16,
}

impl Operation {
    fn server(&self) -> &ServerAddr {
        match self {
            Self::Read { server } | Self::Write { server, .. } => server,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let resource = cli.resource;
    let server = cli.operation.server();

    info!(host = %server.host, port = server.port, "connecting to lock server");
    let mut client = match LockClient::connect((server.host.as_str(), server.port)).await {
        Ok(client) => client,
        Err(error) => {
            error!(%error, "failed to connect to lock server");
            return ExitCode::FAILURE;
        },
    };

    info!(%resource, "requesting lock");
    if let Err(error) = client.lock(&resource).await {
        error!(%resource, %error, "failed to acquire lock");
        return ExitCode::FAILURE;
    }
    info!(%resource, "locked");

    let path = resource_path(&cli.dir, &resource);
    let outcome = match &cli.operation {
        Operation::Read { .. } => read_value(&path).await.and_then(|value| {
            info!(%resource, %value, "read value");
            writeln!(io::stdout().lock(), "{value}")
        }),
        Operation::Write { value, delay_secs, .. } => {
            info!(%resource, delay_secs, "holding lock before write");
            let written = write_value(&path, value, Duration::from_secs(*delay_secs)).await;
            if written.is_ok() {
                info!(%resource, %value, "wrote value");
            }
            written
        },
    };
    if let Err(error) = &outcome {
        error!(%resource, path = %path.display(), %error, "guarded operation failed");
    }

    info!(%resource, "releasing lock");
    match client.unlock(&resource).await {
        Ok(()) => info!(%resource, "unlocked"),
        Err(error) => error!(%resource, %error, "failed to release lock"),
    }

    if let Err(error) = client.quit().await {
        warn!(%error, "server did not acknowledge QUIT");
    }

    if outcome.is_ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
