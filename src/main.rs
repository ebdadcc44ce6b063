use anyhow::Result;
use clap::{Parser, Subcommand};
use schedule_cluster::{BackendConfig, BackendService, Coordinator, CoordinatorConfig};
use schedule_cluster::registry::types::BackendId;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "schedule-cluster")]
#[command(about = "Distributed meeting-availability lookup cluster")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the coordinator: collect backend registrations, then serve
    /// requester sessions
    Coordinator {
        /// UDP address backends register with and queries go out from
        #[arg(long, default_value = "127.0.0.1:7400")]
        shard_bind: SocketAddr,

        /// TCP address requester sessions connect to
        #[arg(long, default_value = "127.0.0.1:7500")]
        client_bind: SocketAddr,

        /// Backends that must register before requests are served
        /// (comma-separated ids)
        #[arg(long, value_delimiter = ',', default_value = "A,B")]
        backends: Vec<BackendId>,

        /// How long to wait for all registrations, in milliseconds
        #[arg(long, default_value_t = 10_000)]
        registration_timeout_ms: u64,

        /// Per-request deadline for backend replies, in milliseconds
        #[arg(long, default_value_t = 2_000)]
        query_timeout_ms: u64,
    },

    /// Run a backend shard: load an availability file and answer
    /// coordinator queries
    Backend {
        /// Shard id, must match one of the coordinator's expected backends
        #[arg(long)]
        id: BackendId,

        /// UDP bind address (port 0 picks an ephemeral port)
        #[arg(long, default_value = "127.0.0.1:0")]
        bind: SocketAddr,

        /// The coordinator's shard UDP address
        #[arg(long, default_value = "127.0.0.1:7400")]
        coordinator: SocketAddr,

        /// Availability file, one `name;[start,end] [start,end]` line per
        /// user
        #[arg(long)]
        data: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Coordinator {
            shard_bind,
            client_bind,
            backends,
            registration_timeout_ms,
            query_timeout_ms,
        } => {
            let config = CoordinatorConfig {
                shard_addr: shard_bind,
                client_addr: client_bind,
                expected_backends: backends,
                registration_timeout_ms,
                query_timeout_ms,
            };
            Coordinator::new(config).serve().await?;
        }
        Commands::Backend {
            id,
            bind,
            coordinator,
            data,
        } => {
            let config = BackendConfig {
                id,
                bind_addr: bind,
                coordinator_addr: coordinator,
                data_path: data,
            };
            BackendService::load(config)?.serve().await?;
        }
    }

    Ok(())
}
