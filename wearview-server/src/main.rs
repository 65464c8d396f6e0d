// File: wearview-server/src/main.rs
//
// wearview server binary: accepts WebSocket connections from hosting
// pages and runs one preview session per connection. The upgrade
// request's query string seeds the session's base options, exactly like
// an iframe URL would.

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod server;

#[derive(Parser, Debug, Clone)]
#[command(name = "wearview")]
#[command(author, version, about = "wearview - wearable/avatar preview resolution server")]
pub struct Args {
    /// Address to which the server will bind
    #[arg(long, default_value = "127.0.0.1:9100")]
    pub listen_addr: String,

    /// Default environment for sessions that do not pick one ("prod" or
    /// "dev")
    #[arg(long, default_value = "prod")]
    pub env: String,

    /// Peer (content/lambdas) service base URL override
    #[arg(long)]
    pub peer_url: Option<String>,

    /// NFT API base URL override
    #[arg(long)]
    pub nft_server_url: Option<String>,

    /// Attempts per remote fetch before giving up
    #[arg(long, default_value = "3")]
    pub fetch_attempts: u32,

    /// Delay between fetch attempts, in milliseconds
    #[arg(long, default_value = "500")]
    pub fetch_backoff_ms: u64,

    /// Proxy rendering to an embedded engine attached by the host,
    /// instead of the in-process headless backend
    #[arg(long, default_value = "false")]
    pub engine: bool,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("wearview=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    info!(
        "wearview starting. listen={}, env={}, engine={}",
        args.listen_addr, args.env, args.engine
    );

    server::run(args).await?;

    info!("wearview stopped. Goodbye!");
    Ok(())
}
