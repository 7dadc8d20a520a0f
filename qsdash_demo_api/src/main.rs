//! qsdash_demo_api: serves canned agents, assets and agent installers over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use qsdash_demo_api::state::ALLOWED_DOWNLOADS;
use qsdash_demo_api::{router, DemoState};

#[derive(Parser, Debug)]
#[command(name = "qsdash_demo_api")]
#[command(about = "In-memory demo of the QStellar dashboard API")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8000)]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    bind: std::net::IpAddr,

    /// Directory with real installers (QS-Setup.exe, qs-agent_1.0.0_all.deb, mac_agent)
    #[arg(long, value_name = "DIR")]
    files: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut state = DemoState::demo();
    if let Some(dir) = &args.files {
        for (_, file) in ALLOWED_DOWNLOADS {
            let path = dir.join(file);
            match std::fs::read(&path) {
                Ok(bytes) => {
                    tracing::info!("serving {}", path.display());
                    state = state.with_file(file, bytes);
                }
                Err(e) => tracing::debug!("skipping {}: {e}", path.display()),
            }
        }
    }

    let addr = SocketAddr::new(args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("demo API running at http://{addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
