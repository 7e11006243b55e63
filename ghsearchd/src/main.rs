use ghsearchd::{config::ProxyConfig, logging, server, services::{self, Services}};

use anyhow::{Context, Result};
use dotenv::dotenv;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    logging::init()?;

    let cfg = ProxyConfig::from_env().context("invalid configuration")?;
    info!(config = ?cfg, "configuration loaded");
    let services = services::init(Services::from_config(&cfg)?)?;

    let listener = TcpListener::bind(&cfg.addr)
        .await
        .with_context(|| format!("binding {}", cfg.addr))?;
    info!("ghsearchd listening on http://{}", cfg.addr);

    loop {
        let (mut stream, peer) = tokio::select! {
            accepted = listener.accept() => accepted?,
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return Ok(());
            }
        };
        tokio::spawn(async move {
            if let Err(err) = server::serve_connection(&mut stream, services).await {
                warn!(%peer, "connection error: {err:#}");
            }
        });
    }
}
