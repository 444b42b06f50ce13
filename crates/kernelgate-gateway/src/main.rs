//! # kernelgate-gateway
//!
//! Kernel WebSocket gateway binary — wires together the kernel registry,
//! auth, and the HTTP/WebSocket server.

#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use kernelgate_core::KernelId;
use kernelgate_kernels::{InMemoryKernelManager, Kernel, LoopbackConnectionFactory};
use kernelgate_server::auth::{
    AllowAllAuthorizer, AnonymousIdentityProvider, IdentityProvider, TokenIdentityProvider,
};
use kernelgate_server::config::ServerConfig;
use kernelgate_server::server::GatewayServer;
use tracing_subscriber::EnvFilter;

/// Kernel WebSocket gateway.
#[derive(Parser, Debug)]
#[command(name = "kernelgate", about = "Kernel WebSocket gateway")]
struct Cli {
    /// Host to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind (0 for auto-assign).
    #[arg(long, default_value = "8888")]
    port: u16,

    /// Shared auth token; when absent every request is admitted anonymously.
    #[arg(long)]
    auth_token: Option<String>,

    /// Number of loopback kernels to register at startup.
    #[arg(long, default_value = "1")]
    kernels: usize,

    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Register `count` loopback kernels and log their connect URLs.
fn register_kernels(manager: &InMemoryKernelManager, count: usize) -> Vec<KernelId> {
    (0..count)
        .map(|_| {
            let id = KernelId::generate();
            let _ = manager.register(Kernel {
                id: id.clone(),
                name: "loopback".into(),
            });
            id
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_json);

    let metrics_handle =
        kernelgate_server::metrics::install_recorder().context("Failed to install metrics recorder")?;

    let manager = Arc::new(InMemoryKernelManager::new());
    let kernel_ids = register_kernels(&manager, args.kernels);

    let identity: Arc<dyn IdentityProvider> = match args.auth_token {
        Some(token) => {
            tracing::info!("token authentication enabled");
            Arc::new(TokenIdentityProvider::new(token))
        }
        None => {
            tracing::warn!("no auth token configured — admitting all requests anonymously");
            Arc::new(AnonymousIdentityProvider)
        }
    };

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        ..ServerConfig::default()
    };

    let server = GatewayServer::new(
        config,
        manager,
        Arc::new(LoopbackConnectionFactory::new()),
        identity,
        Arc::new(AllowAllAuthorizer),
    )
    .with_metrics(metrics_handle);

    let (addr, handle) = server.listen().await.context("Failed to bind gateway")?;
    tracing::info!("kernelgate listening on http://{addr}");
    for id in &kernel_ids {
        tracing::info!("kernel channel: ws://{addr}/api/kernels/{id}/channels");
    }

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    server.shutdown().drain(handle, None).await;
    tracing::info!("Shutdown complete");
    Ok(())
}
