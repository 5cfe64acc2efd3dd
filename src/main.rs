//! CSS-only Chat Server - Entry Point
//!
//! Binds the listener and serves the router over a shared room registry.

use std::env;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use css_chat::{router, RoomRegistry};

/// Default server address
const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=css_chat=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("css_chat=info,tower_http=info")),
        )
        .init();

    // Get bind address from command line or use default
    let addr = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());

    let registry = RoomRegistry::new();

    let listener = TcpListener::bind(&addr).await?;
    info!("CSS-only chat server listening on {}", addr);

    axum::serve(listener, router(registry)).await?;

    Ok(())
}
