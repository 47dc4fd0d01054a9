pub mod api;

use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Default port when neither settings nor `PORT` provide one
pub const DEFAULT_PORT: u16 = 5000;

/// Resolve the listening port from a `PORT`-style value.
pub fn port_from_env(value: Option<&str>) -> u16 {
    value
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Serve the health router until the task is dropped or the listener fails.
pub async fn serve(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("[HEALTH] Server started on port {}", port);
    axum::serve(listener, api::router()).await
}
