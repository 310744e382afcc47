use std::net::SocketAddr;
use std::sync::Arc;

use crate::service::Pipeline;

mod handlers;
mod router;
mod types;

#[derive(Clone)]
pub struct HttpServer {
    pipeline: Arc<Pipeline>,
    addr: SocketAddr,
}

impl HttpServer {
    /// Listen on the address from the pipeline's `[http]` config
    pub fn new(pipeline: Arc<Pipeline>) -> anyhow::Result<Self> {
        let addr = pipeline.config().http.socket_addr()?;
        Ok(Self::with_addr(pipeline, addr))
    }

    pub fn with_addr(pipeline: Arc<Pipeline>, addr: SocketAddr) -> Self {
        Self { pipeline, addr }
    }

    /// Bind and serve in the background; returns the bound address
    pub async fn start(&self) -> anyhow::Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
        let app = router::build_router(self.pipeline.clone());

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        let addr = listener.local_addr()?;
        log::info!("HTTP server listening on {addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("HTTP server stopped: {e}");
            }
        });

        Ok((addr, handle))
    }
}
