use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use crate::config::Config;
use crate::http::connection::Connection;
use crate::routes::router::Router;

pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.server.listen_addr).await?;
    info!("Listening on {}", cfg.server.listen_addr);

    let router = Arc::new(Router::new(cfg.static_files.root.clone()));
    let read_timeout = Duration::from_secs(cfg.server.read_timeout_secs);

    loop {
        let (socket, peer) = listener.accept().await?;
        info!("Accepted connection from {}", peer);

        let router = router.clone();
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, router, read_timeout);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
