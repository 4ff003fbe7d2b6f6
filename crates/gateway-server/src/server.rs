//! Server bootstrap and graceful shutdown.

use axum::Router;
use gateway_config::ServerConfig;
use std::future::{Future, IntoFuture};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{error::ServerError, routes::create_router, shutdown::shutdown_signal, state::AppState};

/// The gateway HTTP server
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Create a server
    #[must_use]
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Bind the configured address and serve until SIGINT or SIGTERM
    ///
    /// # Errors
    /// Returns error if the address cannot be bound or the accept loop fails
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port))
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;

        info!(addr = %addr, "Gateway listening");
        let signal = async {
            shutdown_signal().await;
        };
        serve(listener, create_router(self.state), signal, self.config.shutdown_grace).await
    }
}

/// Serve `app` until `signal` resolves, then allow `grace` for open
/// connections before returning
///
/// # Errors
/// Returns error if the accept loop fails
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    signal: F,
    grace: Duration,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (fired_tx, mut fired_rx) = watch::channel(false);
    let graceful = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            signal.await;
            let _ = fired_tx.send(true);
        })
        .into_future();
    tokio::pin!(graceful);

    // Open SSE streams would otherwise hold shutdown indefinitely
    let deadline = async {
        if fired_rx.wait_for(|fired| *fired).await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = &mut graceful => {
            result?;
            info!("Server stopped");
        }
        () = deadline => {
            warn!(grace_ms = grace.as_millis(), "Shutdown grace elapsed, closing open connections");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_serve_returns_after_signal() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let app = Router::new().route("/health", get(|| async { "ok" }));

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve(
            listener,
            app,
            async {
                let _ = rx.await;
            },
            Duration::from_secs(5),
        ));

        let body = reqwest::get(format!("http://{addr}/health"))
            .await
            .expect("request")
            .text()
            .await
            .expect("body");
        assert_eq!(body, "ok");

        tx.send(()).expect("server running");
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("stopped in time")
            .expect("task joined");
        assert!(result.is_ok());
    }
}
