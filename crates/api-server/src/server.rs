//! Serving loop and graceful shutdown

use std::future::Future;
use std::time::Duration;

use anyhow::{bail, Context};
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::oneshot;

/// How long in-flight requests may run once shutdown has begun
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(60);

/// Serve `app` until `shutdown` resolves, then drain for at most `grace`
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
    grace: Duration,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send,
{
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            result.context("server task panicked")?.context("server error")?;
            bail!("server stopped before a shutdown signal");
        }
        () = shutdown => {}
    }

    tracing::info!("Waiting up to {:?} for in-flight requests", grace);
    let _ = stop_tx.send(());

    match tokio::time::timeout(grace, server).await {
        Ok(result) => {
            result.context("server task panicked")?.context("server error")?;
            tracing::info!("Server shutdown complete");
            Ok(())
        }
        Err(_) => bail!("graceful shutdown did not finish within {:?}", grace),
    }
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::routing::get;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn serves_until_shutdown_then_returns() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/ping", get(|| async { "pong" }));

        let (signal_tx, signal_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve(
            listener,
            app,
            async move {
                let _ = signal_rx.await;
            },
            Duration::from_secs(5),
        ));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /ping HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.ends_with("pong"));

        signal_tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn exceeding_grace_period_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                "late"
            }),
        );

        let (signal_tx, signal_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve(
            listener,
            app,
            async move {
                let _ = signal_rx.await;
            },
            Duration::from_millis(200),
        ));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /slow HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        // Let the request reach the handler before shutting down
        tokio::time::sleep(Duration::from_millis(100)).await;

        signal_tx.send(()).unwrap();
        let err = handle.await.unwrap().unwrap_err();
        assert!(err.to_string().contains("did not finish within"));
    }

    #[tokio::test]
    async fn immediate_shutdown_is_clean() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let result = serve(listener, Router::new(), async {}, Duration::from_secs(1)).await;
        assert!(result.is_ok());
    }
}
