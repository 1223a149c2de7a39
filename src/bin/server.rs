use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use county_zips::http::build_app;
use county_zips::{CsvFileProvider, ReferenceCache};

/// Server configuration
struct ServerConfig {
    port: u16,
    reference_ttl: Option<Duration>,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            reference_ttl: env::var("REFERENCE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=info,county_zips=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    let provider = CsvFileProvider::from_env();
    tracing::info!("Reference data: {}", provider.path().display());
    let cache = match config.reference_ttl {
        Some(ttl) => ReferenceCache::with_ttl(provider, ttl),
        None => ReferenceCache::new(provider),
    };

    // Warm the cache; a failure here is retried on the first request
    match cache.get_or_load().await {
        Ok(table) => {
            tracing::info!("Reference table ready: {} counties", table.counties().len())
        }
        Err(e) => tracing::warn!("Reference table not loaded yet: {}", e),
    }

    serve(config.port, cache).await
}

/// Serve the lookup API until Ctrl+C or SIGTERM
async fn serve(port: u16, cache: ReferenceCache) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Serving county lookups on {}", addr);

    axum::serve(listener, build_app(cache))
        .with_graceful_shutdown(async {
            let signal = stop_requested().await;
            tracing::info!("Received {}, finishing in-flight exports...", signal);
        })
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves with the name of the first stop signal received
async fn stop_requested() -> &'static str {
    use tokio::signal;

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("SIGTERM handler unavailable: {}", e);
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = signal::ctrl_c() => "Ctrl+C",
        _ = terminate => "SIGTERM",
    }
}
