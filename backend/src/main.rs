use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studio_backend::{app, config::Config, state::AppState, upstream::HttpUpstream};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studio_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(
        upstream_url = %config.upstream_url,
        port = config.port,
        cookie_secure = config.cookie_secure,
        supported_locales = ?config.supported_locales,
        default_locale = %config.default_locale,
        upstream_timeout_secs = config.upstream_timeout_secs,
        cors_origin = ?config.cors_origin,
        "Loaded configuration from environment/.env"
    );

    let upstream = HttpUpstream::new(config.upstream_url.clone(), config.upstream_timeout())?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let router = app(AppState::new(config, Arc::new(upstream)));

    tracing::info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
