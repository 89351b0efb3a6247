// SPDX-License-Identifier: GPL-3.0-or-later
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::serve;
use discograph_api::router;
use discograph_application::{AppState, ArtworkBinaryProcessor, ArtworkUrlProcessor, CanonicalProcessor, TextProcessor};
use discograph_config::{load as load_config, AppConfig, ServerConfig};
use discograph_metadata::cover_art_fallback::CoverArtFallbackClient;
use discograph_metadata::discogs::DiscogsClient;
use discograph_metadata::fanarttv::FanartTvClient;
use discograph_metadata::lastfm::LastFmClient;
use discograph_metadata::{ArtworkAdapter, TextAdapter};
use discograph_musicbrainz::MusicBrainzClient;
use discograph_store::postgres_adapters::PgStore;
use discograph_store::queue::{JobQueue, PgJobQueue};
use discograph_scheduler::Scheduler;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = load_config(None)?;

    let pool = discograph_store::connect(&config).await?;
    let store = Arc::new(PgStore::new(pool.clone()));
    let job_queue: Arc<dyn JobQueue> = Arc::new(PgJobQueue::new(pool.clone()));

    job_queue.reset_stuck().await?;

    let canonical = Arc::new(MusicBrainzClient::new()?);
    let text_adapters = build_text_adapters(&config);
    let artwork_adapters = build_artwork_adapters(&config);

    let state = AppState::new(
        config.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        job_queue.clone(),
        store.clone(),
        canonical,
        text_adapters,
        artwork_adapters,
    );
    state.on_start();

    let scheduler = Scheduler::new(job_queue.clone(), store.clone());
    let _handles = scheduler.spawn_all(
        Arc::new(CanonicalProcessor::new(state.clone())),
        Arc::new(TextProcessor::new(state.clone())),
        Arc::new(ArtworkUrlProcessor::new(state.clone())),
        Arc::new(ArtworkBinaryProcessor::new(store.clone(), config.storage.images_dir.clone())),
    );

    let listener = TcpListener::bind(bind_addr(&config.server)).await?;
    let addr = listener.local_addr()?;
    info!(target: "cli", "listening on {}", addr);

    serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Builds the two `TextAdapter`s this service knows about, skipping any
/// provider whose config section is disabled (§4.8's per-provider `enabled`
/// flag) rather than constructing a client that would only ever 403.
fn build_text_adapters(config: &AppConfig) -> Vec<Arc<dyn TextAdapter>> {
    let mut adapters: Vec<Arc<dyn TextAdapter>> = Vec::new();

    let lastfm = config.provider("lastfm");
    if lastfm.enabled {
        if let Some(api_key) = lastfm.api_key {
            adapters.push(Arc::new(LastFmClient::new(api_key, lastfm.base_url)));
        }
    }

    let discogs = config.provider("discogs");
    if discogs.enabled {
        adapters.push(Arc::new(DiscogsClient::new(discogs.api_key, discogs.base_url)));
    }

    adapters
}

/// Builds the artwork-url adapter chain: fanart.tv direct, plus the
/// fanart.tv→Cover Art Archive fallback, matching the registered-capability
/// shape `discograph-metadata::registry` expects.
fn build_artwork_adapters(config: &AppConfig) -> Vec<Arc<dyn ArtworkAdapter>> {
    let mut adapters: Vec<Arc<dyn ArtworkAdapter>> = Vec::new();

    let fanarttv = config.provider("fanarttv");
    let build_fanart_client = || {
        fanarttv
            .enabled
            .then(|| fanarttv.api_key.clone())
            .flatten()
            .map(|api_key| FanartTvClient::new(api_key, None, fanarttv.base_url.clone()))
    };

    if let Some(client) = build_fanart_client() {
        adapters.push(Arc::new(client));
    }

    let coverartarchive = config.provider("coverartarchive");
    if coverartarchive.enabled {
        adapters.push(Arc::new(CoverArtFallbackClient::new(build_fanart_client(), coverartarchive.base_url)));
    }

    adapters
}

fn init_tracing() {
    let fmt_layer = fmt::layer().with_target(true).with_thread_names(true).with_level(true);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn bind_addr(server: &ServerConfig) -> SocketAddr {
    let addr = format!("{}:{}", server.host, server.port);
    addr.parse().expect("valid listen address")
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let mut interrupt = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
        .expect("install SIGINT handler");

    #[cfg(unix)]
    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .expect("install SIGTERM handler");

    #[cfg(not(unix))]
    let interrupt = tokio::signal::ctrl_c();

    #[cfg(unix)]
    tokio::select! {
        _ = interrupt.recv() => {},
        _ = terminate.recv() => {},
    }

    #[cfg(not(unix))]
    {
        interrupt.await.expect("ctrl_c handler");
    }

    info!(target: "cli", "shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_addr_parsing() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5150,
            server_url: None,
            admin_api_key: None,
        };
        let addr = bind_addr(&server);
        assert_eq!(addr.port(), 5150);
        assert!(addr.is_ipv4());
    }

    #[test]
    fn test_bind_addr_ipv6() {
        let server = ServerConfig {
            host: "[::1]".to_string(),
            port: 8080,
            server_url: None,
            admin_api_key: None,
        };
        let addr = bind_addr(&server);
        assert_eq!(addr.port(), 8080);
        assert!(addr.is_ipv6());
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_signal_kinds_available() {
        use tokio::signal::unix::SignalKind;
        let _ = SignalKind::interrupt();
        let _ = SignalKind::terminate();
    }

    #[cfg(not(unix))]
    #[test]
    fn test_windows_signals_available() {
        let _ = tokio::signal::ctrl_c();
    }
}
