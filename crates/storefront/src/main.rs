//! Pickup-location storefront binary.
//!
//! Serves the public checkout on `STOREFRONT_PORT` (3000) and the admin order
//! screen on `ADMIN_PORT` (3001). Keep the admin listener on a private
//! interface and set `ADMIN_TOKEN` so it requires a bearer token.
//!
//! # Architecture
//!
//! - Axum web framework
//! - Askama templates for server-side rendering
//! - `PostgreSQL` for orders and order metadata

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::Router;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pickup_storefront::config::{LogFormat, SentryConfig, StorefrontConfig};
use pickup_storefront::db::{self, PgOrderMetadataRepository, PgOrderRepository};
use pickup_storefront::routes;
use pickup_storefront::state::AppState;

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &SentryConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config.environment.clone().map(Into::into),
            sample_rate: config.sample_rate,
            traces_sample_rate: config.traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Map tracing levels to Sentry: errors and warnings become events, info and
/// debug become breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the global tracing subscriber.
fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pickup_storefront=info,tower_http=debug".into());

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter));

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init(),
    }
}

/// Outermost Sentry layers, shared by both listeners.
fn with_sentry(router: Router) -> Router {
    router
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config.sentry);
    init_tracing(config.log_format);

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    // Migrations are NOT run on startup: `pickup-cli migrate`

    let state = AppState::new(
        Arc::new(PgOrderRepository::new(pool.clone())),
        Arc::new(PgOrderMetadataRepository::new(pool)),
        config.pickup.clone(),
    );
    tracing::info!(
        policy = ?config.pickup.policy,
        seeds = config.pickup.seeds.len(),
        "Pickup location field registered"
    );

    let storefront = with_sentry(routes::storefront_router(state.clone()));
    if config.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN is not set, admin router relies on network isolation only");
    }
    let admin_token = config.admin_token.clone().map(Arc::new);
    let admin = with_sentry(routes::admin_router(state, admin_token));

    let addr = config.socket_addr();
    let admin_addr = config.admin_socket_addr();

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind storefront address");
    let admin_listener = tokio::net::TcpListener::bind(admin_addr)
        .await
        .expect("Failed to bind admin address");

    tracing::info!("storefront listening on {}", addr);
    tracing::info!("admin listening on {}", admin_addr);

    let storefront_server =
        axum::serve(listener, storefront).with_graceful_shutdown(shutdown_signal());
    let admin_server = axum::serve(admin_listener, admin).with_graceful_shutdown(shutdown_signal());

    tokio::try_join!(
        async { storefront_server.await },
        async { admin_server.await },
    )
    .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
