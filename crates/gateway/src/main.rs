//! eSIM Global Gateway - republishes catalog and subscriber data.
//!
//! # Architecture
//!
//! - Axum HTTP surface with a static `X-API-Key` check
//! - One in-memory catalog snapshot, refreshed periodically in the background
//! - Ordered fallback for ICCID lookups: site backend, OCS provider, sample data
//!
//! # Lifecycle
//!
//! The first catalog refresh runs synchronously before the listener binds,
//! so the service never accepts traffic with an uninitialized snapshot in
//! sample-data mode. The background scheduler is spawned afterwards and
//! aborted on shutdown.

#![cfg_attr(not(test), forbid(unsafe_code))]

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use esim_global_gateway::config::GatewayConfig;
use esim_global_gateway::refresh;
use esim_global_gateway::state::AppState;

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &GatewayConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = GatewayConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Initialize tracing with EnvFilter and Sentry integration.
    // DEBUG_MODE lowers the default level when RUST_LOG is not set.
    let default_filter = if config.debug_mode {
        "esim_global_gateway=debug,tower_http=debug"
    } else {
        "esim_global_gateway=info,tower_http=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    tracing::info!(
        wordpress_url = %config.wordpress_url,
        using_sample_data = config.use_sample_data,
        refresh_interval = config.refresh_interval.as_secs(),
        "starting eSIM Global gateway"
    );

    // Build application state (snapshot store + upstream clients)
    let state = AppState::new(config.clone()).expect("Failed to initialize application state");

    // First refresh is synchronous and blocks readiness
    refresh::refresh_catalog(&state).await;

    // Background refresh, independent of request traffic
    let scheduler = tokio::spawn(refresh::run_scheduler(state.clone()));

    // Build router
    let app = esim_global_gateway::app(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    // Start server
    let addr = config.socket_addr();
    tracing::info!("gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    scheduler.abort();
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
